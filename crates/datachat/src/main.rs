//! An interactive terminal client for the data-analysis chat service.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

use datachat::core::view::{TurnBody, project};
use datachat::core::{
    Chat, ChatBuilder, FALLBACK_ANSWER, Phase, RejectReason, RevealProgress,
    SubmitOutcome, View,
};
use datachat::{
    BAR_CHAR, Command, Settings, Typewriter, parse_command, render_view,
};
use datachat_http_transport::HttpTransport;
use datachat_transport::Attachment;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum ChatEvent {
    Reveal(RevealProgress),
    View(View),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    debug!("using {settings:?}");

    let transport = HttpTransport::new(settings.http_config());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let chat = ChatBuilder::with_transport(transport)
        .with_reveal_interval(settings.reveal_interval)
        .on_reveal({
            let event_tx = event_tx.clone();
            move |progress| {
                event_tx.send(ChatEvent::Reveal(progress.clone())).ok();
            }
        })
        .on_view({
            let event_tx = event_tx.clone();
            move |view| {
                event_tx.send(ChatEvent::View(view.clone())).ok();
            }
        })
        .build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    println!(
        "{}",
        format!("Connected to {}. Type /quit to leave.", settings.base_url)
            .dimmed()
    );

    let mut typewriter = Typewriter::default();

    'outer: loop {
        let placeholder = match chat.snapshot().await {
            Ok(snapshot) => snapshot.draft.placeholder(),
            Err(_) => break,
        };
        print!("{} ", placeholder.dimmed());
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let query = match parse_command(&line) {
            Ok(Command::Query(query)) => query,
            Ok(Command::Attach(path)) => {
                match read_attachment(&path).await {
                    Some(attachment) => {
                        println!("📎 {}", attachment.name().bold());
                        chat.attach(attachment).ok();
                    }
                    None => println!(
                        "{}",
                        format!("cannot read {}", path.display()).yellow()
                    ),
                }
                continue;
            }
            Ok(Command::Detach) => {
                chat.detach().ok();
                continue;
            }
            Ok(Command::History) => {
                if let Ok(snapshot) = chat.snapshot().await {
                    let view = project(
                        &snapshot.transcript,
                        snapshot.reveal.as_ref(),
                        snapshot.phase != Phase::Idle,
                    );
                    print!("{}", render_view(&view));
                }
                continue;
            }
            Ok(Command::Quit) => break,
            Err(err) => {
                println!("{}", err.yellow());
                continue;
            }
        };

        chat.set_draft_query(query).ok();
        match chat.send_draft().await {
            Ok(SubmitOutcome::Accepted) => {}
            Ok(SubmitOutcome::Rejected(RejectReason::Empty)) => continue,
            Ok(SubmitOutcome::Rejected(reason)) => {
                println!("{}", format!("not sent ({reason:?})").yellow());
                continue;
            }
            Err(_) => break,
        }

        let mut progress_bar: Option<ProgressBar> = None;
        typewriter.reset();

        loop {
            let sleep = sleep(Duration::from_millis(100));
            let event = select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        break 'outer;
                    };
                    event
                },
                _ = sleep => {
                    if let Some(progress_bar) = &progress_bar {
                        progress_bar.inc(1);
                    }
                    continue;
                }
            };

            match event {
                ChatEvent::Reveal(progress) => {
                    if !typewriter.has_output() {
                        print!("{}🤖 ", BAR_CHAR.bright_cyan());
                    }
                    let delta = typewriter.advance(&progress.prefix);
                    print!("{}", delta.bright_white());
                    std::io::stdout().flush().ok();
                }
                ChatEvent::View(view) => {
                    let Some(last) = view.turns.last() else {
                        continue;
                    };
                    match &last.body {
                        TurnBody::Loading => {
                            // Create a new progress bar if there is none.
                            progress_bar.get_or_insert_with(|| {
                                let bar = ProgressBar::new_spinner();
                                bar.set_style(progress_style.clone());
                                bar.set_message("🤔 Thinking...");
                                bar
                            });
                        }
                        TurnBody::Revealing(_) => {
                            // Finish the progress bar before printing the
                            // answer.
                            if let Some(progress_bar) = progress_bar.take() {
                                progress_bar.finish_and_clear();
                            }
                        }
                        TurnBody::Blocks(lines) => {
                            if let Some(progress_bar) = progress_bar.take() {
                                progress_bar.finish_and_clear();
                            }
                            if last.failed {
                                print_failure(&chat).await;
                            } else if typewriter.has_output() {
                                println!();
                            } else {
                                for line in lines {
                                    println!(
                                        "{}🤖 {}",
                                        BAR_CHAR.bright_cyan(),
                                        line.bright_white()
                                    );
                                }
                            }
                            break;
                        }
                    }
                }
            }
        }
    }

    chat.shutdown();
}

async fn print_failure(chat: &Chat) {
    let bar = BAR_CHAR.bright_yellow();
    println!("{bar}⚠️  {}", FALLBACK_ANSWER.yellow());
    let Ok(snapshot) = chat.snapshot().await else {
        return;
    };
    if let Some(summary) = snapshot.transcript.last().and_then(|t| t.error()) {
        println!("{bar}{}", summary.dimmed());
    }
}

async fn read_attachment(path: &Path) -> Option<Attachment> {
    let name = path.file_name()?.to_string_lossy().into_owned();
    match tokio::fs::read(path).await {
        Ok(payload) => Some(Attachment::new(name, payload)),
        Err(err) => {
            error!("error reading {}: {}", path.display(), err);
            None
        }
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
