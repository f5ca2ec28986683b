use std::sync::{Arc, Mutex};
use std::time::Duration;

use datachat_core::view::TurnBody;
use datachat_core::{
    Chat, ChatBuilder, FALLBACK_ANSWER, Phase, RejectReason, RevealProgress,
    Role, SubmitOutcome, Turn, TurnStatus,
};
use datachat_test_transport::{
    PresetFailure, PresetReply, PresetStep, ScriptedTransport,
};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

struct Harness {
    chat: Chat,
    idle_rx: mpsc::UnboundedReceiver<()>,
    reveals: Arc<Mutex<Vec<RevealProgress>>>,
    max_pending: Arc<Mutex<usize>>,
}

impl Harness {
    fn new(transport: ScriptedTransport) -> Self {
        let (idle_tx, idle_rx) = mpsc::unbounded_channel();
        let reveals = Arc::new(Mutex::new(Vec::new()));
        let max_pending = Arc::new(Mutex::new(0));
        let chat = ChatBuilder::with_transport(transport)
            .on_idle(move || {
                idle_tx.send(()).ok();
            })
            .on_reveal({
                let reveals = Arc::clone(&reveals);
                move |progress| reveals.lock().unwrap().push(progress.clone())
            })
            .on_transcript({
                let max_pending = Arc::clone(&max_pending);
                move |transcript| {
                    let pending =
                        transcript.iter().filter(|t| t.is_pending()).count();
                    let mut max = max_pending.lock().unwrap();
                    *max = (*max).max(pending);
                }
            })
            .build();
        Self {
            chat,
            idle_rx,
            reveals,
            max_pending,
        }
    }

    async fn wait_idle(&mut self) {
        timeout(Duration::from_secs(5), self.idle_rx.recv())
            .await
            .unwrap()
            .unwrap();
    }

    fn reveals(&self) -> Vec<RevealProgress> {
        self.reveals.lock().unwrap().clone()
    }
}

fn roles_and_texts(turns: &[Turn]) -> Vec<(Role, &str)> {
    turns.iter().map(|t| (t.role(), t.text())).collect()
}

#[tokio::test(start_paused = true)]
async fn test_turns_alternate_in_submit_order() {
    let mut transport = ScriptedTransport::default();
    transport.push_answer("one");
    transport.push_reply(PresetReply::Failure(PresetFailure::Network));
    transport.push_answer("three");
    let mut harness = Harness::new(transport);

    for query in ["q1", "q2", "q3"] {
        let outcome = harness.chat.submit(query, None).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted);
        harness.wait_idle().await;
    }

    let snapshot = harness.chat.snapshot().await.unwrap();
    assert_eq!(
        roles_and_texts(&snapshot.transcript),
        [
            (Role::User, "q1"),
            (Role::Assistant, "one"),
            (Role::User, "q2"),
            (Role::Assistant, FALLBACK_ANSWER),
            (Role::User, "q3"),
            (Role::Assistant, "three"),
        ]
    );
    assert!(
        snapshot
            .transcript
            .iter()
            .all(|t| t.status() == TurnStatus::Final)
    );
    assert_eq!(*harness.max_pending.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_settles_with_fallback() {
    let mut transport = ScriptedTransport::default();
    transport.push_reply(PresetReply::Failure(PresetFailure::Status(500)));
    let mut harness = Harness::new(transport);

    harness.chat.submit("hi", None).await.unwrap();
    harness.wait_idle().await;

    let snapshot = harness.chat.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.transcript.len(), 2);
    let answer = &snapshot.transcript[1];
    assert_eq!(answer.status(), TurnStatus::Final);
    assert_eq!(answer.text(), FALLBACK_ANSWER);
    assert!(answer.error().unwrap().contains("500"));

    // Failures are shown at once, without a reveal.
    sleep(Duration::from_secs(1)).await;
    assert!(harness.reveals().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_malformed_response_is_a_failure() {
    let mut transport = ScriptedTransport::default();
    transport.push_reply(PresetReply::Body(json!({})));
    let mut harness = Harness::new(transport);

    harness.chat.submit("hi", None).await.unwrap();
    harness.wait_idle().await;

    let snapshot = harness.chat.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(
        roles_and_texts(&snapshot.transcript),
        [(Role::User, "hi"), (Role::Assistant, FALLBACK_ANSWER)]
    );
    assert!(snapshot.transcript[1].error().is_some());
    assert!(harness.reveals().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_empty_submit_is_a_no_op() {
    let transport = ScriptedTransport::default();
    let observer = transport.clone();
    let harness = Harness::new(transport);

    for query in ["", "   ", "\n\t"] {
        let outcome = harness.chat.submit(query, None).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected(RejectReason::Empty));
    }

    let snapshot = harness.chat.snapshot().await.unwrap();
    assert!(snapshot.transcript.is_empty());
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(observer.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_submit_while_busy_is_rejected() {
    let mut transport = ScriptedTransport::default();
    transport.push_step(
        PresetStep::new(PresetReply::answer("first")).with_delay_ms(1000),
    );
    transport.push_answer("second");
    let observer = transport.clone();
    let mut harness = Harness::new(transport);

    let first = harness.chat.submit("one", None).await.unwrap();
    let second = harness.chat.submit("two", None).await.unwrap();
    assert_eq!(first, SubmitOutcome::Accepted);
    assert_eq!(second, SubmitOutcome::Rejected(RejectReason::Busy));

    let snapshot = harness.chat.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Sending);
    assert_eq!(snapshot.transcript.len(), 2);
    assert!(snapshot.transcript[1].is_pending());
    assert_eq!(observer.requests().len(), 1);

    harness.wait_idle().await;
    let again = harness.chat.submit("two", None).await.unwrap();
    assert_eq!(again, SubmitOutcome::Accepted);
    harness.wait_idle().await;

    let snapshot = harness.chat.snapshot().await.unwrap();
    assert_eq!(
        roles_and_texts(&snapshot.transcript),
        [
            (Role::User, "one"),
            (Role::Assistant, "first"),
            (Role::User, "two"),
            (Role::Assistant, "second"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_answer_is_revealed_word_by_word() {
    let mut transport = ScriptedTransport::default();
    transport.push_answer("alpha beta gamma");
    let mut harness = Harness::new(transport);

    harness.chat.submit("greek?", None).await.unwrap();
    harness.wait_idle().await;

    // Input is accepted again while the answer is still animating.
    let snapshot = harness.chat.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(snapshot.reveal.as_ref().unwrap().is_active());
    assert_eq!(snapshot.transcript[1].text(), "alpha beta gamma");

    sleep(Duration::from_secs(1)).await;
    let prefixes: Vec<_> = harness
        .reveals()
        .into_iter()
        .map(|p| (p.prefix, p.active))
        .collect();
    assert_eq!(
        prefixes,
        [
            ("alpha".to_owned(), true),
            ("alpha beta".to_owned(), true),
            ("alpha beta gamma".to_owned(), false),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_new_submit_cancels_running_reveal() {
    let long_answer = "w1 w2 w3 w4 w5 w6 w7 w8 w9 w10";
    let mut transport = ScriptedTransport::default();
    transport.push_answer(long_answer);
    transport.push_step(
        PresetStep::new(PresetReply::answer("short reply")).with_delay_ms(50),
    );
    let mut harness = Harness::new(transport);

    harness.chat.submit("long", None).await.unwrap();
    harness.wait_idle().await;
    sleep(Duration::from_millis(250)).await;
    let before = harness.reveals().len();
    assert_eq!(before, 2);

    harness.chat.submit("short", None).await.unwrap();
    harness.wait_idle().await;
    sleep(Duration::from_secs(2)).await;

    let after: Vec<_> = harness.reveals()[before..]
        .iter()
        .map(|p| p.prefix.clone())
        .collect();
    assert_eq!(after, ["short", "short reply"]);

    // The superseded answer is still complete in the transcript, and is
    // drawn from it verbatim.
    let snapshot = harness.chat.snapshot().await.unwrap();
    assert_eq!(snapshot.transcript[1].text(), long_answer);

    let (view_tx, mut view_rx) = mpsc::unbounded_channel();
    harness
        .chat
        .subscribe(move |view| {
            view_tx.send(view.clone()).ok();
        })
        .await
        .unwrap();
    let view = view_rx.recv().await.unwrap();
    assert_eq!(view.turns[1].body, TurnBody::Blocks(vec![long_answer.into()]));
    assert_eq!(
        view.turns[3].body,
        TurnBody::Blocks(vec!["short reply".into()])
    );
}
