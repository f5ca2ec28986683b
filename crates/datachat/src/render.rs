use std::fmt::Write as _;

use datachat_core::view::{RenderedTurn, TurnBody, View};
use datachat_core::{FALLBACK_ANSWER, Role};
use owo_colors::OwoColorize;

/// Left margin marker drawn in front of every turn.
pub const BAR_CHAR: &str = "▎";

/// Prints a growing reveal prefix without repeating what is already on
/// screen.
#[derive(Debug, Default)]
pub struct Typewriter {
    shown: usize,
}

impl Typewriter {
    /// Returns the part of `prefix` that has not been shown yet.
    ///
    /// A prefix shorter than what was shown starts over.
    pub fn advance<'a>(&mut self, prefix: &'a str) -> &'a str {
        let start = if prefix.is_char_boundary(self.shown) {
            self.shown
        } else {
            0
        };
        self.shown = prefix.len();
        &prefix[start..]
    }

    /// Returns `true` once anything was shown.
    #[inline]
    pub fn has_output(&self) -> bool {
        self.shown > 0
    }

    /// Forgets what was shown, for the next answer.
    #[inline]
    pub fn reset(&mut self) {
        self.shown = 0;
    }
}

/// Draws a whole view as terminal text, one turn after another.
pub fn render_view(view: &View) -> String {
    let mut out = String::new();
    for turn in &view.turns {
        render_turn(&mut out, turn);
    }
    out
}

fn render_turn(out: &mut String, turn: &RenderedTurn) {
    match turn.role {
        Role::User => {
            let bar = BAR_CHAR.bright_green();
            if let Some(name) = &turn.attachment {
                writeln!(out, "{bar}📎 {}", name.dimmed()).ok();
            }
            for line in body_lines(&turn.body) {
                writeln!(out, "{bar}> {}", line.bold()).ok();
            }
        }
        Role::Assistant if turn.failed => {
            let bar = BAR_CHAR.bright_yellow();
            writeln!(out, "{bar}⚠️  {}", FALLBACK_ANSWER.yellow()).ok();
        }
        Role::Assistant => {
            let bar = BAR_CHAR.bright_cyan();
            for line in body_lines(&turn.body) {
                writeln!(out, "{bar}🤖 {}", line.bright_white()).ok();
            }
        }
    }
}

fn body_lines(body: &TurnBody) -> Vec<&str> {
    match body {
        TurnBody::Loading => vec!["..."],
        TurnBody::Revealing(prefix) => vec![prefix.as_str()],
        TurnBody::Blocks(lines) => lines.iter().map(String::as_str).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typewriter_prints_only_new_words() {
        let mut typewriter = Typewriter::default();
        assert!(!typewriter.has_output());
        assert_eq!(typewriter.advance("Total"), "Total");
        assert_eq!(typewriter.advance("Total is"), " is");
        assert_eq!(typewriter.advance("Total is 42"), " 42");
        assert_eq!(typewriter.advance("Total is 42"), "");
        assert!(typewriter.has_output());

        typewriter.reset();
        assert_eq!(typewriter.advance("Next"), "Next");
    }

    #[test]
    fn test_typewriter_restarts_on_shorter_prefix() {
        let mut typewriter = Typewriter::default();
        typewriter.advance("héllo wörld");
        assert_eq!(typewriter.advance("ab"), "ab");
    }

    fn turn(role: Role, body: TurnBody) -> RenderedTurn {
        RenderedTurn {
            role,
            body,
            attachment: None,
            failed: false,
        }
    }

    #[test]
    fn test_render_view() {
        let mut question = turn(
            Role::User,
            TurnBody::Blocks(vec!["Sum the column".to_owned()]),
        );
        question.attachment = Some("sales.csv".to_owned());
        let answer = turn(
            Role::Assistant,
            TurnBody::Blocks(vec!["Total:".to_owned(), "42".to_owned()]),
        );
        let mut failed = turn(
            Role::Assistant,
            TurnBody::Blocks(vec![FALLBACK_ANSWER.to_owned()]),
        );
        failed.failed = true;
        let view = View {
            turns: vec![question, answer, failed],
            in_flight: false,
        };

        let rendered = render_view(&view);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("sales.csv"));
        assert!(lines[1].contains("Sum the column"));
        assert!(lines[2].contains("Total:"));
        assert!(lines[3].contains("42"));
        assert!(lines[4].contains(FALLBACK_ANSWER));
        assert!(lines.iter().all(|line| line.contains(BAR_CHAR)));
    }

    #[test]
    fn test_render_loading() {
        let view = View {
            turns: vec![turn(Role::Assistant, TurnBody::Loading)],
            in_flight: true,
        };
        assert!(render_view(&view).contains("..."));
    }
}
