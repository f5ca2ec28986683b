//! What a front-end draws.

use crate::reveal::RevealState;
use crate::turn::{Role, Turn};

/// How the body of one turn should be drawn.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TurnBody {
    /// Waiting for the service: draw a loading indicator.
    Loading,
    /// The newest answer while it is still being revealed.
    Revealing(String),
    /// Settled text, one entry per line of the stored text.
    Blocks(Vec<String>),
}

/// One turn, ready to draw.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderedTurn {
    /// Who the turn belongs to.
    pub role: Role,
    /// What to draw.
    pub body: TurnBody,
    /// File name to show next to a user turn.
    pub attachment: Option<String>,
    /// `true` for assistant turns that show the fallback answer.
    pub failed: bool,
}

/// The whole conversation, ready to draw.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct View {
    /// Turns in display order.
    pub turns: Vec<RenderedTurn>,
    /// `true` while a request is outstanding.
    pub in_flight: bool,
}

/// Projects the transcript and the reveal into a drawable view.
///
/// Settled turns are drawn from their stored text, verbatim. The one
/// exception is the newest turn: when it is an assistant turn and a
/// reveal is active, it shows the revealed prefix instead.
pub fn project(
    turns: &[Turn],
    reveal: Option<&RevealState>,
    in_flight: bool,
) -> View {
    let revealing = reveal.filter(|r| r.is_active());
    let last = turns.len().checked_sub(1);
    let turns = turns
        .iter()
        .enumerate()
        .map(|(idx, turn)| {
            let body = match revealing {
                _ if turn.is_pending() => TurnBody::Loading,
                Some(reveal)
                    if Some(idx) == last && turn.role() == Role::Assistant =>
                {
                    TurnBody::Revealing(reveal.revealed_prefix().to_owned())
                }
                _ => TurnBody::Blocks(
                    turn.text().split('\n').map(str::to_owned).collect(),
                ),
            };
            RenderedTurn {
                role: turn.role(),
                body,
                attachment: turn.attachment().map(str::to_owned),
                failed: turn.error().is_some(),
            }
        })
        .collect();
    View { turns, in_flight }
}
