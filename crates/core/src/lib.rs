//! Conversation state and progressive answer reveal for a chat client.
//!
//! A [`Chat`] keeps an ordered transcript of user and assistant turns,
//! sends one request at a time through a
//! [`Transport`](datachat_transport::Transport), and reveals each answer
//! word by word. Front-ends draw [`View`]s, which combine the transcript
//! with the reveal in progress.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod chat;
mod observer;
mod reveal;
mod transcript;
mod transport_client;
mod turn;
pub mod view;

pub use chat::{
    Chat, ChatBuilder, ChatSnapshot, Draft, Phase, RejectReason, SubmitOutcome,
};
pub use observer::SubscriptionId;
pub use reveal::{
    DEFAULT_REVEAL_INTERVAL, RevealProgress, RevealScheduler, RevealState,
    RevealTick,
};
pub use transcript::{
    FALLBACK_ANSWER, Transcript, TranscriptError, TranscriptStore,
};
pub use turn::{Role, Turn, TurnStatus};
pub use view::View;
