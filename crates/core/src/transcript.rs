//! The ordered log of turns.

use std::error::Error;
use std::fmt::{self, Display};
use std::ops::Deref;
use std::sync::Arc;

use crate::observer::{Observers, SubscriptionId};
use crate::turn::{Role, Turn, TurnStatus};

/// Text shown in place of an answer when a request fails.
pub const FALLBACK_ANSWER: &str = "No response from server";

/// Misuse of the [`TranscriptStore`] API.
///
/// These never happen when the store is driven by the chat coordinator;
/// they guard against callers breaking the transcript invariants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TranscriptError {
    /// The operation would break a transcript invariant.
    InvariantViolation(&'static str),
    /// There is no pending assistant turn to settle.
    NoPendingTurn,
}

impl Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::InvariantViolation(what) => {
                write!(f, "invariant violation: {what}")
            }
            TranscriptError::NoPendingTurn => write!(f, "no pending turn"),
        }
    }
}

impl Error for TranscriptError {}

/// An immutable, cheaply clonable copy of the transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcript(Arc<[Turn]>);

impl Transcript {
    /// Returns the turns in display order.
    #[inline]
    pub fn turns(&self) -> &[Turn] {
        &self.0
    }
}

impl Default for Transcript {
    #[inline]
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

impl Deref for Transcript {
    type Target = [Turn];

    #[inline]
    fn deref(&self) -> &[Turn] {
        &self.0
    }
}

/// Append-only storage of the conversation.
///
/// Turns are never reordered or removed. The only in-place update is
/// settling the single pending assistant turn, either with an answer or
/// with [`FALLBACK_ANSWER`]. Failed operations leave the store as it
/// was.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    turns: Vec<Turn>,
    pending: Option<usize>,
    observers: Observers<Transcript>,
}

impl TranscriptStore {
    /// Creates an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a settled user turn, optionally noting an attached file.
    pub fn append_user_turn<S: Into<String>>(
        &mut self,
        text: S,
        attachment: Option<String>,
    ) {
        self.turns.push(Turn::user(text.into(), attachment));
        self.changed();
    }

    /// Appends an assistant turn waiting for its answer.
    ///
    /// Fails if a turn is already pending, or if the newest turn is not
    /// the user turn this one answers.
    pub fn append_pending_assistant_turn(
        &mut self,
    ) -> Result<(), TranscriptError> {
        if self.pending.is_some() {
            return Err(TranscriptError::InvariantViolation(
                "a turn is already pending",
            ));
        }
        if self.turns.last().map(Turn::role) != Some(Role::User) {
            return Err(TranscriptError::InvariantViolation(
                "a pending turn must follow a user turn",
            ));
        }
        self.pending = Some(self.turns.len());
        self.turns.push(Turn::pending_assistant());
        self.changed();
        Ok(())
    }

    /// Settles the pending turn with the service's answer and returns its
    /// index.
    pub fn resolve_pending_assistant_turn<S: Into<String>>(
        &mut self,
        final_text: S,
    ) -> Result<usize, TranscriptError> {
        let index = self.settle(final_text.into(), None)?;
        self.changed();
        Ok(index)
    }

    /// Settles the pending turn with [`FALLBACK_ANSWER`], keeping
    /// `error_summary` as its diagnostic, and returns its index.
    pub fn fail_pending_assistant_turn<S: Into<String>>(
        &mut self,
        error_summary: S,
    ) -> Result<usize, TranscriptError> {
        let index = self
            .settle(FALLBACK_ANSWER.to_owned(), Some(error_summary.into()))?;
        self.changed();
        Ok(index)
    }

    fn settle(
        &mut self,
        text: String,
        error: Option<String>,
    ) -> Result<usize, TranscriptError> {
        let index = self.pending.take().ok_or(TranscriptError::NoPendingTurn)?;
        let turn = &mut self.turns[index];
        turn.text = text;
        turn.error = error;
        turn.status = TurnStatus::Final;
        Ok(index)
    }

    /// Returns a copy of the transcript for rendering.
    pub fn snapshot(&self) -> Transcript {
        Transcript(Arc::from(self.turns.as_slice()))
    }

    /// Returns `true` if an assistant turn is waiting for its answer.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the number of turns.
    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if nothing has been said yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Registers a callback that receives a fresh snapshot after every
    /// change.
    pub fn subscribe(
        &mut self,
        callback: impl Fn(&Transcript) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    /// Removes a subscription made with [`TranscriptStore::subscribe`].
    #[inline]
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn changed(&self) {
        if self.observers.is_empty() {
            return;
        }
        self.observers.notify(&self.snapshot());
    }
}
