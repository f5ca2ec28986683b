mod builder;
mod draft;
mod state;

use datachat_actor::{Actor, ActorDeadError};
use datachat_transport::Attachment;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

pub use builder::ChatBuilder;
pub use draft::Draft;
use state::{
    DraftMessage, SendDraftMessage, ShutdownMessage, SnapshotMessage,
    SubmitMessage, SubscribeMessage, UnsubscribeMessage,
};

use crate::observer::{Observers, SubscriptionId};
use crate::reveal::{RevealScheduler, RevealState};
use crate::transcript::{Transcript, TranscriptStore};
use crate::transport_client::TransportClient;
use crate::view::View;

/// Where the coordinator is in handling a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing outstanding; input is accepted.
    #[default]
    Idle,
    /// A request is on its way to the service.
    Sending,
    /// An answer arrived and is being written to the transcript.
    Settling,
}

/// Why an input was not sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Neither text (after trimming) nor a file.
    Empty,
    /// Another request is still outstanding.
    Busy,
    /// The chat has been torn down.
    ShutDown,
}

/// The result of submitting an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmitOutcome {
    /// The turns were added and the request is on its way.
    Accepted,
    /// Nothing happened.
    Rejected(RejectReason),
}

/// A consistent copy of the chat's state.
#[derive(Clone, Debug)]
pub struct ChatSnapshot {
    /// Every turn so far.
    pub transcript: Transcript,
    /// Where the coordinator is.
    pub phase: Phase,
    /// The current (or last) reveal.
    pub reveal: Option<RevealState>,
    /// What the user is composing.
    pub draft: Draft,
}

struct InFlight {
    id: u64,
    query: String,
    abort: AbortHandle,
}

/// State owned by the chat actor.
///
/// Every change (user input, transport completion, reveal tick,
/// teardown) arrives as a message and is handled to completion before
/// the next one, so the transcript needs no locking.
pub struct ChatState {
    transport: TransportClient,
    transcript: TranscriptStore,
    reveal: RevealScheduler,
    phase: Phase,
    draft: Draft,
    in_flight: Option<InFlight>,
    next_request_id: u64,
    live: bool,
    restore_draft_on_failure: bool,
    view_observers: Observers<View>,

    on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

/// A conversation with the answering service.
///
/// The chat keeps the transcript, sends one request at a time, and
/// reveals each answer word by word. Dropping it tears it down: the
/// reveal stops and a request still in flight is abandoned.
pub struct Chat {
    handle: Actor<ChatState>,
}

impl Chat {
    fn spawn_from_builder(builder: ChatBuilder) -> Self {
        let ChatBuilder {
            transport,
            reveal_interval,
            restore_draft_on_failure,
            on_idle,
            on_transcript,
            on_reveal,
            on_view,
        } = builder;

        let mut transcript = TranscriptStore::new();
        for callback in on_transcript {
            transcript.subscribe(callback);
        }
        let mut reveal = RevealScheduler::new(reveal_interval);
        for callback in on_reveal {
            reveal.subscribe(callback);
        }
        let mut view_observers = Observers::new();
        for callback in on_view {
            view_observers.subscribe(callback);
        }

        let state = ChatState {
            transport,
            transcript,
            reveal,
            phase: Phase::Idle,
            draft: Draft::default(),
            in_flight: None,
            next_request_id: 1,
            live: true,
            restore_draft_on_failure,
            view_observers,
            on_idle,
        };
        Self {
            handle: Actor::spawn(state, Some("chat")),
        }
    }

    /// Sends `query`, with an optional file, ignoring (and clearing) the
    /// draft.
    ///
    /// Resolves as soon as the chat has accepted or rejected the input,
    /// not when the answer arrives.
    pub async fn submit<S: Into<String>>(
        &self,
        query: S,
        attachment: Option<Attachment>,
    ) -> Result<SubmitOutcome, ActorDeadError> {
        let (reply, rx) = oneshot::channel();
        self.handle.send(SubmitMessage {
            query: query.into(),
            attachment,
            reply,
        })?;
        rx.await.map_err(|_| ActorDeadError)
    }

    /// Sends whatever the draft holds.
    pub async fn send_draft(&self) -> Result<SubmitOutcome, ActorDeadError> {
        let (reply, rx) = oneshot::channel();
        self.handle.send(SendDraftMessage(reply))?;
        rx.await.map_err(|_| ActorDeadError)
    }

    /// Replaces the draft's query text.
    #[inline]
    pub fn set_draft_query<S: Into<String>>(
        &self,
        query: S,
    ) -> Result<(), ActorDeadError> {
        self.handle.send(DraftMessage::SetQuery(query.into()))
    }

    /// Picks a file for the next request, replacing any previous pick.
    #[inline]
    pub fn attach(&self, attachment: Attachment) -> Result<(), ActorDeadError> {
        self.handle.send(DraftMessage::Attach(attachment))
    }

    /// Drops the picked file.
    #[inline]
    pub fn detach(&self) -> Result<(), ActorDeadError> {
        self.handle.send(DraftMessage::Detach)
    }

    /// Returns a copy of the current state.
    pub async fn snapshot(&self) -> Result<ChatSnapshot, ActorDeadError> {
        let (reply, rx) = oneshot::channel();
        self.handle.send(SnapshotMessage(reply))?;
        rx.await.map_err(|_| ActorDeadError)
    }

    /// Registers a callback that receives the current view right away,
    /// then a fresh one after every change.
    pub async fn subscribe(
        &self,
        callback: impl Fn(&View) + Send + Sync + 'static,
    ) -> Result<SubscriptionId, ActorDeadError> {
        let (reply, rx) = oneshot::channel();
        self.handle.send(SubscribeMessage {
            callback: Box::new(callback),
            reply,
        })?;
        rx.await.map_err(|_| ActorDeadError)
    }

    /// Removes a subscription made with [`Chat::subscribe`].
    #[inline]
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<(), ActorDeadError> {
        self.handle.send(UnsubscribeMessage(id))
    }

    /// Tears the chat down.
    ///
    /// The reveal stops, an outstanding request is abandoned (its result
    /// will not touch the transcript), and every later call fails with
    /// [`ActorDeadError`].
    #[inline]
    pub fn shutdown(&self) {
        self.handle.send(ShutdownMessage).ok();
    }
}

impl Drop for Chat {
    fn drop(&mut self) {
        self.shutdown();
    }
}
