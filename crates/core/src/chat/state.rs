use std::fmt::{self, Debug, Display};

use datachat_actor::{Actor, Message};
use datachat_transport::{AnswerRequest, Attachment, TransportError};
use tokio::sync::oneshot;

use super::{
    ChatSnapshot, ChatState, InFlight, Phase, RejectReason, SubmitOutcome,
};
use crate::observer::SubscriptionId;
use crate::reveal::RevealTick;
use crate::transport_client::{RequestAborted, SendResult};
use crate::view::{View, project};

/// Reports a broken internal invariant: loudly in debug builds, as an
/// error log otherwise.
fn invariant_broken(what: impl Display) {
    error!("chat state is inconsistent: {what}");
    if cfg!(debug_assertions) {
        panic!("chat state is inconsistent: {what}");
    }
}

impl ChatState {
    fn submit(
        &mut self,
        query: String,
        attachment: Option<Attachment>,
        handle: &Actor<Self>,
    ) -> SubmitOutcome {
        if !self.live {
            return SubmitOutcome::Rejected(RejectReason::ShutDown);
        }
        if self.phase != Phase::Idle {
            // One request at a time; the input is dropped, not queued.
            debug!("busy ({:?}), rejecting the input", self.phase);
            return SubmitOutcome::Rejected(RejectReason::Busy);
        }
        if query.trim().is_empty() && attachment.is_none() {
            return SubmitOutcome::Rejected(RejectReason::Empty);
        }
        // The previous answer is complete in the transcript, only its
        // animation is cut short.
        self.reveal.cancel();

        let attachment_name = attachment.as_ref().map(|a| a.name().to_owned());
        self.transcript.append_user_turn(query.clone(), attachment_name);
        if let Err(err) = self.transcript.append_pending_assistant_turn() {
            invariant_broken(err);
        }
        self.phase = Phase::Sending;
        // The input surface is cleared right away, whatever happens to
        // the request.
        self.draft.take();

        let id = self.next_request_id;
        self.next_request_id += 1;
        debug!("sending request {id}");

        let request = AnswerRequest {
            query: query.clone(),
            attachment,
        };
        // The request runs in its own task so that a panicking transport
        // still settles the pending turn.
        let transport = self.transport.clone();
        let request_task =
            tokio::spawn(async move { transport.send(request).await });
        let abort = request_task.abort_handle();
        let handle_clone = handle.clone();
        tokio::spawn(async move {
            let result = request_task.await.unwrap_or_else(|err| {
                let err: Box<dyn TransportError> =
                    Box::new(RequestAborted::from(err));
                Err(err)
            });
            handle_clone
                .send(TransportFinishedMessage { id, result })
                .ok();
        });
        self.in_flight = Some(InFlight { id, query, abort });

        self.publish_view();
        SubmitOutcome::Accepted
    }

    fn finish_request(
        &mut self,
        id: u64,
        result: SendResult,
        handle: &Actor<Self>,
    ) {
        if !self.live {
            trace!("discarding the result of request {id} after teardown");
            return;
        }
        let Some(in_flight) = self.in_flight.take_if(|f| f.id == id) else {
            warn!("discarding the result of unknown request {id}");
            return;
        };

        match result {
            Ok(resp) => {
                self.phase = Phase::Settling;
                debug!("request {id} answered");
                if let Err(err) = self
                    .transcript
                    .resolve_pending_assistant_turn(resp.answer.clone())
                {
                    invariant_broken(err);
                }
                self.reveal.start(resp.answer, handle, RevealTickMessage);
            }
            Err(err) => {
                warn!("request {id} failed: {err}");
                if let Err(err) = self
                    .transcript
                    .fail_pending_assistant_turn(describe_failure(&*err))
                {
                    invariant_broken(err);
                }
                if self.restore_draft_on_failure && self.draft.query.is_empty()
                {
                    self.draft.query = in_flight.query;
                }
            }
        }

        self.phase = Phase::Idle;
        if let Some(on_idle) = &self.on_idle {
            on_idle();
        }
        self.publish_view();
    }

    fn shutdown(&mut self, handle: &Actor<Self>) {
        if !self.live {
            return;
        }
        debug!("tearing down");
        self.live = false;
        self.reveal.cancel();
        if let Some(in_flight) = self.in_flight.take() {
            debug!("abandoning request {}", in_flight.id);
            in_flight.abort.abort();
        }
        handle.try_kill();
    }

    fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            transcript: self.transcript.snapshot(),
            phase: self.phase,
            reveal: self.reveal.state().cloned(),
            draft: self.draft.clone(),
        }
    }

    fn view(&self) -> View {
        project(
            &self.transcript.snapshot(),
            self.reveal.state(),
            self.phase != Phase::Idle,
        )
    }

    /// Recomputes the view once all updates of the current event are in.
    fn publish_view(&self) {
        if self.view_observers.is_empty() {
            return;
        }
        self.view_observers.notify(&self.view());
    }
}

fn describe_failure(err: &dyn TransportError) -> String {
    format!("{}: {err}", err.kind())
}

pub struct SubmitMessage {
    pub query: String,
    pub attachment: Option<Attachment>,
    pub reply: oneshot::Sender<SubmitOutcome>,
}

impl Debug for SubmitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitMessage")
            .field("query", &self.query)
            .field("attachment", &self.attachment)
            .finish_non_exhaustive()
    }
}

impl Message<ChatState> for SubmitMessage {
    fn handle(self, state: &mut ChatState, handle: &Actor<ChatState>) {
        let outcome = state.submit(self.query, self.attachment, handle);
        self.reply.send(outcome).ok();
    }
}

#[derive(Debug)]
pub struct SendDraftMessage(pub oneshot::Sender<SubmitOutcome>);

impl Message<ChatState> for SendDraftMessage {
    fn handle(self, state: &mut ChatState, handle: &Actor<ChatState>) {
        // A rejected draft stays in place for a later attempt.
        let draft = state.draft.clone();
        let outcome = state.submit(draft.query, draft.attachment, handle);
        self.0.send(outcome).ok();
    }
}

#[derive(Debug)]
pub enum DraftMessage {
    SetQuery(String),
    Attach(Attachment),
    Detach,
}

impl Message<ChatState> for DraftMessage {
    fn handle(self, state: &mut ChatState, _handle: &Actor<ChatState>) {
        match self {
            DraftMessage::SetQuery(query) => state.draft.query = query,
            DraftMessage::Attach(attachment) => {
                debug!("attached {attachment:?}");
                state.draft.attachment = Some(attachment);
            }
            DraftMessage::Detach => state.draft.attachment = None,
        }
    }
}

struct TransportFinishedMessage {
    id: u64,
    result: SendResult,
}

impl Debug for TransportFinishedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportFinishedMessage")
            .field("id", &self.id)
            .field("result", &self.result)
            .finish()
    }
}

impl Message<ChatState> for TransportFinishedMessage {
    fn handle(self, state: &mut ChatState, handle: &Actor<ChatState>) {
        state.finish_request(self.id, self.result, handle);
    }
}

#[derive(Debug)]
struct RevealTickMessage(RevealTick);

impl Message<ChatState> for RevealTickMessage {
    #[inline]
    fn handle(self, state: &mut ChatState, _handle: &Actor<ChatState>) {
        if state.reveal.on_tick(self.0) {
            state.publish_view();
        }
    }
}

#[derive(Debug)]
pub struct SnapshotMessage(pub oneshot::Sender<ChatSnapshot>);

impl Message<ChatState> for SnapshotMessage {
    fn handle(self, state: &mut ChatState, _handle: &Actor<ChatState>) {
        self.0.send(state.snapshot()).ok();
    }
}

type ViewCallback = Box<dyn Fn(&View) + Send + Sync>;

pub struct SubscribeMessage {
    pub callback: ViewCallback,
    pub reply: oneshot::Sender<SubscriptionId>,
}

impl Debug for SubscribeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeMessage").finish_non_exhaustive()
    }
}

impl Message<ChatState> for SubscribeMessage {
    fn handle(self, state: &mut ChatState, _handle: &Actor<ChatState>) {
        let view = state.view();
        (self.callback)(&view);
        let id = state.view_observers.subscribe(self.callback);
        self.reply.send(id).ok();
    }
}

#[derive(Debug)]
pub struct UnsubscribeMessage(pub SubscriptionId);

impl Message<ChatState> for UnsubscribeMessage {
    fn handle(self, state: &mut ChatState, _handle: &Actor<ChatState>) {
        state.view_observers.unsubscribe(self.0);
    }
}

#[derive(Debug)]
pub struct ShutdownMessage;

impl Message<ChatState> for ShutdownMessage {
    fn handle(self, state: &mut ChatState, handle: &Actor<ChatState>) {
        state.shutdown(handle);
    }
}
