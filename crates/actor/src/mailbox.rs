use std::fmt::Debug;

use tokio::sync::{mpsc, watch};

use crate::{Actor, ActorDeadError};

/// Object-safe shim so that messages can travel through the mailbox as
/// `Box<dyn Message<S>>`.
pub trait BoxMessage<S>: Send + Debug + 'static {
    fn handle_box(self: Box<Self>, state: &mut S, handle: &Actor<S>);
}

/// A message that an actor with state `S` can handle.
///
/// Handlers run one at a time on the actor's task, so a handler has
/// exclusive access to the state for its whole duration. Handlers must
/// not block; long-running work should be spawned and report back with
/// another message.
pub trait Message<S>: BoxMessage<S> {
    /// Handles the message with mutable access to the actor's state.
    fn handle(self, state: &mut S, handle: &Actor<S>);
}

impl<S, M: Message<S>> BoxMessage<S> for M {
    #[inline]
    fn handle_box(self: Box<Self>, state: &mut S, handle: &Actor<S>) {
        (*self).handle(state, handle)
    }
}

impl<S, M: Message<S> + ?Sized> Message<S> for Box<M> {
    #[inline]
    fn handle(self, state: &mut S, handle: &Actor<S>) {
        self.handle_box(state, handle)
    }
}

pub type BoxedMessage<S> = Box<dyn Message<S>>;

/// The receiving half, consumed by the actor loop.
pub struct Inbox<S> {
    pub msg_rx: mpsc::UnboundedReceiver<BoxedMessage<S>>,
    pub kill_rx: watch::Receiver<bool>,
}

/// The sending half, shared by every handle of the actor.
pub struct Mailbox<S> {
    msg_tx: mpsc::UnboundedSender<BoxedMessage<S>>,
    kill_tx: watch::Sender<bool>,
}

impl<S: Send + Sync + 'static> Mailbox<S> {
    pub fn new() -> (Self, Inbox<S>) {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = watch::channel(false);
        (Mailbox { msg_tx, kill_tx }, Inbox { msg_rx, kill_rx })
    }

    #[inline]
    pub fn send(&self, msg: BoxedMessage<S>) -> Result<(), ActorDeadError> {
        if *self.kill_tx.borrow() {
            return Err(ActorDeadError);
        }
        self.msg_tx.send(msg).map_err(|_| ActorDeadError)
    }

    #[inline]
    pub fn kill(&self) {
        self.kill_tx.send_replace(true);
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        *self.kill_tx.borrow() || self.msg_tx.is_closed()
    }
}
