use std::sync::Weak;

use tokio::select;

use crate::mailbox::{Inbox, Mailbox};
use crate::{Actor, Message};

/// Drives the actor: pulls messages one by one and hands each of them
/// the state.
///
/// A kill request wins over pending messages, so nothing queued behind
/// it is handled. The loop also ends once every handle is gone.
pub async fn run_actor<S: Send + Sync + 'static>(
    mailbox: Weak<Mailbox<S>>,
    mut state: S,
    inbox: Inbox<S>,
) {
    let Inbox {
        mut msg_rx,
        mut kill_rx,
    } = inbox;

    debug!("started");
    loop {
        let msg = select! {
            biased;

            _ = kill_rx.wait_for(|killed| *killed) => {
                debug!("killed");
                break;
            }
            msg = msg_rx.recv() => {
                let Some(msg) = msg else {
                    break;
                };
                msg
            }
        };
        trace!("received message: {msg:?}");

        let Some(mailbox) = mailbox.upgrade() else {
            warn!("all handles are gone, dropping the message");
            break;
        };
        let handle = Actor::from_mailbox(mailbox);
        trace_span!("proc msg").in_scope(|| {
            msg.handle(&mut state, &handle);
            trace!("finished");
        });
    }

    // Dropping the state here releases everything it owns, including
    // timers and spawned task handles.
    drop(state);
    debug!("terminated");
}
