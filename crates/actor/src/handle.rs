use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::Instrument;

use crate::mailbox::Mailbox;
use crate::scheduler::run_actor;
use crate::timer::{Timer, TimerFlag};
use crate::{ActorDeadError, Message};

/// Handle to an actor.
///
/// Handles are cheap to clone. The actor keeps running as long as at
/// least one handle exists and it has not been killed.
pub struct Actor<S> {
    mailbox: Arc<Mailbox<S>>,
}

impl<S: Send + Sync + 'static> Actor<S> {
    /// Spawns a new actor owning `state`, with an optional label used in
    /// its tracing span.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(state: S, label: Option<&str>) -> Self {
        let (mailbox, inbox) = Mailbox::new();
        let mailbox = Arc::new(mailbox);
        tokio::spawn(
            run_actor(Arc::downgrade(&mailbox), state, inbox)
                .instrument(trace_span!("actor", label = label)),
        );
        Self { mailbox }
    }

    #[inline]
    pub(crate) fn from_mailbox(mailbox: Arc<Mailbox<S>>) -> Self {
        Self { mailbox }
    }

    /// Sends a message to the actor.
    #[inline]
    pub fn send<M: Message<S> + 'static>(
        &self,
        msg: M,
    ) -> Result<(), ActorDeadError> {
        self.mailbox.send(Box::new(msg))
    }

    /// Enqueues a message built by `make_msg` every `period`, starting
    /// one full period from now.
    ///
    /// The timer only holds a weak reference to the actor, and stops by
    /// itself once the actor is gone. Cancelling (or dropping) the
    /// returned [`Timer`] stops further deliveries, but a message that
    /// was enqueued right before the cancellation is still handled.
    /// Tag messages if the receiver needs to tell those apart.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn send_interval<M, F>(&self, period: Duration, mut make_msg: F) -> Timer
    where
        M: Message<S> + 'static,
        F: FnMut() -> M + Send + 'static,
    {
        assert!(!period.is_zero(), "timer period must be non-zero");

        let flag = TimerFlag::default();
        let mailbox = Arc::downgrade(&self.mailbox);
        let task = tokio::spawn({
            let flag = flag.clone();
            async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    if flag.is_cancelled() {
                        break;
                    }
                    let Some(mailbox) = mailbox.upgrade() else {
                        trace!("actor is gone, stopping the timer");
                        break;
                    };
                    if mailbox.send(Box::new(make_msg())).is_err() {
                        trace!("actor is dead, stopping the timer");
                        break;
                    }
                }
            }
            .instrument(trace_span!("timer", period_ms = period.as_millis() as u64))
        });
        Timer::new(flag, task)
    }

    /// Attempts to kill the actor.
    ///
    /// Messages that are still queued are discarded, and sends after
    /// this call fail. The state is dropped shortly after.
    #[inline]
    pub fn try_kill(&self) {
        self.mailbox.kill();
    }

    /// Returns `true` if the actor was killed or its loop has ended.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.mailbox.is_closed()
    }
}

impl<S> Clone for Actor<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}
