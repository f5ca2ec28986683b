use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;

#[derive(Clone, Default)]
pub(crate) struct TimerFlag(Arc<AtomicBool>);

impl TimerFlag {
    #[inline]
    pub(crate) fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A repeating timer created by [`crate::Actor::send_interval`].
///
/// The timer runs until it is cancelled, dropped, or its actor dies.
pub struct Timer {
    flag: TimerFlag,
    task: JoinHandle<()>,
}

impl Timer {
    #[inline]
    pub(crate) fn new(flag: TimerFlag, task: JoinHandle<()>) -> Self {
        Self { flag, task }
    }

    /// Stops the timer.
    ///
    /// On a multi-threaded runtime, a delivery that was already past its
    /// cancellation check may still land once. Calling it more than once
    /// is harmless.
    #[inline]
    pub fn cancel(&self) {
        self.flag.cancel();
        self.task.abort();
    }

    /// Returns `true` once [`Timer::cancel`] has been called.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
