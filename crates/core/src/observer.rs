//! Change subscriptions.

use std::fmt;

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Identifies a subscription so that it can be removed later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A list of callbacks interested in values of type `T`.
///
/// Callbacks run synchronously in subscription order, on whatever task
/// calls [`Observers::notify`]. They must not block.
pub struct Observers<T> {
    callbacks: Vec<(SubscriptionId, Callback<T>)>,
    next_id: u64,
}

impl<T> Observers<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
            next_id: 1,
        }
    }

    pub fn subscribe(
        &mut self,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns `false` if it was not found.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(other, _)| *other != id);
        self.callbacks.len() != before
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn notify(&self, value: &T) {
        for (_, callback) in &self.callbacks {
            callback(value);
        }
    }
}

impl<T> Default for Observers<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.callbacks.len())
            .finish()
    }
}
