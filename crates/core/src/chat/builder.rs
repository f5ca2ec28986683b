use std::time::Duration;

use datachat_transport::Transport;

use super::Chat;
use crate::reveal::{DEFAULT_REVEAL_INTERVAL, RevealProgress};
use crate::transcript::Transcript;
use crate::transport_client::TransportClient;
use crate::view::View;

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

/// [`Chat`] builder.
pub struct ChatBuilder {
    pub(crate) transport: TransportClient,
    pub(crate) reveal_interval: Duration,
    pub(crate) restore_draft_on_failure: bool,
    pub(crate) on_idle: Option<Box<dyn Fn() + Send + Sync>>,
    pub(crate) on_transcript: Vec<Callback<Transcript>>,
    pub(crate) on_reveal: Vec<Callback<RevealProgress>>,
    pub(crate) on_view: Vec<Callback<View>>,
}

impl ChatBuilder {
    /// Creates a new builder with the specified transport.
    #[inline]
    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        Self {
            transport: TransportClient::new(transport),
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
            restore_draft_on_failure: true,
            on_idle: None,
            on_transcript: vec![],
            on_reveal: vec![],
            on_view: vec![],
        }
    }

    /// Sets how often a new word of an answer is revealed.
    #[inline]
    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }

    /// Chooses whether a failed query is put back into an empty draft.
    /// On by default.
    #[inline]
    pub fn restore_draft_on_failure(mut self, restore: bool) -> Self {
        self.restore_draft_on_failure = restore;
        self
    }

    /// Attaches a callback to be invoked whenever a request completes,
    /// successfully or not, and the chat accepts input again.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Attaches a callback to be invoked with a snapshot after every
    /// transcript change.
    #[inline]
    pub fn on_transcript(
        mut self,
        on_transcript: impl Fn(&Transcript) + Send + Sync + 'static,
    ) -> Self {
        self.on_transcript.push(Box::new(on_transcript));
        self
    }

    /// Attaches a callback to be invoked on every reveal step.
    #[inline]
    pub fn on_reveal(
        mut self,
        on_reveal: impl Fn(&RevealProgress) + Send + Sync + 'static,
    ) -> Self {
        self.on_reveal.push(Box::new(on_reveal));
        self
    }

    /// Attaches a callback to be invoked with a recomputed view after
    /// every handled event that changed something visible.
    #[inline]
    pub fn on_view(
        mut self,
        on_view: impl Fn(&View) + Send + Sync + 'static,
    ) -> Self {
        self.on_view.push(Box::new(on_view));
        self
    }

    /// Builds the chat.
    ///
    /// Must be called from within a tokio runtime.
    #[inline]
    pub fn build(self) -> Chat {
        Chat::spawn_from_builder(self)
    }
}
