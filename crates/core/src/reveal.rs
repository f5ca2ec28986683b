//! Progressive, word-by-word reveal of a settled answer.

use std::time::Duration;

use datachat_actor::{Actor, Message, Timer};

use crate::observer::{Observers, SubscriptionId};

/// How often a new word is revealed unless configured otherwise.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(100);

const MIN_REVEAL_INTERVAL: Duration = Duration::from_millis(1);

/// Progress of one reveal.
///
/// The text is split on whitespace; the prefix grows by one word per
/// step, joined with single spaces. The original spacing only comes back
/// once the turn is rendered from its stored text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealState {
    full_text: String,
    words: Vec<String>,
    revealed_prefix: String,
    cursor: usize,
    active: bool,
}

impl RevealState {
    /// Creates the state for `full_text`. A text without any word is
    /// complete from the start.
    pub fn new<S: Into<String>>(full_text: S) -> Self {
        let full_text = full_text.into();
        let words: Vec<String> =
            full_text.split_whitespace().map(str::to_owned).collect();
        let active = !words.is_empty();
        Self {
            full_text,
            words,
            revealed_prefix: String::new(),
            cursor: 0,
            active,
        }
    }

    /// Reveals the next word. Returns `false` if there was nothing left.
    pub fn advance(&mut self) -> bool {
        let Some(word) = self.words.get(self.cursor) else {
            self.active = false;
            return false;
        };
        if self.cursor > 0 {
            self.revealed_prefix.push(' ');
        }
        self.revealed_prefix.push_str(word);
        self.cursor += 1;
        if self.cursor == self.words.len() {
            self.active = false;
        }
        true
    }

    /// Returns the text being revealed, untouched.
    #[inline]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Returns what has been revealed so far.
    #[inline]
    pub fn revealed_prefix(&self) -> &str {
        &self.revealed_prefix
    }

    /// Returns how many words have been revealed.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the total number of words.
    #[inline]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` while words are still being revealed.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `true` if every word has been revealed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.cursor == self.words.len()
    }

    fn progress(&self) -> RevealProgress {
        RevealProgress {
            prefix: self.revealed_prefix.clone(),
            active: self.active,
        }
    }
}

/// Emitted to subscribers on every reveal step.
///
/// The last step of a reveal carries the whole (normalized) text with
/// `active == false`; there is no separate completion event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RevealProgress {
    /// Everything revealed so far.
    pub prefix: String,
    /// `false` once this was the last step.
    pub active: bool,
}

/// A timer tick, tagged with the reveal it was scheduled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RevealTick {
    generation: u64,
}

/// Paces a [`RevealState`] on a fixed interval.
///
/// The scheduler lives inside an actor's state: its timer posts ticks to
/// that actor, and the actor hands them back through
/// [`RevealScheduler::on_tick`]. Every `start` and `cancel` moves to a
/// new generation, and ticks from an older generation are ignored, so
/// no step of a cancelled reveal is ever applied, even if its tick was
/// already queued.
#[derive(Debug)]
pub struct RevealScheduler {
    interval: Duration,
    generation: u64,
    state: Option<RevealState>,
    timer: Option<Timer>,
    observers: Observers<RevealProgress>,
}

impl RevealScheduler {
    /// Creates an idle scheduler stepping every `interval`.
    ///
    /// A zero interval is raised to one millisecond.
    pub fn new(interval: Duration) -> Self {
        let interval = if interval < MIN_REVEAL_INTERVAL {
            warn!("reveal interval {interval:?} is too short, clamping");
            MIN_REVEAL_INTERVAL
        } else {
            interval
        };
        Self {
            interval,
            generation: 0,
            state: None,
            timer: None,
            observers: Observers::new(),
        }
    }

    /// Starts revealing `full_text`, replacing any reveal in progress.
    ///
    /// `make_msg` wraps each tick into a message of the owning actor,
    /// whose handler must call [`RevealScheduler::on_tick`].
    pub fn start<S, M, F>(
        &mut self,
        full_text: impl Into<String>,
        actor: &Actor<S>,
        make_msg: F,
    ) where
        S: Send + Sync + 'static,
        M: Message<S> + 'static,
        F: Fn(RevealTick) -> M + Send + 'static,
    {
        self.cancel();

        let state = RevealState::new(full_text);
        if !state.is_active() {
            trace!("nothing to reveal");
            self.state = Some(state);
            return;
        }

        let tick = RevealTick {
            generation: self.generation,
        };
        debug!(
            "revealing {} words every {:?} (generation {})",
            state.word_count(),
            self.interval,
            self.generation
        );
        self.state = Some(state);
        self.timer =
            Some(actor.send_interval(self.interval, move || make_msg(tick)));
    }

    /// Stops the reveal in progress, if any. Calling it again is a no-op
    /// apart from invalidating ticks that are still queued.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        if let Some(state) = &mut self.state {
            if state.active {
                trace!("cancelled at word {}", state.cursor);
                state.active = false;
            }
        }
    }

    /// Applies one tick. Returns `false` if the tick was stale or there
    /// was nothing left to reveal.
    pub fn on_tick(&mut self, tick: RevealTick) -> bool {
        if tick.generation != self.generation {
            trace!("ignoring a stale tick");
            return false;
        }
        let Some(state) = self.state.as_mut().filter(|s| s.is_active()) else {
            return false;
        };

        state.advance();
        let progress = state.progress();
        if !progress.active {
            trace!("reveal finished");
            self.timer.take();
        }
        self.observers.notify(&progress);
        true
    }

    /// Returns the current (or last) reveal.
    #[inline]
    pub fn state(&self) -> Option<&RevealState> {
        self.state.as_ref()
    }

    /// Returns `true` while a reveal is in progress.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.as_ref().is_some_and(RevealState::is_active)
    }

    /// Returns the step interval.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Registers a callback for every reveal step.
    pub fn subscribe(
        &mut self,
        callback: impl Fn(&RevealProgress) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    /// Removes a subscription made with [`RevealScheduler::subscribe`].
    #[inline]
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl Default for RevealScheduler {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::{mpsc, oneshot};
    use tokio::time::{Instant, sleep};

    use super::*;

    #[test]
    fn test_advance_word_by_word() {
        let mut state = RevealState::new("alpha beta gamma");
        assert!(state.is_active());

        let mut prefixes = Vec::new();
        while state.advance() {
            prefixes.push((state.revealed_prefix().to_owned(), state.is_active()));
        }
        assert_eq!(
            prefixes,
            [
                ("alpha".to_owned(), true),
                ("alpha beta".to_owned(), true),
                ("alpha beta gamma".to_owned(), false),
            ]
        );
        assert!(state.is_complete());
        assert!(!state.advance());
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let mut state = RevealState::new("  one\n\ntwo \t three ");
        assert_eq!(state.word_count(), 3);
        while state.advance() {}
        assert_eq!(state.revealed_prefix(), "one two three");
        assert_eq!(state.full_text(), "  one\n\ntwo \t three ");
    }

    #[test]
    fn test_blank_text_is_complete() {
        for text in ["", "   ", "\n\t"] {
            let state = RevealState::new(text);
            assert!(!state.is_active());
            assert!(state.is_complete());
            assert_eq!(state.revealed_prefix(), "");
        }
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let scheduler = RevealScheduler::new(Duration::ZERO);
        assert_eq!(scheduler.interval(), MIN_REVEAL_INTERVAL);
    }

    /// A minimal actor owning a scheduler, standing in for the chat.
    struct Host {
        reveal: RevealScheduler,
    }

    #[derive(Debug)]
    struct Tick(RevealTick);

    impl Message<Host> for Tick {
        fn handle(self, state: &mut Host, _handle: &Actor<Host>) {
            state.reveal.on_tick(self.0);
        }
    }

    #[derive(Debug)]
    struct Start(&'static str);

    impl Message<Host> for Start {
        fn handle(self, state: &mut Host, handle: &Actor<Host>) {
            state.reveal.start(self.0, handle, Tick);
        }
    }

    #[derive(Debug)]
    struct Cancel;

    impl Message<Host> for Cancel {
        fn handle(self, state: &mut Host, _handle: &Actor<Host>) {
            state.reveal.cancel();
        }
    }

    #[derive(Debug)]
    struct Inspect(oneshot::Sender<(Option<RevealState>, bool)>);

    impl Message<Host> for Inspect {
        fn handle(self, state: &mut Host, _handle: &Actor<Host>) {
            let reveal = &state.reveal;
            self.0
                .send((reveal.state().cloned(), reveal.is_active()))
                .ok();
        }
    }

    type Progress = mpsc::UnboundedReceiver<(Instant, RevealProgress)>;

    fn spawn_host() -> (Actor<Host>, Progress) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut reveal = RevealScheduler::default();
        reveal.subscribe(move |progress| {
            tx.send((Instant::now(), progress.clone())).ok();
        });
        (Actor::spawn(Host { reveal }, Some("host")), rx)
    }

    async fn inspect(host: &Actor<Host>) -> (Option<RevealState>, bool) {
        let (tx, rx) = oneshot::channel();
        host.send(Inspect(tx)).unwrap();
        rx.await.unwrap()
    }

    fn drain(rx: &mut Progress) -> Vec<RevealProgress> {
        let mut seen = Vec::new();
        while let Ok((_, progress)) = rx.try_recv() {
            seen.push(progress);
        }
        seen
    }

    fn progress(prefix: &str, active: bool) -> RevealProgress {
        RevealProgress {
            prefix: prefix.to_owned(),
            active,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_on_cadence() {
        let (host, mut rx) = spawn_host();
        let started = Instant::now();
        host.send(Start("alpha beta gamma")).unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let (at, progress) = rx.recv().await.unwrap();
            seen.push((at - started, progress));
        }
        assert_eq!(
            seen,
            [
                (Duration::from_millis(100), progress("alpha", true)),
                (Duration::from_millis(200), progress("alpha beta", true)),
                (Duration::from_millis(300), progress("alpha beta gamma", false)),
            ]
        );

        sleep(Duration::from_secs(1)).await;
        assert!(drain(&mut rx).is_empty());
        let (state, active) = inspect(&host).await;
        assert!(!active);
        assert_eq!(state.unwrap().revealed_prefix(), "alpha beta gamma");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_completes_without_ticks() {
        let (host, mut rx) = spawn_host();
        host.send(Start("")).unwrap();

        let (state, active) = inspect(&host).await;
        assert!(!active);
        let state = state.unwrap();
        assert_eq!(state.revealed_prefix(), "");
        assert!(state.is_complete());

        sleep(Duration::from_secs(1)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_supersedes_previous_reveal() {
        let (host, mut rx) = spawn_host();
        host.send(Start("one two three four five")).unwrap();
        assert_eq!(rx.recv().await.unwrap().1, progress("one", true));
        assert_eq!(rx.recv().await.unwrap().1, progress("one two", true));

        host.send(Start("x y")).unwrap();
        sleep(Duration::from_secs(2)).await;

        assert_eq!(
            drain(&mut rx),
            [progress("x", true), progress("x y", false)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticking() {
        let (host, mut rx) = spawn_host();
        host.send(Start("a b c d")).unwrap();
        assert_eq!(rx.recv().await.unwrap().1, progress("a", true));

        host.send(Cancel).unwrap();
        host.send(Cancel).unwrap();
        sleep(Duration::from_secs(1)).await;

        assert!(drain(&mut rx).is_empty());
        let (state, active) = inspect(&host).await;
        assert!(!active);
        assert_eq!(state.unwrap().revealed_prefix(), "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_tick_after_cancel_is_ignored() {
        let (host, mut rx) = spawn_host();
        host.send(Start("a b")).unwrap();
        // Let the timer arm, then queue a tick of the current generation
        // behind a cancellation.
        let (state, _) = inspect(&host).await;
        assert!(state.is_some());
        host.send(Cancel).unwrap();
        host.send(Tick(RevealTick { generation: 1 })).unwrap();

        sleep(Duration::from_secs(1)).await;
        assert!(drain(&mut rx).is_empty());
    }
}
