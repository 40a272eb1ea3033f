//! Game phase state machine
//!
//! One [`GameStore`] exists per race. It owns the [`GameState`] and is the only
//! thing allowed to change it, through `start`, `end`, `restart` and
//! `set_blocks_count`. Other components observe it through [`Subscription`]s
//! that select just the fields they care about.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Coarse lifecycle of one race episode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Waiting for the first input
    #[default]
    Ready,
    /// Clock running
    Playing,
    /// Finish line crossed, clock frozen
    Ended,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GamePhase::Ready => "ready",
            GamePhase::Playing => "playing",
            GamePhase::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Snapshot of the shared race state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub phase: GamePhase,
    /// Milliseconds, set on Ready -> Playing
    pub start_time: u64,
    /// Milliseconds, set on Playing -> Ended
    pub end_time: u64,
    /// Number of obstacle segments in the level
    pub blocks_count: u32,
    /// Bumped on every restart to force a new level draw
    pub blocks_seed: u64,
}

impl GameState {
    fn new(blocks_count: u32) -> Self {
        Self {
            phase: GamePhase::Ready,
            start_time: 0,
            end_time: 0,
            blocks_count,
            blocks_seed: 0,
        }
    }

    /// Elapsed race time at `now`
    ///
    /// Zero while Ready, running while Playing, frozen once Ended.
    pub fn elapsed_ms(&self, now: u64) -> u64 {
        match self.phase {
            GamePhase::Ready => 0,
            GamePhase::Playing => now.saturating_sub(self.start_time),
            GamePhase::Ended => self.end_time.saturating_sub(self.start_time),
        }
    }
}

/// Millisecond time source
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock (milliseconds since the Unix epoch)
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Hand-advanced clock; clones share the same time
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Queue of changes to one selected value
///
/// Dropping the subscription unsubscribes it; the store prunes its listener on
/// the next mutation.
pub struct Subscription<T> {
    queue: Rc<RefCell<VecDeque<T>>>,
}

impl<T> Subscription<T> {
    /// Next pending change, oldest first
    pub fn try_recv(&self) -> Option<T> {
        self.queue.borrow_mut().pop_front()
    }

    /// All pending changes, oldest first
    pub fn drain(&self) -> Vec<T> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// Most recent pending change, discarding older ones
    pub fn latest(&self) -> Option<T> {
        self.queue.borrow_mut().drain(..).last()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

type Listener = Box<dyn FnMut(&GameState) -> bool>;

/// Owner of the race state
pub struct GameStore {
    state: GameState,
    clock: Box<dyn Clock>,
    listeners: Vec<Listener>,
}

impl GameStore {
    /// Create a store in the Ready phase
    pub fn new(clock: impl Clock + 'static, blocks_count: u32) -> Self {
        Self {
            state: GameState::new(blocks_count),
            clock: Box::new(clock),
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Elapsed race time right now
    pub fn elapsed_ms(&self) -> u64 {
        self.state.elapsed_ms(self.now_ms())
    }

    /// Number of live subscriptions
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Observe the value `selector` picks out of the state
    ///
    /// The subscription receives the new value each time a mutation changes
    /// it. Listeners run synchronously, in subscription order.
    pub fn subscribe<T, F>(&mut self, selector: F) -> Subscription<T>
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&GameState) -> T + 'static,
    {
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        let weak = Rc::downgrade(&queue);
        let mut last = selector(&self.state);

        self.listeners.push(Box::new(move |state| {
            let Some(queue) = weak.upgrade() else {
                return false;
            };
            let next = selector(state);
            if next != last {
                last = next.clone();
                queue.borrow_mut().push_back(next);
            }
            true
        }));

        Subscription { queue }
    }

    /// Ready -> Playing; returns false (and does nothing) from any other phase
    pub fn start(&mut self) -> bool {
        if self.state.phase != GamePhase::Ready {
            return false;
        }
        self.state.phase = GamePhase::Playing;
        self.state.start_time = self.now_ms();
        log::info!("Race started at {} ms", self.state.start_time);
        self.notify();
        true
    }

    /// Playing -> Ended; returns false (and does nothing) from any other phase
    pub fn end(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.state.phase = GamePhase::Ended;
        self.state.end_time = self.now_ms();
        log::info!(
            "Race finished in {} ms",
            self.state.end_time.saturating_sub(self.state.start_time)
        );
        self.notify();
        true
    }

    /// Any phase -> Ready, with a fresh level seed
    pub fn restart(&mut self) {
        self.state.phase = GamePhase::Ready;
        self.state.blocks_seed += 1;
        log::info!("Race restarted (seed {})", self.state.blocks_seed);
        self.notify();
    }

    /// Change the level length
    pub fn set_blocks_count(&mut self, count: u32) {
        if self.state.blocks_count == count {
            return;
        }
        self.state.blocks_count = count;
        log::info!("Level length set to {} blocks", count);
        self.notify();
    }

    fn notify(&mut self) {
        let state = self.state.clone();
        self.listeners.retain_mut(|listener| listener(&state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_at(ms: u64) -> (GameStore, ManualClock) {
        let clock = ManualClock::new(ms);
        (GameStore::new(clock.clone(), 5), clock)
    }

    #[test]
    fn test_initial_state() {
        let (store, _) = store_at(0);
        assert_eq!(store.phase(), GamePhase::Ready);
        assert_eq!(store.state().blocks_count, 5);
        assert_eq!(store.state().blocks_seed, 0);
    }

    #[test]
    fn test_start_records_time() {
        let (mut store, _) = store_at(1_000);
        assert!(store.start());
        assert_eq!(store.phase(), GamePhase::Playing);
        assert_eq!(store.state().start_time, 1_000);
    }

    #[test]
    fn test_start_is_noop_unless_ready() {
        let (mut store, clock) = store_at(1_000);
        store.start();
        clock.advance(500);
        assert!(!store.start());
        assert_eq!(store.state().start_time, 1_000);

        store.end();
        assert!(!store.start());
        assert_eq!(store.phase(), GamePhase::Ended);
    }

    #[test]
    fn test_end_is_noop_unless_playing() {
        let (mut store, clock) = store_at(0);
        assert!(!store.end());
        assert_eq!(store.phase(), GamePhase::Ready);

        store.start();
        clock.advance(2_500);
        assert!(store.end());
        assert_eq!(store.state().end_time, 2_500);
        assert!(store.state().end_time >= store.state().start_time);

        clock.advance(100);
        assert!(!store.end());
        assert_eq!(store.state().end_time, 2_500);
    }

    #[test]
    fn test_restart_from_any_phase() {
        let (mut store, _) = store_at(0);
        store.restart();
        assert_eq!(store.phase(), GamePhase::Ready);
        assert_eq!(store.state().blocks_seed, 1);

        store.start();
        store.restart();
        assert_eq!(store.state().blocks_seed, 2);

        store.start();
        store.end();
        store.restart();
        assert_eq!(store.phase(), GamePhase::Ready);
        assert_eq!(store.state().blocks_seed, 3);
    }

    #[test]
    fn test_elapsed_time() {
        let (mut store, clock) = store_at(10_000);
        clock.advance(5_000);
        assert_eq!(store.elapsed_ms(), 0);

        store.start();
        clock.advance(1_234);
        assert_eq!(store.elapsed_ms(), 1_234);

        store.end();
        clock.advance(9_999);
        assert_eq!(store.elapsed_ms(), 1_234);
    }

    #[test]
    fn test_subscription_sees_only_changes() {
        let (mut store, _) = store_at(0);
        let phases = store.subscribe(|s| s.phase);
        let counts = store.subscribe(|s| s.blocks_count);

        store.start();
        store.set_blocks_count(8);
        store.end();

        assert_eq!(phases.drain(), vec![GamePhase::Playing, GamePhase::Ended]);
        assert_eq!(counts.drain(), vec![8]);
    }

    #[test]
    fn test_restart_from_ready_notifies_seed_selector() {
        let (mut store, _) = store_at(0);
        let resets = store.subscribe(|s| (s.phase, s.blocks_seed));
        let phases = store.subscribe(|s| s.phase);

        store.restart();
        assert_eq!(resets.latest(), Some((GamePhase::Ready, 1)));
        // Phase itself didn't change
        assert!(phases.is_empty());
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let (mut store, _) = store_at(0);
        let kept = store.subscribe(|s| s.phase);
        {
            let _dropped = store.subscribe(|s| s.blocks_seed);
            assert_eq!(store.listener_count(), 2);
        }
        store.start();
        assert_eq!(store.listener_count(), 1);
        assert_eq!(kept.try_recv(), Some(GamePhase::Playing));
        assert_eq!(kept.try_recv(), None);
    }

    #[test]
    fn test_set_same_count_is_silent() {
        let (mut store, _) = store_at(0);
        let counts = store.subscribe(|s| s.blocks_count);
        store.set_blocks_count(5);
        assert!(counts.is_empty());
    }
}
