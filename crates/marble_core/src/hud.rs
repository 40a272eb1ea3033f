//! Overlay data sampled once per frame

use marble_input::ControlsState;

use crate::phase::{GamePhase, GameStore};

/// Elapsed milliseconds as seconds with two decimals
pub fn format_elapsed(elapsed_ms: u64) -> String {
    format!("{:.2}", elapsed_ms as f64 / 1000.0)
}

/// Everything the overlay draws
#[derive(Clone, Debug, PartialEq)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    /// Timer label, e.g. `"12.34"`
    pub time_text: String,
    /// Restart is only offered once the race has ended
    pub show_restart: bool,
    /// Key indicators
    pub keys: ControlsState,
}

impl HudSnapshot {
    /// Read the store at the current clock time
    ///
    /// Safe to call before or after the frame's tick; it only reads.
    pub fn sample(store: &GameStore, keys: ControlsState) -> Self {
        let phase = store.phase();
        Self {
            phase,
            time_text: format_elapsed(store.elapsed_ms()),
            show_restart: phase == GamePhase::Ended,
            keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::ManualClock;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0.00");
        assert_eq!(format_elapsed(1_234), "1.23");
        assert_eq!(format_elapsed(61_010), "61.01");
    }

    #[test]
    fn test_ready_shows_zero() {
        let clock = ManualClock::new(50_000);
        let store = GameStore::new(clock, 5);
        let hud = HudSnapshot::sample(&store, ControlsState::default());
        assert_eq!(hud.time_text, "0.00");
        assert!(!hud.show_restart);
    }

    #[test]
    fn test_ended_freezes_time_and_offers_restart() {
        let clock = ManualClock::new(0);
        let mut store = GameStore::new(clock.clone(), 5);
        store.start();
        clock.advance(3_450);
        store.end();
        clock.advance(10_000);

        let hud = HudSnapshot::sample(&store, ControlsState::default());
        assert_eq!(hud.phase, GamePhase::Ended);
        assert_eq!(hud.time_text, "3.45");
        assert!(hud.show_restart);
    }

    #[test]
    fn test_playing_time_runs() {
        let clock = ManualClock::new(0);
        let mut store = GameStore::new(clock.clone(), 5);
        store.start();
        clock.advance(500);
        assert_eq!(HudSnapshot::sample(&store, ControlsState::default()).time_text, "0.50");
        clock.advance(500);
        assert_eq!(HudSnapshot::sample(&store, ControlsState::default()).time_text, "1.00");
    }
}
