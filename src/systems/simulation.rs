//! Game simulation system
//!
//! Manages the game loop simulation including:
//! - Delta time calculation
//! - Ticking the race with the frame's controls
//! - Sampling the HUD

use std::time::Instant;
use marble_core::{ControlEvent, ControlsState, HudSnapshot, Race, RaceError};

/// Drives a race from wall-clock frames
pub struct SimulationSystem {
    race: Race,
    last_frame: Instant,
    max_frame_dt: f32,
}

impl SimulationSystem {
    /// Create a new simulation system
    ///
    /// Frames longer than `max_frame_dt` seconds are simulated as exactly
    /// `max_frame_dt`.
    pub fn new(race: Race, max_frame_dt: f32) -> Self {
        Self {
            race,
            last_frame: Instant::now(),
            max_frame_dt,
        }
    }

    pub fn race(&self) -> &Race {
        &self.race
    }

    pub fn race_mut(&mut self) -> &mut Race {
        &mut self.race
    }

    /// Clamp a raw frame duration
    pub fn cap_dt(&self, raw_dt: f32) -> f32 {
        raw_dt.clamp(0.0, self.max_frame_dt)
    }

    /// Run one simulation frame, timed from the previous call
    pub fn update(
        &mut self,
        controls: &ControlsState,
        events: &[ControlEvent],
    ) -> Result<HudSnapshot, RaceError> {
        let now = Instant::now();
        let raw_dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.step(controls, events, raw_dt)
    }

    /// Run one simulation frame of `raw_dt` seconds
    pub fn step(
        &mut self,
        controls: &ControlsState,
        events: &[ControlEvent],
        raw_dt: f32,
    ) -> Result<HudSnapshot, RaceError> {
        let dt = self.cap_dt(raw_dt);
        self.race.tick(controls, events, dt)?;
        Ok(self.race.hud(*controls))
    }

    /// Forget the time spent away (e.g. while unfocused)
    pub fn reset_timer(&mut self) {
        self.last_frame = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_core::{Control, GamePhase, ManualClock, RaceConfig};

    fn system() -> SimulationSystem {
        let race = Race::new(RaceConfig::default(), ManualClock::new(0));
        SimulationSystem::new(race, 1.0 / 30.0)
    }

    #[test]
    fn test_delta_time_capped() {
        let sim = system();
        assert_eq!(sim.cap_dt(0.5), 1.0 / 30.0);
        assert_eq!(sim.cap_dt(0.01), 0.01);
        assert_eq!(sim.cap_dt(-1.0), 0.0);
    }

    #[test]
    fn test_long_frame_advances_by_cap() {
        let mut sim = system();
        sim.step(&ControlsState::default(), &[], 2.0).unwrap();
        assert!((sim.race().elapsed() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_returns_hud() {
        let mut sim = system();
        let keys = ControlsState::default().with(Control::Forward, true);
        let hud = sim
            .step(&keys, &[ControlEvent::pressed(Control::Forward)], 1.0 / 60.0)
            .unwrap();
        assert_eq!(hud.phase, GamePhase::Playing);
        assert!(hud.keys.forward);
        assert!(!hud.show_restart);
    }
}
