//! Race session
//!
//! [`Race`] owns everything one race needs and drives it with a single
//! ordered [`Race::tick`] per frame.

use marble_input::{ControlEvent, ControlsState};
use marble_physics::{PhysicsConfig, PhysicsWorld};

use crate::error::RaceError;
use crate::hud::HudSnapshot;
use crate::level::{Level, LevelGenerator};
use crate::obstacle::{ObstacleKind, DEFAULT_PALETTE};
use crate::phase::{Clock, GameState, GameStore, Subscription};
use crate::player::{CameraTuning, PlayerController, PlayerTuning};
use crate::random::{AmbientRandom, RandomSource};

/// Everything needed to set up a race
#[derive(Clone, Debug)]
pub struct RaceConfig {
    /// Obstacle segments in the level
    pub blocks_count: u32,
    /// Kinds the level draws from
    pub palette: Vec<ObstacleKind>,
    /// Key level draws off the seed so a seed always yields the same level
    pub seeded: bool,
    pub physics: PhysicsConfig,
    pub player: PlayerTuning,
    pub camera: CameraTuning,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            blocks_count: 5,
            palette: DEFAULT_PALETTE.to_vec(),
            seeded: false,
            physics: PhysicsConfig::default(),
            player: PlayerTuning::default(),
            camera: CameraTuning::default(),
        }
    }
}

/// One race session
pub struct Race {
    store: GameStore,
    physics: PhysicsWorld,
    levels: LevelGenerator,
    player: PlayerController,
    /// Seconds since the session started, drives obstacle motion
    elapsed: f32,
}

impl Race {
    /// Create a race drawing levels from the thread-local generator
    pub fn new(config: RaceConfig, clock: impl Clock + 'static) -> Self {
        Self::with_random(config, clock, Box::new(AmbientRandom::new()))
    }

    /// Create a race drawing levels from `random`
    pub fn with_random(
        config: RaceConfig,
        clock: impl Clock + 'static,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let mut store = GameStore::new(clock, config.blocks_count);
        let mut physics = PhysicsWorld::with_config(config.physics);
        let mut levels = LevelGenerator::with_random(config.palette, config.seeded, random);
        levels.sync(config.blocks_count, store.state().blocks_seed, &mut physics);
        let player = PlayerController::spawn(&mut physics, &mut store, config.player, config.camera);

        Self {
            store,
            physics,
            levels,
            player,
            elapsed: 0.0,
        }
    }

    /// Advance the race by one frame
    ///
    /// Order: level regeneration, input edges, Ready reset, directional
    /// impulses, obstacle targets, physics step, camera and phase checks.
    pub fn tick(
        &mut self,
        controls: &ControlsState,
        events: &[ControlEvent],
        dt: f32,
    ) -> Result<(), RaceError> {
        let (count, seed) = (self.store.state().blocks_count, self.store.state().blocks_seed);
        self.levels.sync(count, seed, &mut self.physics);

        for event in events {
            self.player
                .handle_event(*event, &mut self.store, &mut self.physics)?;
        }

        self.player.sync_phase(&mut self.physics)?;
        self.player.apply_controls(controls, dt, &mut self.physics)?;

        self.elapsed += dt.max(0.0);
        self.levels.advance(self.elapsed, &mut self.physics)?;

        self.physics.step(dt);

        self.player.after_step(dt, &self.physics, &mut self.store)
    }

    /// The overlay's restart action
    pub fn restart(&mut self) {
        self.store.restart();
    }

    /// Change the level length; the level is rebuilt on the next tick
    pub fn set_blocks_count(&mut self, count: u32) {
        self.store.set_blocks_count(count);
    }

    /// Observe part of the game state
    pub fn subscribe<T, F>(&mut self, selector: F) -> Subscription<T>
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&GameState) -> T + 'static,
    {
        self.store.subscribe(selector)
    }

    pub fn hud(&self, keys: ControlsState) -> HudSnapshot {
        HudSnapshot::sample(&self.store, keys)
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn level(&self) -> Option<&Level> {
        self.levels.level()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}
