//! Core game rules for Marble Race
//!
//! This crate ties the physics world to the race:
//!
//! - [`GameStore`] - Observable ready/playing/ended state with subscriptions
//! - [`LevelSpec`] / [`LevelGenerator`] - Segment sequence and its bodies
//! - [`ObstacleKind`] - Obstacle tags with their motion profiles
//! - [`PlayerController`] - Marble locomotion, jumping and chase camera
//! - [`HudSnapshot`] - What the overlay shows each frame
//! - [`Race`] - One session composing all of the above into a tick

mod error;
mod hud;
mod level;
mod obstacle;
mod phase;
mod player;
mod race;
mod random;

pub use error::RaceError;
pub use hud::{format_elapsed, HudSnapshot};
pub use level::{
    finish_line_z, Level, LevelGenerator, LevelSpec, Segment, SegmentKind, SEGMENT_DEPTH,
};
pub use obstacle::{
    draw_speed, draw_time_offset, KinematicTarget, MotionParams, ObstacleInstance, ObstacleKind,
    DEFAULT_PALETTE,
};
pub use phase::{Clock, GamePhase, GameState, GameStore, ManualClock, Subscription, SystemClock};
pub use player::{
    check_phase_transition, compute_impulse, CameraState, CameraTuning, Impulse, PhaseCommand,
    PlayerController, PlayerTuning,
};
pub use race::{Race, RaceConfig};
pub use random::{AmbientRandom, RandomSource, SeededRandom, SequenceRandom};

// Re-export the collaborators for convenient access through marble_core
pub use marble_input::{Control, ControlEvent, ControlsState};
pub use marble_math::{Quat, Vec3};
pub use marble_physics::{BodyKey, PhysicsConfig, PhysicsWorld};
