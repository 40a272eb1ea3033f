//! Race error types

use std::fmt;

use marble_physics::BodyKey;

/// Error type for race operations
#[derive(Debug, Clone, PartialEq)]
pub enum RaceError {
    /// A body handle no longer refers to a body in the physics world
    MissingBody(BodyKey),
}

impl fmt::Display for RaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceError::MissingBody(key) => write!(f, "Rigid body missing from world: {:?}", key),
        }
    }
}

impl std::error::Error for RaceError {}
