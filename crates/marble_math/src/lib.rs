//! 3D Mathematics Library
//!
//! This crate provides the small set of value types the Marble Race crates share.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components
//! - [`Quat`] - Unit quaternion for 3D rotations

mod quat;
mod vec3;

pub use quat::Quat;
pub use vec3::Vec3;
