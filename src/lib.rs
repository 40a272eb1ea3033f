//! Marble Race application
//!
//! Configuration, input mapping and the per-frame systems that drive a
//! [`marble_core::Race`] from a winit window.

pub mod config;
pub mod input;
pub mod systems;
