//! Marble Race input handling
//!
//! Turns raw keyboard events into the five race controls, keeping both a
//! queryable snapshot and a queue of edge events.

mod keyboard_controls;

pub use keyboard_controls::{control_for_key, Control, ControlEvent, ControlsState, KeyboardControls};
