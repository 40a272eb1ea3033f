//! Input handling module
//!
//! Maps application keys to actions; race controls go through
//! `marble_input::KeyboardControls`.

mod input_mapper;

pub use input_mapper::{InputMapper, InputAction};
