//! Keyboard adapter for the race controls
//!
//! Controls:
//! - W / ArrowUp: forward
//! - S / ArrowDown: backward
//! - A / ArrowLeft: left
//! - D / ArrowRight: right
//! - Space: jump

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// One of the five race controls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::Forward,
        Control::Backward,
        Control::Left,
        Control::Right,
        Control::Jump,
    ];
}

/// Map a physical key to its control, if any
pub fn control_for_key(key: KeyCode) -> Option<Control> {
    match key {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(Control::Forward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(Control::Backward),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(Control::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(Control::Right),
        KeyCode::Space => Some(Control::Jump),
        _ => None,
    }
}

/// Snapshot of which controls are held
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlsState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl ControlsState {
    pub fn is_pressed(&self, control: Control) -> bool {
        match control {
            Control::Forward => self.forward,
            Control::Backward => self.backward,
            Control::Left => self.left,
            Control::Right => self.right,
            Control::Jump => self.jump,
        }
    }

    fn set(&mut self, control: Control, pressed: bool) {
        match control {
            Control::Forward => self.forward = pressed,
            Control::Backward => self.backward = pressed,
            Control::Left => self.left = pressed,
            Control::Right => self.right = pressed,
            Control::Jump => self.jump = pressed,
        }
    }

    /// Builder-style setter, mostly for tests and scripted input
    pub fn with(mut self, control: Control, pressed: bool) -> Self {
        self.set(control, pressed);
        self
    }

    /// Check if any control is held
    pub fn any(&self) -> bool {
        Control::ALL.iter().any(|c| self.is_pressed(*c))
    }
}

/// A control changed state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlEvent {
    pub control: Control,
    pub pressed: bool,
}

impl ControlEvent {
    pub fn pressed(control: Control) -> Self {
        Self {
            control,
            pressed: true,
        }
    }

    pub fn released(control: Control) -> Self {
        Self {
            control,
            pressed: false,
        }
    }
}

/// Tracks held controls and queues edge events between frames
#[derive(Debug, Default)]
pub struct KeyboardControls {
    state: ControlsState,
    events: Vec<ControlEvent>,
}

impl KeyboardControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process keyboard input
    ///
    /// Returns true if the key is bound to a control. OS key repeat does not
    /// produce events: only real state changes are queued.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let Some(control) = control_for_key(key) else {
            return false;
        };
        self.set_control(control, state == ElementState::Pressed);
        true
    }

    /// Set a control directly, queueing an event when it changes
    pub fn set_control(&mut self, control: Control, pressed: bool) {
        if self.state.is_pressed(control) != pressed {
            self.state.set(control, pressed);
            self.events.push(ControlEvent { control, pressed });
        }
    }

    /// Current held state
    pub fn snapshot(&self) -> ControlsState {
        self.state
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.events)
    }

    /// Release every held control (e.g. when the window loses focus)
    pub fn release_all(&mut self) {
        for control in Control::ALL {
            self.set_control(control, false);
        }
    }
}
