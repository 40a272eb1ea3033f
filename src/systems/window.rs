//! Window management system
//!
//! Handles window creation, fullscreen toggle, and the title line that
//! carries the race HUD.

use std::sync::Arc;
use marble_core::{ControlsState, GamePhase, HudSnapshot};
use winit::{
    event_loop::ActiveEventLoop,
    window::{Fullscreen, Window},
};
use crate::config::WindowConfig;

/// Manages the application window
pub struct WindowSystem {
    window: Arc<Window>,
    base_title: String,
    last_title: String,
}

impl WindowSystem {
    /// Create window from config
    pub fn create(
        event_loop: &ActiveEventLoop,
        config: &WindowConfig,
    ) -> Result<Self, WindowError> {
        let mut attrs = Window::default_attributes()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.width,
                config.height,
            ));

        if config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| WindowError::CreationFailed(e.to_string()))?,
        );

        Ok(Self {
            window,
            base_title: config.title.clone(),
            last_title: config.title.clone(),
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&self) {
        let new_fullscreen = if self.window.fullscreen().is_some() {
            None
        } else {
            Some(Fullscreen::Borderless(None))
        };
        self.window.set_fullscreen(new_fullscreen);
    }

    /// Show the HUD in the window title
    pub fn update_title(&mut self, hud: &HudSnapshot) {
        let title = format_title(&self.base_title, hud);
        if title != self.last_title {
            self.window.set_title(&title);
            self.last_title = title;
        }
    }

    /// Request a redraw
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

/// Held keys as a compact indicator, e.g. `"W . . D _"`
pub fn key_indicator(keys: &ControlsState) -> String {
    let mark = |held: bool, label: &'static str| if held { label } else { "." };
    [
        mark(keys.forward, "W"),
        mark(keys.left, "A"),
        mark(keys.backward, "S"),
        mark(keys.right, "D"),
        if keys.jump { "_" } else { "." },
    ]
    .join(" ")
}

/// Title line for a HUD snapshot
pub fn format_title(base: &str, hud: &HudSnapshot) -> String {
    let status = match hud.phase {
        GamePhase::Ready => "press any key",
        GamePhase::Playing => "racing",
        GamePhase::Ended => "finished [R to restart]",
    };
    format!(
        "{} - {} - {} [{}]",
        base,
        hud.time_text,
        status,
        key_indicator(&hud.keys)
    )
}

#[derive(Debug)]
pub enum WindowError {
    CreationFailed(String),
    EventLoop(String),
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::CreationFailed(msg) => write!(f, "Window creation failed: {}", msg),
            WindowError::EventLoop(msg) => write!(f, "Event loop error: {}", msg),
        }
    }
}

impl std::error::Error for WindowError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn hud(phase: GamePhase, time_text: &str, show_restart: bool) -> HudSnapshot {
        HudSnapshot {
            phase,
            time_text: time_text.to_string(),
            show_restart,
            keys: ControlsState::default(),
        }
    }

    #[test]
    fn test_title_while_playing() {
        let title = format_title("Marble Race", &hud(GamePhase::Playing, "3.21", false));
        assert_eq!(title, "Marble Race - 3.21 - racing [. . . . .]");
    }

    #[test]
    fn test_title_offers_restart_when_ended() {
        let title = format_title("Marble Race", &hud(GamePhase::Ended, "12.00", true));
        assert!(title.contains("12.00"));
        assert!(title.contains("R to restart"));
    }

    #[test]
    fn test_key_indicator() {
        let keys = ControlsState {
            forward: true,
            right: true,
            jump: true,
            ..ControlsState::default()
        };
        assert_eq!(key_indicator(&keys), "W . . D _");
    }
}
