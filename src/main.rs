//! Marble Race
//!
//! Roll a marble down a procedurally generated obstacle track against the clock.

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use marble_core::{Race, SystemClock};
use marble_input::KeyboardControls;
use marble_race::config::AppConfig;
use marble_race::input::{InputAction, InputMapper};
use marble_race::systems::{SimulationSystem, WindowError, WindowSystem};

/// Main application state
struct App {
    config: AppConfig,
    window: Option<WindowSystem>,
    simulation: SimulationSystem,
    controls: KeyboardControls,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let race = Race::new(config.to_race_config(), SystemClock);
        let simulation = SimulationSystem::new(race, config.physics.max_frame_dt);

        log::info!(
            "Race ready: {} blocks, palette {:?}",
            config.level.count,
            config.level.palette
        );

        Self {
            config,
            window: None,
            simulation,
            controls: KeyboardControls::new(),
        }
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::Exit => event_loop.exit(),
            InputAction::Restart => {
                self.simulation.race_mut().restart();
            }
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    window.toggle_fullscreen();
                }
            }
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let keys = self.controls.snapshot();
        let events = self.controls.drain_events();

        match self.simulation.update(&keys, &events) {
            Ok(hud) => {
                if let Some(window) = &mut self.window {
                    window.update_title(&hud);
                }
            }
            Err(e) => {
                log::error!("Simulation failed: {}", e);
                event_loop.exit();
                return;
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match WindowSystem::create(event_loop, &self.config.window) {
            Ok(window) => {
                window.request_redraw();
                self.window = Some(window);
                self.simulation.reset_timer();
            }
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Focused(false) => {
                self.controls.release_all();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(key) = event.physical_key {
                    if let Some(action) = InputMapper::map_keyboard(key, event.state) {
                        self.handle_action(action, event_loop);
                        return;
                    }
                    self.controls.process_keyboard(key, event.state);
                }
            }

            WindowEvent::RedrawRequested => self.frame(event_loop),

            _ => {}
        }
    }
}

fn run(config: AppConfig) -> Result<(), WindowError> {
    let event_loop = EventLoop::new().map_err(|e| WindowError::EventLoop(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| WindowError::EventLoop(e.to_string()))
}

fn main() {
    let config = AppConfig::load();

    // RUST_LOG wins over the configured level
    let default_level = config
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    log::info!("Starting Marble Race");

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    if let Err(e) = run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
