//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`MARBLE_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use marble_core::{CameraTuning, ObstacleKind, PhysicsConfig as WorldConfig, PlayerTuning, RaceConfig, Vec3};
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Level generation
    #[serde(default)]
    pub level: LevelConfig,
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Marble tuning
    #[serde(default)]
    pub player: PlayerConfig,
    /// Chase camera tuning
    #[serde(default)]
    pub camera: CameraConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`MARBLE_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // MARBLE_LEVEL__COUNT=8 -> level.count = 8
        figment = figment.merge(Env::prefixed("MARBLE_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Everything the race session needs
    pub fn to_race_config(&self) -> RaceConfig {
        RaceConfig {
            blocks_count: self.level.count,
            palette: self.level.palette.clone(),
            seeded: self.level.seeded,
            physics: self.physics.to_physics_config(),
            player: self.player.to_player_tuning(),
            camera: self.camera.to_camera_tuning(),
        }
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Marble Race".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

/// Level generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Number of obstacle segments
    pub count: u32,
    /// Obstacle kinds to draw from
    pub palette: Vec<ObstacleKind>,
    /// Derive obstacle draws from the level seed
    pub seeded: bool,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let race = RaceConfig::default();
        Self {
            count: race.blocks_count,
            palette: race.palette,
            seeded: race.seeded,
        }
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity (negative = downward)
    pub gravity: f32,
    /// Solver passes per step
    pub solver_iterations: usize,
    /// Longest frame simulated in one tick, in seconds
    pub max_frame_dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            gravity: world.gravity,
            solver_iterations: world.solver_iterations,
            max_frame_dt: 1.0 / 30.0,
        }
    }
}

impl PhysicsConfig {
    pub fn to_physics_config(&self) -> WorldConfig {
        WorldConfig {
            gravity: self.gravity,
            solver_iterations: self.solver_iterations,
        }
    }
}

/// Marble configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Spawn position [x, y, z]
    pub spawn: [f32; 3],
    /// Marble radius
    pub radius: f32,
    /// Directional impulse per second
    pub impulse_strength: f32,
    /// Rolling torque per second
    pub torque_strength: f32,
    /// Jump impulse
    pub jump_impulse: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let tuning = PlayerTuning::default();
        Self {
            spawn: tuning.spawn.to_array(),
            radius: tuning.radius,
            impulse_strength: tuning.impulse_strength,
            torque_strength: tuning.torque_strength,
            jump_impulse: tuning.jump_impulse,
            linear_damping: tuning.linear_damping,
            angular_damping: tuning.angular_damping,
        }
    }
}

impl PlayerConfig {
    pub fn to_player_tuning(&self) -> PlayerTuning {
        PlayerTuning {
            spawn: Vec3::from_array(self.spawn),
            radius: self.radius,
            impulse_strength: self.impulse_strength,
            torque_strength: self.torque_strength,
            jump_impulse: self.jump_impulse,
            linear_damping: self.linear_damping,
            angular_damping: self.angular_damping,
            ..PlayerTuning::default()
        }
    }
}

/// Chase camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera position relative to the marble [x, y, z]
    pub offset: [f32; 3],
    /// Look-at point relative to the marble [x, y, z]
    pub target_offset: [f32; 3],
    /// Smoothing rate per second (higher = snappier)
    pub smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let tuning = CameraTuning::default();
        Self {
            offset: tuning.offset.to_array(),
            target_offset: tuning.target_offset.to_array(),
            smoothing: tuning.smoothing,
        }
    }
}

impl CameraConfig {
    pub fn to_camera_tuning(&self) -> CameraTuning {
        CameraTuning {
            offset: Vec3::from_array(self.offset),
            target_offset: Vec3::from_array(self.target_offset),
            smoothing: self.smoothing,
            ..CameraTuning::default()
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.physics.gravity, -9.81);
        assert_eq!(config.level.count, 5);
        assert!(!config.level.seeded);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("title"));
        assert!(toml.contains("gravity"));
        assert!(toml.contains("palette"));
        assert!(toml.contains("\"limbo\""));
    }

    #[test]
    fn test_partial_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [level]
            count = 12
            palette = ["donut", "axe"]
            "#,
        )
        .unwrap();
        assert_eq!(config.level.count, 12);
        assert_eq!(config.level.palette, vec![ObstacleKind::Donut, ObstacleKind::Axe]);
        assert!(!config.level.seeded);
        assert_eq!(config.player.radius, 0.3);
    }

    #[test]
    fn test_to_race_config() {
        let mut config = AppConfig::default();
        config.level.count = 7;
        config.player.spawn = [0.0, 2.0, 0.0];
        config.camera.smoothing = 3.0;

        let race = config.to_race_config();
        assert_eq!(race.blocks_count, 7);
        assert_eq!(race.player.spawn, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(race.player.grounded_toi, PlayerTuning::default().grounded_toi);
        assert_eq!(race.camera.smoothing, 3.0);
        assert_eq!(race.physics.gravity, -9.81);
    }
}
