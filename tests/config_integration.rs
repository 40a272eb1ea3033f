//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use marble_race::config::AppConfig;
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("MARBLE_WINDOW__TITLE", "Test From Env");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.window.title, "Test From Env");
    std::env::remove_var("MARBLE_WINDOW__TITLE");
}

#[test]
#[serial]
fn test_env_overrides_level_count() {
    std::env::set_var("MARBLE_LEVEL__COUNT", "9");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("MARBLE_LEVEL__COUNT");

    assert_eq!(config.level.count, 9);
    assert_eq!(config.to_race_config().blocks_count, 9);
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("MARBLE_WINDOW__TITLE");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = AppConfig::load().unwrap();
    assert_eq!(config.physics.gravity, -9.81);
    assert_eq!(config.player.spawn, [0.0, 1.0, 0.0]);
    assert_eq!(config.level.palette.len(), 3);
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from("does/not/exist").unwrap();
    assert_eq!(config.window.title, "Marble Race");
    assert_eq!(config.level.count, 5);
}

#[test]
#[serial]
fn test_bad_value_is_an_error() {
    std::env::set_var("MARBLE_LEVEL__COUNT", "lots");
    let result = AppConfig::load();
    std::env::remove_var("MARBLE_LEVEL__COUNT");

    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}
