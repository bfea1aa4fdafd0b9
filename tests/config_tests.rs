mod common;

use std::time::Duration;

use common::{default_config_with_tmp_dir, write_config};
use desktop_toolkit::config::{Config, ConfigError, LogLevel, ShutdownPolicy};
use desktop_toolkit::{DispatcherOptions, WindowParams};
use desktop_toolkit::events::LogicalSize;

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.log_level, LogLevel::Off);
    assert_eq!(config.dispatcher.shutdown_policy, ShutdownPolicy::Drain);
    assert_eq!(config.dispatcher.sync_timeout_ms, None);
    assert_eq!(config.dispatcher.slow_item_warn_ms, 100);
    assert_eq!(config.window.title, "desktop-toolkit");
    assert_eq!(config.window.width, 800.0);
    assert_eq!(config.window.height, 600.0);
}

#[test]
fn test_partial_yaml_keeps_defaults() {
    let (path, _temp) = write_config("dispatcher:\n  shutdown_policy: cancel\n");
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.dispatcher.shutdown_policy, ShutdownPolicy::Cancel);
    assert_eq!(config.dispatcher.slow_item_warn_ms, 100);
    assert_eq!(config.window, Config::default().window);
}

#[test]
fn test_full_yaml_round_trip() {
    let (mut config, temp) = default_config_with_tmp_dir();
    config.log_level = LogLevel::Debug;
    config.dispatcher.sync_timeout_ms = Some(2_000);
    config.window.title = "Viewer".to_string();
    config.window.width = 1280.0;

    let path = temp.path().join("config.yaml");
    config.save_to(&path).unwrap();
    let yaml = std::fs::read_to_string(&path).unwrap();
    assert!(yaml.contains("log_level: debug"));
    assert!(yaml.contains("shutdown_policy: drain"));

    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_zero_sync_timeout_is_rejected() {
    let (path, _temp) = write_config("dispatcher:\n  sync_timeout_ms: 0\n");
    match Config::load_from(&path) {
        Err(ConfigError::Validation(message)) => assert!(message.contains("sync_timeout_ms")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_unknown_shutdown_policy_is_a_parse_error() {
    let (path, _temp) = write_config("dispatcher:\n  shutdown_policy: later\n");
    assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_dispatcher_options_follow_config() {
    let (path, _temp) =
        write_config("dispatcher:\n  sync_timeout_ms: 250\n  slow_item_warn_ms: 0\n");
    let config = Config::load_from(&path).unwrap();
    let options = DispatcherOptions::from(&config.dispatcher);
    assert_eq!(options.sync_timeout, Some(Duration::from_millis(250)));
    assert_eq!(options.slow_item_warn, None);
    assert_eq!(options.shutdown_policy, ShutdownPolicy::Drain);
}

#[test]
fn test_window_params_follow_config() {
    let (path, _temp) =
        write_config("window:\n  title: Notes\n  width: 500\n  height: 400\n  min_width: 100\n");
    let config = Config::load_from(&path).unwrap();
    let params = WindowParams::from_defaults(&config.window);
    assert_eq!(params.title, "Notes");
    assert_eq!(params.size, LogicalSize::new(500.0, 400.0));
    assert_eq!(
        params.min_size,
        Some(LogicalSize::new(100.0, config.window.min_height))
    );
}
