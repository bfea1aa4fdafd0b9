//! Core `Config` struct, its sections and semantic validation.

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ConfigError;
use crate::types::{LogLevel, ShutdownPolicy};

/// Top-level desktop-toolkit configuration, stored as YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Debug log verbosity (overridden by `RUST_LOG` and `--log-level`)
    pub log_level: LogLevel,

    /// Main-thread dispatcher behaviour
    pub dispatcher: DispatcherConfig,

    /// Parameters for windows created without explicit values
    pub window: WindowDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Fate of queued work when the dispatcher is closed
    pub shutdown_policy: ShutdownPolicy,

    /// Upper bound on how long a synchronous dispatch blocks its caller.
    /// `None` waits indefinitely.
    pub sync_timeout_ms: Option<u64>,

    /// Work items running longer than this are reported with a warning.
    /// `0` disables the report.
    #[serde(default = "defaults::slow_item_warn_ms")]
    pub slow_item_warn_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            shutdown_policy: ShutdownPolicy::default(),
            sync_timeout_ms: None,
            slow_item_warn_ms: defaults::slow_item_warn_ms(),
        }
    }
}

/// Initial window parameters, in logical pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowDefaults {
    #[serde(default = "defaults::window_title")]
    pub title: String,
    #[serde(default = "defaults::window_width")]
    pub width: f64,
    #[serde(default = "defaults::window_height")]
    pub height: f64,
    #[serde(default = "defaults::window_min_width")]
    pub min_width: f64,
    #[serde(default = "defaults::window_min_height")]
    pub min_height: f64,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            title: defaults::window_title(),
            width: defaults::window_width(),
            height: defaults::window_height(),
            min_width: defaults::window_min_width(),
            min_height: defaults::window_min_height(),
        }
    }
}

impl Config {
    /// Check semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatcher.sync_timeout_ms == Some(0) {
            return Err(ConfigError::Validation(
                "dispatcher.sync_timeout_ms must be greater than 0 (omit it to wait indefinitely)"
                    .to_string(),
            ));
        }

        let w = &self.window;
        for (name, value) in [
            ("window.width", w.width),
            ("window.height", w.height),
            ("window.min_width", w.min_width),
            ("window.min_height", w.min_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if w.width == 0.0 || w.height == 0.0 {
            return Err(ConfigError::Validation(format!(
                "window size must be non-zero, got {}x{}",
                w.width, w.height
            )));
        }
        if w.min_width > w.width || w.min_height > w.height {
            return Err(ConfigError::Validation(format!(
                "window minimum size {}x{} exceeds window size {}x{}",
                w.min_width, w.min_height, w.width, w.height
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.log_level, LogLevel::Off);
        assert_eq!(config.dispatcher.shutdown_policy, ShutdownPolicy::Drain);
        assert_eq!(config.dispatcher.slow_item_warn_ms, 100);
        assert_eq!(config.window.title, "desktop-toolkit");
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "dispatcher:\n  shutdown_policy: cancel\nwindow:\n  width: 1024\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.dispatcher.shutdown_policy, ShutdownPolicy::Cancel);
        assert_eq!(config.dispatcher.slow_item_warn_ms, 100);
        assert_eq!(config.window.width, 1024.0);
        assert_eq!(config.window.height, 600.0);
        assert_eq!(config.window.title, "desktop-toolkit");
    }

    #[test]
    fn test_zero_sync_timeout_rejected() {
        let mut config = Config::default();
        config.dispatcher.sync_timeout_ms = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_min_size_larger_than_size_rejected() {
        let mut config = Config::default();
        config.window.min_width = 2000.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("minimum size"));
    }

    #[test]
    fn test_non_finite_size_rejected() {
        let mut config = Config::default();
        config.window.height = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }
}
