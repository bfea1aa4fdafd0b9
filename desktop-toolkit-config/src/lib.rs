//! Configuration system for desktop-toolkit.
//!
//! This crate provides configuration loading, saving, validation and default
//! values for the dispatcher, the debug log and newly created windows.

pub mod config;
pub mod defaults;
pub mod error;
mod persistence;
mod types;

pub use config::{Config, DispatcherConfig, WindowDefaults};
pub use error::ConfigError;
pub use types::{LogLevel, ShutdownPolicy};
