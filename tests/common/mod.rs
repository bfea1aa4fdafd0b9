//! Shared integration test helpers for desktop-toolkit.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{bound_dispatcher, headless_app};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers is used per file.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use desktop_toolkit::config::{Config, ShutdownPolicy};
use desktop_toolkit::events::EventTaxonomy;
use desktop_toolkit::{Application, Dispatcher, DispatcherOptions, HeadlessBinding};
use tempfile::TempDir;

/// Dispatcher bound to the calling test thread.
pub fn bound_dispatcher() -> Dispatcher {
    bound_dispatcher_with(DispatcherOptions::default())
}

pub fn bound_dispatcher_with(options: DispatcherOptions) -> Dispatcher {
    let dispatcher = Dispatcher::new(options);
    dispatcher
        .bind_to_current_thread()
        .expect("fresh dispatcher binds");
    dispatcher
}

pub fn options_with_policy(policy: ShutdownPolicy) -> DispatcherOptions {
    DispatcherOptions {
        shutdown_policy: policy,
        ..DispatcherOptions::default()
    }
}

/// Headless application for taxonomy `T` with its own dispatcher.
pub fn headless_app<T: EventTaxonomy>() -> Application<HeadlessBinding<T>> {
    let dispatcher = Dispatcher::default();
    let binding = HeadlessBinding::new(dispatcher.clone());
    Application::new(dispatcher, binding)
}

/// Drain on the bound thread until `done` holds or `timeout` elapses.
pub fn pump_until(dispatcher: &Dispatcher, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        dispatcher.drain().expect("pump runs on the main thread");
        if done() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        let _ = dispatcher.wait(Some((deadline - now).min(Duration::from_millis(10))));
    }
}

/// Run `body` on a fresh thread and hand back its result.
pub fn on_worker<T: Send + 'static>(body: impl FnOnce() -> T + Send + 'static) -> T {
    thread::spawn(body).join().expect("worker thread panicked")
}

/// Write `contents` to `config.yaml` inside a fresh temp dir.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn write_config(contents: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.yaml");
    fs::write(&path, contents).expect("Failed to write config");
    (path, temp_dir)
}

pub fn default_config_with_tmp_dir() -> (Config, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    (Config::default(), temp_dir)
}
