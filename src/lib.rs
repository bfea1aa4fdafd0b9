// Library exports for testing and potential library use
//
// # Threading model
//
// Everything that touches windows or the installed event handler runs on one
// thread, the main thread, bound to a `Dispatcher`. Other threads reach it
// only through `Clone + Send + Sync` handles:
//
//   - `Dispatcher`         : queue work onto the main thread, optionally
//                            waiting for its result.
//   - `EventLoopStopper`   : ask a running event loop to return.
//   - `NativeEventSender`  : inject native event records (headless binding).
//
// Shared state behind those handles uses `parking_lot` locks.

/// Library version (root crate version).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod application;
pub mod cli;
pub mod debug;
pub mod dispatcher;
pub mod error;
pub mod platform;
pub mod sample;
pub mod window;

pub use application::{AppContext, Application, EventHandler, EventLoopStopper};
pub use dispatcher::{Dispatcher, DispatcherOptions, Priority, Work};
pub use error::{DesktopError, DispatchError, WindowError};
pub use platform::{
    EventOf, HeadlessBinding, HeadlessWindow, NativeError, NativeEventSender, PlatformBinding,
};
pub use window::{DragAction, WindowCommand, WindowParams, WindowRegistry};

pub use desktop_toolkit_config as config;
pub use desktop_toolkit_events as events;
