//! Typed error variants for the desktop-toolkit crate.
//!
//! Every misuse of the toolkit surfaces as one of these values: submitting
//! to a closed dispatcher, draining from a foreign thread, addressing a window
//! that is gone. None of them is silently ignored.

use desktop_toolkit_config::ConfigError;
use desktop_toolkit_events::{DecodeError, WindowId};
use thiserror::Error;

use crate::platform::NativeError;

/// Errors raised by the main-thread dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The dispatcher was closed and accepts no new work.
    #[error("Dispatcher is closed")]
    Closed,

    /// A UI-thread-only operation was called from another thread.
    #[error("Operation must run on the main thread")]
    NotMainThread,

    /// A different thread is already bound as the main thread.
    #[error("Dispatcher is already bound to another thread")]
    AlreadyBound,

    /// The synchronously dispatched work panicked on the main thread.
    #[error("Dispatched work panicked: {0}")]
    Panicked(String),

    /// The work item was dropped without running (cancel-on-close).
    #[error("Dispatched work was cancelled before it ran")]
    Cancelled,

    /// The synchronous wait exceeded the configured timeout.
    #[error("Timed out waiting for the main thread")]
    Timeout,
}

/// Errors raised by window commands.
#[derive(Debug, Error)]
pub enum WindowError {
    /// The window existed but has been closed.
    #[error("{0} is closed")]
    Closed(WindowId),

    /// The id was never issued by this application.
    #[error("{0} is unknown")]
    Unknown(WindowId),

    /// The native layer rejected the command.
    #[error("Native command on {id} failed")]
    Native {
        id: WindowId,
        #[source]
        source: NativeError,
    },
}

/// Umbrella error for application-level operations.
#[derive(Debug, Error)]
pub enum DesktopError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The native layer failed outside of any window command.
    #[error(transparent)]
    Native(#[from] NativeError),
}
