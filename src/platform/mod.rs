//! Platform binding abstraction for desktop-toolkit.
//!
//! The native windowing layer is reached only through [`PlatformBinding`]:
//! inbound it yields native event records, outbound it creates and destroys
//! windows and executes [`WindowCommand`]s. The event taxonomy of the platform
//! is a type-level parameter of the binding, so an application built for one
//! platform cannot be handed another platform's events.
//!
//! # Contents
//!
//! | Item | Description |
//! |---|---|
//! | [`PlatformBinding`] | Contract between the application and the native layer |
//! | [`HeadlessBinding`] | In-process binding without a display server |
//! | [`NativeEventSender`] | Thread-safe injector of native event records |
//! | [`NativeError`] | Failure reported by the native layer |

mod headless;

pub use headless::{HeadlessBinding, HeadlessWindow, NativeEventSender};

use desktop_toolkit_events::{EventTaxonomy, LogicalSize, OwnedRawEvent, Platform, WindowId};
use thiserror::Error;

use crate::window::{WindowCommand, WindowParams};

/// A failure reported by the native windowing layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Native {operation} failed: {message}")]
pub struct NativeError {
    pub operation: &'static str,
    pub message: String,
}

impl NativeError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// The event type delivered by binding `B`.
pub type EventOf<B> = <<B as PlatformBinding>::Taxonomy as EventTaxonomy>::Event;

/// Contract between an [`Application`](crate::Application) and the native
/// windowing layer.
///
/// All methods are called on the UI thread only.
pub trait PlatformBinding {
    type Taxonomy: EventTaxonomy;

    fn platform(&self) -> Platform {
        Self::Taxonomy::PLATFORM
    }

    /// Called once when the event loop starts.
    fn start(&mut self) -> Result<(), NativeError> {
        Ok(())
    }

    /// Next pending native event record, if any. Never blocks.
    fn poll_event(&mut self) -> Option<OwnedRawEvent>;

    fn create_window(&mut self, id: WindowId, params: &WindowParams) -> Result<(), NativeError>;

    fn destroy_window(&mut self, id: WindowId) -> Result<(), NativeError>;

    fn execute(&mut self, id: WindowId, command: WindowCommand) -> Result<(), NativeError>;

    fn window_size(&self, id: WindowId) -> Result<LogicalSize, NativeError>;
}
