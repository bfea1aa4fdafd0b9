//! Application event routing and the window command surface.
//!
//! An [`Application`] owns a [`PlatformBinding`], the window registry and the
//! installed event handler. Native event records are decoded into the
//! platform's typed events and handed to the handler on the UI thread; its
//! [`EventHandlerResult`] goes back to the native layer.
//!
//! Handlers receive an [`AppContext`], through which they create windows and
//! send commands to them. Commands addressed to a closed window fail with
//! [`WindowError::Closed`] rather than being dropped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use desktop_toolkit_config::WindowDefaults;
use desktop_toolkit_events::{
    EventHandlerResult, EventTaxonomy, LogicalPoint, LogicalSize, PlatformEvent, RawEvent,
    WindowId,
};

use crate::dispatcher::{Dispatcher, panic_message};
use crate::error::{DesktopError, WindowError};
use crate::platform::{EventOf, PlatformBinding};
use crate::window::{DragAction, WindowCommand, WindowParams, WindowRegistry};

/// Boxed event handler for binding `B`.
pub type EventHandler<B> = Box<dyn FnMut(&mut AppContext<B>, &EventOf<B>) -> EventHandlerResult>;

/// Thread-safe handle that asks a running event loop to return.
#[derive(Clone)]
pub struct EventLoopStopper {
    stop_requested: Arc<AtomicBool>,
    dispatcher: Dispatcher,
}

impl EventLoopStopper {
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.dispatcher.wake();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

/// Everything an event handler may touch: windows, the binding and the
/// dispatcher.
pub struct AppContext<B: PlatformBinding> {
    binding: B,
    windows: WindowRegistry,
    dispatcher: Dispatcher,
    stop_requested: Arc<AtomicBool>,
    window_defaults: WindowDefaults,
}

impl<B: PlatformBinding> AppContext<B> {
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut B {
        &mut self.binding
    }

    /// Parameters for a window built from the configured defaults.
    pub fn default_window_params(&self) -> WindowParams {
        WindowParams::from_defaults(&self.window_defaults)
    }

    pub fn create_window(&mut self, params: &WindowParams) -> Result<WindowId, WindowError> {
        let id = self.windows.allocate();
        if let Err(source) = self.binding.create_window(id, params) {
            // The id stays issued, so it reads as closed from now on.
            let _ = self.windows.release(id);
            log::error!("Native window creation failed for {}: {}", id, source);
            return Err(WindowError::Native { id, source });
        }
        log::info!("Created {} ({:?})", id, params.title);
        Ok(id)
    }

    /// Close and destroy a window. Closing it a second time is an error.
    ///
    /// The id is released only once the native window is gone, so a failed
    /// destroy leaves the window open and the close can be retried.
    pub fn close_window(&mut self, id: WindowId) -> Result<(), WindowError> {
        self.windows.check(id)?;
        self.binding
            .destroy_window(id)
            .map_err(|source| WindowError::Native { id, source })?;
        self.windows.release(id)?;
        log::info!("Closed {}", id);
        Ok(())
    }

    pub fn show(&mut self, id: WindowId) -> Result<(), WindowError> {
        self.command(id, WindowCommand::Show)
    }

    pub fn set_title(&mut self, id: WindowId, title: impl Into<String>) -> Result<(), WindowError> {
        self.command(id, WindowCommand::SetTitle(title.into()))
    }

    pub fn set_rect(
        &mut self,
        id: WindowId,
        origin: LogicalPoint,
        size: LogicalSize,
    ) -> Result<(), WindowError> {
        self.command(id, WindowCommand::SetRect { origin, size })
    }

    pub fn set_min_size(&mut self, id: WindowId, size: LogicalSize) -> Result<(), WindowError> {
        self.command(id, WindowCommand::SetMinSize(size))
    }

    pub fn request_redraw(&mut self, id: WindowId) -> Result<(), WindowError> {
        self.command(id, WindowCommand::RequestRedraw)
    }

    /// Ask the native layer to close the window. It answers with a
    /// close-request event; the window stays open until that is handled.
    pub fn request_close(&mut self, id: WindowId) -> Result<(), WindowError> {
        self.command(id, WindowCommand::RequestClose)
    }

    /// Start a drag offering data in `mime_types`. The outcome arrives later
    /// as one of the platform's drag-and-drop events.
    pub fn start_drag(
        &mut self,
        id: WindowId,
        mime_types: Vec<String>,
        action: DragAction,
    ) -> Result<(), WindowError> {
        self.command(id, WindowCommand::StartDrag { mime_types, action })
    }

    pub fn window_size(&self, id: WindowId) -> Result<LogicalSize, WindowError> {
        self.windows.check(id)?;
        self.binding
            .window_size(id)
            .map_err(|source| WindowError::Native { id, source })
    }

    pub fn is_window_open(&self, id: WindowId) -> bool {
        self.windows.is_open(id)
    }

    pub fn open_windows(&self) -> Vec<WindowId> {
        self.windows.open_windows()
    }

    /// Make the running event loop return after the current event.
    pub fn stop_event_loop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.dispatcher.wake();
    }

    fn command(&mut self, id: WindowId, command: WindowCommand) -> Result<(), WindowError> {
        self.windows.check(id)?;
        log::debug!("{} <- {}", id, command.name());
        self.binding
            .execute(id, command)
            .map_err(|source| WindowError::Native { id, source })
    }
}

/// A desktop application bound to one platform binding.
pub struct Application<B: PlatformBinding> {
    context: AppContext<B>,
    handler: Option<EventHandler<B>>,
}

impl<B: PlatformBinding> Application<B> {
    pub fn new(dispatcher: Dispatcher, binding: B) -> Self {
        Self {
            context: AppContext {
                binding,
                windows: WindowRegistry::new(),
                dispatcher,
                stop_requested: Arc::new(AtomicBool::new(false)),
                window_defaults: WindowDefaults::default(),
            },
            handler: None,
        }
    }

    pub fn with_window_defaults(mut self, defaults: WindowDefaults) -> Self {
        self.context.window_defaults = defaults;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.context.dispatcher
    }

    pub fn context(&self) -> &AppContext<B> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut AppContext<B> {
        &mut self.context
    }

    /// Install the handler that receives every decoded event, replacing any
    /// previous one.
    pub fn install_event_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut AppContext<B>, &EventOf<B>) -> EventHandlerResult + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    pub fn stopper(&self) -> EventLoopStopper {
        EventLoopStopper {
            stop_requested: Arc::clone(&self.context.stop_requested),
            dispatcher: self.context.dispatcher.clone(),
        }
    }

    /// Decode a native event record and route it to the handler.
    ///
    /// A record that does not decode is an error; the native layer and this
    /// build disagree on the record format.
    pub fn handle_raw_event(&mut self, raw: RawEvent<'_>) -> Result<EventHandlerResult, DesktopError> {
        let event = B::Taxonomy::decode(raw).inspect_err(|e| {
            log::error!("Failed to decode native event (tag {}): {}", raw.tag(), e);
        })?;
        Ok(self.handle_event(&event))
    }

    /// Route a decoded event to the handler.
    ///
    /// Without a handler, or when the handler panics, the result is
    /// `Continue`. An unconsumed close request closes its window.
    pub fn handle_event(&mut self, event: &EventOf<B>) -> EventHandlerResult {
        log::trace!("Routing {} ({:?})", event.name(), event.window_id());
        let result = match self.handler.as_mut() {
            None => {
                log::warn!("No event handler installed, ignoring {}", event.name());
                EventHandlerResult::Continue
            }
            Some(handler) => {
                let context = &mut self.context;
                match panic::catch_unwind(AssertUnwindSafe(|| handler(context, event))) {
                    Ok(result) => result,
                    Err(payload) => {
                        log::error!(
                            "Event handler panicked on {}: {}",
                            event.name(),
                            panic_message(payload.as_ref())
                        );
                        EventHandlerResult::Continue
                    }
                }
            }
        };

        if !result.is_consumed() && event.is_close_request() {
            self.close_requested_window(event.window_id());
        }
        result
    }

    /// Run the event loop on the calling thread, which becomes the main
    /// thread.
    ///
    /// Each turn polls every pending native record, then drains dispatched
    /// work, then sleeps until either arrives. Returns when a stop is
    /// requested or the dispatcher has been closed and drained, or with the
    /// first decode error.
    pub fn run_event_loop(&mut self) -> Result<(), DesktopError> {
        let dispatcher = self.context.dispatcher.clone();
        dispatcher.bind_to_current_thread()?;
        self.context.binding.start()?;
        log::info!(
            "Event loop started on {}",
            <B::Taxonomy as EventTaxonomy>::PLATFORM
        );

        let mut events = 0usize;
        loop {
            while !self.stop_requested() {
                let Some(raw) = self.context.binding.poll_event() else {
                    break;
                };
                self.handle_raw_event(raw.as_raw())?;
                events += 1;
            }
            dispatcher.drain()?;

            if self.stop_requested() {
                log::info!("Event loop stop requested");
                break;
            }
            if dispatcher.is_closed() && dispatcher.pending() == 0 {
                log::info!("Dispatcher closed, leaving event loop");
                break;
            }
            dispatcher.wait(None)?;
        }

        log::info!("Event loop finished after {} native event(s)", events);
        Ok(())
    }

    fn stop_requested(&self) -> bool {
        self.context.stop_requested.load(Ordering::SeqCst)
    }

    fn close_requested_window(&mut self, id: Option<WindowId>) {
        let Some(id) = id else {
            return;
        };
        if !self.context.is_window_open(id) {
            log::debug!("Close request for {} which is not open", id);
            return;
        }
        if let Err(e) = self.context.close_window(id) {
            log::error!("Failed to close {} on request: {}", id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessBinding;
    use desktop_toolkit_events::macos::{self, Macos};

    fn app() -> Application<HeadlessBinding<Macos>> {
        let dispatcher = Dispatcher::default();
        let binding = HeadlessBinding::new(dispatcher.clone());
        Application::new(dispatcher, binding)
    }

    #[test]
    fn test_no_handler_continues() {
        let mut app = app();
        let raw = Macos::encode(&macos::Event::ApplicationDidFinishLaunching);
        let result = app.handle_raw_event(raw.as_raw()).unwrap();
        assert_eq!(result, EventHandlerResult::Continue);
    }

    #[test]
    fn test_unknown_tag_is_decode_error() {
        let mut app = app();
        let result = app.handle_raw_event(RawEvent::new(999, &[]));
        assert!(matches!(result, Err(DesktopError::Decode(_))));
    }

    #[test]
    fn test_unconsumed_close_request_closes_window() {
        let mut app = app();
        let id = app
            .context_mut()
            .create_window(&WindowParams::default())
            .unwrap();
        app.install_event_handler(|_, _| EventHandlerResult::Continue);
        app.handle_event(&Macos::close_request(id));
        assert!(!app.context().is_window_open(id));
    }

    #[test]
    fn test_consumed_close_request_keeps_window() {
        let mut app = app();
        let id = app
            .context_mut()
            .create_window(&WindowParams::default())
            .unwrap();
        app.install_event_handler(|_, event| {
            EventHandlerResult::from_consumed(event.is_close_request())
        });
        assert_eq!(
            app.handle_event(&Macos::close_request(id)),
            EventHandlerResult::Stop
        );
        assert!(app.context().is_window_open(id));
    }

    #[test]
    fn test_window_size_reports_native_size() {
        let mut app = app();
        let ctx = app.context_mut();
        let id = ctx
            .create_window(&WindowParams::default().with_size(640.0, 480.0))
            .unwrap();
        assert_eq!(ctx.window_size(id).unwrap(), LogicalSize::new(640.0, 480.0));
        ctx.close_window(id).unwrap();
        assert!(matches!(ctx.window_size(id), Err(WindowError::Closed(_))));
    }
}
