//! In-process platform binding that runs without a display server.
//!
//! Windows are plain records; commands update them and are kept in an
//! execution log. Native event records are queued in an inbox that any thread
//! can feed through a [`NativeEventSender`], which also wakes the UI thread.

use std::collections::{HashMap, VecDeque};
use std::marker::PhantomData;
use std::sync::Arc;

use desktop_toolkit_events::{EventTaxonomy, LogicalPoint, LogicalSize, OwnedRawEvent, WindowId};
use parking_lot::Mutex;

use super::{NativeError, PlatformBinding};
use crate::dispatcher::Dispatcher;
use crate::window::{WindowCommand, WindowParams};

type Inbox = Arc<Mutex<VecDeque<OwnedRawEvent>>>;

/// State of one headless window.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindow {
    pub title: String,
    pub origin: LogicalPoint,
    pub size: LogicalSize,
    pub min_size: Option<LogicalSize>,
    pub visible: bool,
    pub redraws_requested: u32,
}

impl HeadlessWindow {
    fn new(params: &WindowParams) -> Self {
        let mut window = Self {
            title: params.title.clone(),
            origin: LogicalPoint::default(),
            size: params.size,
            min_size: params.min_size,
            visible: params.visible,
            redraws_requested: 0,
        };
        window.clamp_to_min_size();
        window
    }

    fn clamp_to_min_size(&mut self) {
        if let Some(min) = self.min_size {
            self.size.width = self.size.width.max(min.width);
            self.size.height = self.size.height.max(min.height);
        }
    }
}

/// Cloneable handle that injects native event records from any thread.
#[derive(Clone)]
pub struct NativeEventSender {
    inbox: Inbox,
    dispatcher: Dispatcher,
}

impl NativeEventSender {
    /// Queue `event` and wake the UI thread.
    pub fn send(&self, event: OwnedRawEvent) {
        self.inbox.lock().push_back(event);
        self.dispatcher.wake();
    }

    /// Encode a typed event the way the native layer would and send it.
    pub fn send_event<T: EventTaxonomy>(&self, event: &T::Event) {
        self.send(T::encode(event));
    }
}

/// Headless stand-in for the native layer of platform `T`.
pub struct HeadlessBinding<T> {
    inbox: Inbox,
    dispatcher: Dispatcher,
    windows: HashMap<WindowId, HeadlessWindow>,
    executed: Vec<(WindowId, WindowCommand)>,
    fail_next: Option<&'static str>,
    _taxonomy: PhantomData<fn() -> T>,
}

impl<T: EventTaxonomy> HeadlessBinding<T> {
    /// `dispatcher` is woken whenever a native event record arrives.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            inbox: Arc::new(Mutex::new(VecDeque::new())),
            dispatcher,
            windows: HashMap::new(),
            executed: Vec::new(),
            fail_next: None,
            _taxonomy: PhantomData,
        }
    }

    pub fn sender(&self) -> NativeEventSender {
        NativeEventSender {
            inbox: Arc::clone(&self.inbox),
            dispatcher: self.dispatcher.clone(),
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&HeadlessWindow> {
        self.windows.get(&id)
    }

    /// Every command executed so far, oldest first.
    pub fn executed(&self) -> &[(WindowId, WindowCommand)] {
        &self.executed
    }

    pub fn pending_events(&self) -> usize {
        self.inbox.lock().len()
    }

    /// Make the next native call named `operation` fail without side effects.
    /// Names are `destroy_window` or a command name such as `"Show"`.
    pub fn fail_next(&mut self, operation: &'static str) {
        self.fail_next = Some(operation);
    }

    fn injected_failure(&mut self, operation: &'static str) -> Result<(), NativeError> {
        if self.fail_next == Some(operation) {
            self.fail_next = None;
            return Err(NativeError::new(operation, "injected failure"));
        }
        Ok(())
    }

    fn post(&self, event: &T::Event) {
        self.inbox.lock().push_back(T::encode(event));
        self.dispatcher.wake();
    }

    fn window_mut(
        &mut self,
        id: WindowId,
        operation: &'static str,
    ) -> Result<&mut HeadlessWindow, NativeError> {
        self.windows
            .get_mut(&id)
            .ok_or_else(|| NativeError::new(operation, format!("no native window for {id}")))
    }
}

impl<T: EventTaxonomy> PlatformBinding for HeadlessBinding<T> {
    type Taxonomy = T;

    fn start(&mut self) -> Result<(), NativeError> {
        log::info!("Headless {} binding started", T::PLATFORM);
        if let Some(event) = T::launch_event() {
            self.post(&event);
        }
        Ok(())
    }

    fn poll_event(&mut self) -> Option<OwnedRawEvent> {
        self.inbox.lock().pop_front()
    }

    fn create_window(&mut self, id: WindowId, params: &WindowParams) -> Result<(), NativeError> {
        if self.windows.contains_key(&id) {
            return Err(NativeError::new(
                "create_window",
                format!("{id} already exists"),
            ));
        }
        self.windows.insert(id, HeadlessWindow::new(params));
        log::debug!("Headless window {} created: {:?}", id, params.title);
        Ok(())
    }

    fn destroy_window(&mut self, id: WindowId) -> Result<(), NativeError> {
        self.injected_failure("destroy_window")?;
        self.windows
            .remove(&id)
            .map(|_| log::debug!("Headless window {} destroyed", id))
            .ok_or_else(|| NativeError::new("destroy_window", format!("no native window for {id}")))
    }

    fn execute(&mut self, id: WindowId, command: WindowCommand) -> Result<(), NativeError> {
        self.injected_failure(command.name())?;
        let window = self.window_mut(id, command.name())?;
        match &command {
            WindowCommand::Show => window.visible = true,
            WindowCommand::SetTitle(title) => window.title = title.clone(),
            WindowCommand::SetRect { origin, size } => {
                window.origin = *origin;
                window.size = *size;
                window.clamp_to_min_size();
            }
            WindowCommand::SetMinSize(min) => {
                window.min_size = Some(*min);
                window.clamp_to_min_size();
            }
            WindowCommand::RequestRedraw => window.redraws_requested += 1,
            WindowCommand::RequestClose => self.post(&T::close_request(id)),
            WindowCommand::StartDrag { mime_types, .. } => {
                if mime_types.is_empty() {
                    return Err(NativeError::new("StartDrag", "no MIME types offered"));
                }
            }
        }
        self.executed.push((id, command));
        Ok(())
    }

    fn window_size(&self, id: WindowId) -> Result<LogicalSize, NativeError> {
        self.windows
            .get(&id)
            .map(|window| window.size)
            .ok_or_else(|| NativeError::new("window_size", format!("no native window for {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desktop_toolkit_events::{Linux, Macos, PlatformEvent, Win32};

    fn params() -> WindowParams {
        WindowParams::default().with_size(400.0, 300.0)
    }

    #[test]
    fn test_start_posts_launch_event_when_platform_has_one() {
        let mut mac = HeadlessBinding::<Macos>::new(Dispatcher::default());
        mac.start().unwrap();
        assert_eq!(mac.pending_events(), 1);
        let raw = mac.poll_event().unwrap();
        let event = Macos::decode(raw.as_raw()).unwrap();
        assert_eq!(event.name(), "ApplicationDidFinishLaunching");

        let mut win = HeadlessBinding::<Win32>::new(Dispatcher::default());
        win.start().unwrap();
        assert!(win.poll_event().is_none());
    }

    #[test]
    fn test_request_close_posts_close_request_record() {
        let mut binding = HeadlessBinding::<Linux>::new(Dispatcher::default());
        let id = WindowId(1);
        binding.create_window(id, &params()).unwrap();
        binding.execute(id, WindowCommand::RequestClose).unwrap();

        let raw = binding.poll_event().unwrap();
        let event = Linux::decode(raw.as_raw()).unwrap();
        assert!(event.is_close_request());
        assert_eq!(event.window_id(), Some(id));
    }

    #[test]
    fn test_set_rect_respects_min_size() {
        let mut binding = HeadlessBinding::<Linux>::new(Dispatcher::default());
        let id = WindowId(1);
        binding.create_window(id, &params()).unwrap();
        binding
            .execute(id, WindowCommand::SetMinSize(LogicalSize::new(300.0, 200.0)))
            .unwrap();
        binding
            .execute(
                id,
                WindowCommand::SetRect {
                    origin: LogicalPoint::new(10.0, 20.0),
                    size: LogicalSize::new(100.0, 500.0),
                },
            )
            .unwrap();

        let window = binding.window(id).unwrap();
        assert_eq!(window.origin, LogicalPoint::new(10.0, 20.0));
        assert_eq!(binding.window_size(id).unwrap(), LogicalSize::new(300.0, 500.0));
        assert_eq!(binding.executed().len(), 2);
    }

    #[test]
    fn test_commands_on_missing_native_window_fail() {
        let mut binding = HeadlessBinding::<Macos>::new(Dispatcher::default());
        let err = binding
            .execute(WindowId(9), WindowCommand::RequestRedraw)
            .unwrap_err();
        assert_eq!(err.operation, "RequestRedraw");
        assert!(binding.destroy_window(WindowId(9)).is_err());
        assert!(binding.window_size(WindowId(9)).is_err());
    }

    #[test]
    fn test_start_drag_requires_mime_types() {
        let mut binding = HeadlessBinding::<Linux>::new(Dispatcher::default());
        let id = WindowId(1);
        binding.create_window(id, &params()).unwrap();
        let result = binding.execute(
            id,
            WindowCommand::StartDrag {
                mime_types: Vec::new(),
                action: Default::default(),
            },
        );
        assert!(result.is_err());
        assert!(binding.executed().is_empty());
    }

    #[test]
    fn test_injected_failure_fires_once() {
        let mut binding = HeadlessBinding::<Linux>::new(Dispatcher::default());
        let id = WindowId(1);
        binding.create_window(id, &params()).unwrap();

        binding.fail_next("Show");
        let err = binding.execute(id, WindowCommand::Show).unwrap_err();
        assert_eq!(err.operation, "Show");
        assert!(!binding.window(id).unwrap().visible);

        binding.execute(id, WindowCommand::Show).unwrap();
        assert!(binding.window(id).unwrap().visible);
    }

    #[test]
    fn test_sender_feeds_inbox_from_other_threads() {
        let mut binding = HeadlessBinding::<Linux>::new(Dispatcher::default());
        let sender = binding.sender();
        std::thread::spawn(move || {
            sender.send_event::<Linux>(&Linux::close_request(WindowId(4)));
        })
        .join()
        .unwrap();
        assert!(binding.poll_event().is_some());
        assert!(binding.poll_event().is_none());
    }
}
