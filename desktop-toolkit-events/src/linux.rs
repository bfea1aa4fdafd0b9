//! Linux (Wayland) event taxonomy.
//!
//! Keyboard events are not addressed to a window: the compositor delivers
//! them to whichever surface holds keyboard focus, which is announced through
//! [`Event::WindowKeyboardEnter`] and [`Event::WindowKeyboardLeave`].
//!
//! Several events answer an earlier application request; the pairing is
//! documented on the variants and is not enforced by the types.

use std::time::Duration;

use crate::common::{MouseButton, RequestId, ScreenId, WindowId};
use crate::error::DecodeError;
use crate::geometry::{LogicalPoint, LogicalSize, PhysicalSize};
use crate::raw::{OwnedRawEvent, RawEvent, RawWriter};
use crate::{EventTaxonomy, Platform, PlatformEvent};

/// Compositor timestamp in milliseconds with an undefined base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u32);

impl Timestamp {
    pub fn to_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0))
    }
}

/// XKB keycode of the physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

/// XKB keysym the key produced under the current layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySym(pub u32);

newtype_codec!(Timestamp, KeyCode, KeySym);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyModifiers {
    pub caps_lock: bool,
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub logo: bool,
    pub num_lock: bool,
}

struct_codec!(KeyModifiers {
    caps_lock,
    shift,
    control,
    alt,
    logo,
    num_lock
});

value_enum! {
    /// Origin of transferred data.
    pub enum DataSource {
        Clipboard = 0,
        DragAndDrop = 1,
        PrimarySelection = 2,
    }
}

value_enum! {
    pub enum DragAndDropAction {
        Copy = 0,
        Move = 1,
    }
}

value_enum! {
    pub enum WindowDecorationMode {
        /// The window draws client side decorations.
        Client = 0,
        /// The compositor draws the decorations.
        Server = 1,
    }
}

/// Window management features the compositor supports for a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WindowCapabilities {
    pub window_menu: bool,
    pub maximize: bool,
    pub fullscreen: bool,
    pub minimize: bool,
}

struct_codec!(WindowCapabilities {
    window_menu,
    maximize,
    fullscreen,
    minimize
});

/// Payload of a paste or drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTransferContent {
    pub data: Vec<u8>,
    pub mime_types: Vec<String>,
}

struct_codec!(DataTransferContent { data, mime_types });

/// One axis of a scroll gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollData {
    pub delta: f64,
    /// High-resolution wheel steps, 120 per detent.
    pub wheel_value120: i32,
    pub is_inverted: bool,
    /// The gesture ended on this axis (kinetic scrolling may follow).
    pub is_stop: bool,
}

struct_codec!(ScrollData {
    delta,
    wheel_value120,
    is_inverted,
    is_stop
});

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenInfo {
    pub screen_id: ScreenId,
    pub name: Option<String>,
    pub origin: LogicalPoint,
    pub size: LogicalSize,
    pub scale: f64,
    pub millihertz: u32,
}

struct_codec!(ScreenInfo {
    screen_id,
    name,
    origin,
    size,
    scale,
    millihertz
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInputPreeditStringData {
    pub text: Option<String>,
    pub cursor_begin_byte_pos: i32,
    pub cursor_end_byte_pos: i32,
}

struct_codec!(TextInputPreeditStringData {
    text,
    cursor_begin_byte_pos,
    cursor_end_byte_pos
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInputCommitStringData {
    pub text: Option<String>,
}

struct_codec!(TextInputCommitStringData { text });

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextInputDeleteSurroundingTextData {
    pub before_length_in_bytes: u32,
    pub after_length_in_bytes: u32,
}

struct_codec!(TextInputDeleteSurroundingTextData {
    before_length_in_bytes,
    after_length_in_bytes
});

event_tags! {
    /// Native tags of Linux event records.
    pub enum EventTag for crate::Platform::Linux {
        ApplicationStarted = 0,
        ApplicationWantsToTerminate = 1,
        ApplicationWillTerminate = 2,
        DataTransferAvailable = 3,
        DataTransfer = 4,
        DataTransferCancelled = 5,
        DisplayConfigurationChange = 6,
        DragAndDropLeave = 7,
        DropPerformed = 8,
        DragAndDropFinished = 9,
        FileChooserResponse = 10,
        KeyDown = 11,
        KeyUp = 12,
        ModifiersChanged = 13,
        MouseMoved = 14,
        MouseEntered = 15,
        MouseExited = 16,
        MouseUp = 17,
        MouseDown = 18,
        ScrollWheel = 19,
        TextInputAvailability = 20,
        TextInput = 21,
        WindowCloseRequest = 22,
        WindowConfigure = 23,
        WindowKeyboardEnter = 24,
        WindowKeyboardLeave = 25,
        WindowDraw = 26,
        WindowScaleChanged = 27,
        WindowScreenChange = 28,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ApplicationStarted,
    /// The user asked to quit; the application decides whether to terminate.
    ApplicationWantsToTerminate,
    ApplicationWillTerminate,
    /// New data can be requested from `data_source` in one of `mime_types`.
    DataTransferAvailable {
        data_source: DataSource,
        mime_types: Vec<String>,
    },
    /// Answer to a paste request made with `serial`. `content` is `None` when
    /// none of the requested MIME types was available.
    DataTransfer {
        serial: i32,
        content: Option<DataTransferContent>,
    },
    /// The data previously offered by the application is no longer owned by
    /// it.
    DataTransferCancelled { data_source: DataSource },
    DisplayConfigurationChange { screens: Vec<ScreenInfo> },
    /// Drag left the window without a drop. One of the three terminal
    /// drag-and-drop outcomes, with [`Event::DropPerformed`] and
    /// [`Event::DragAndDropFinished`].
    DragAndDropLeave { window_id: WindowId },
    DropPerformed {
        window_id: WindowId,
        content: Option<DataTransferContent>,
        action: Option<DragAndDropAction>,
    },
    /// A drag started by this application ended.
    DragAndDropFinished {
        window_id: WindowId,
        action: Option<DragAndDropAction>,
    },
    /// Answer to a file chooser request. `files` is empty when cancelled.
    FileChooserResponse {
        request_id: RequestId,
        files: Vec<String>,
    },
    KeyDown {
        key_code: KeyCode,
        characters: Option<String>,
        key: KeySym,
        is_repeat: bool,
    },
    KeyUp {
        key_code: KeyCode,
        key: KeySym,
    },
    ModifiersChanged { modifiers: KeyModifiers },
    MouseMoved {
        window_id: WindowId,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
    },
    MouseEntered {
        window_id: WindowId,
        location_in_window: LogicalPoint,
    },
    MouseExited {
        window_id: WindowId,
        location_in_window: LogicalPoint,
    },
    MouseUp {
        window_id: WindowId,
        button: MouseButton,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
    },
    MouseDown {
        window_id: WindowId,
        button: MouseButton,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
    },
    ScrollWheel {
        window_id: WindowId,
        scrolling_delta_x: f64,
        scrolling_delta_y: f64,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
        horizontal_scroll: ScrollData,
        vertical_scroll: ScrollData,
    },
    /// Whether text input (IME) can be enabled for the window. Once enabled,
    /// composition arrives as [`Event::TextInput`].
    TextInputAvailability { window_id: WindowId, available: bool },
    /// Apply in order: replace the preedit string, delete the surrounding
    /// text, insert the commit string, then place the new preedit string at
    /// the cursor.
    TextInput {
        preedit_string_data: Option<TextInputPreeditStringData>,
        commit_string_data: Option<TextInputCommitStringData>,
        delete_surrounding_text_data: Option<TextInputDeleteSurroundingTextData>,
    },
    WindowCloseRequest { window_id: WindowId },
    WindowConfigure {
        window_id: WindowId,
        size: LogicalSize,
        active: bool,
        maximized: bool,
        fullscreen: bool,
        decoration_mode: WindowDecorationMode,
        capabilities: WindowCapabilities,
    },
    /// The window gained keyboard focus with the listed keys already held.
    WindowKeyboardEnter {
        window_id: WindowId,
        key_codes: Vec<KeyCode>,
        key_syms: Vec<KeySym>,
    },
    WindowKeyboardLeave { window_id: WindowId },
    WindowDraw {
        window_id: WindowId,
        size: PhysicalSize,
        scale: f64,
    },
    WindowScaleChanged { window_id: WindowId, new_scale: f64 },
    WindowScreenChange {
        window_id: WindowId,
        new_screen_id: ScreenId,
    },
}

impl Event {
    pub fn tag(&self) -> EventTag {
        match self {
            Event::ApplicationStarted => EventTag::ApplicationStarted,
            Event::ApplicationWantsToTerminate => EventTag::ApplicationWantsToTerminate,
            Event::ApplicationWillTerminate => EventTag::ApplicationWillTerminate,
            Event::DataTransferAvailable { .. } => EventTag::DataTransferAvailable,
            Event::DataTransfer { .. } => EventTag::DataTransfer,
            Event::DataTransferCancelled { .. } => EventTag::DataTransferCancelled,
            Event::DisplayConfigurationChange { .. } => EventTag::DisplayConfigurationChange,
            Event::DragAndDropLeave { .. } => EventTag::DragAndDropLeave,
            Event::DropPerformed { .. } => EventTag::DropPerformed,
            Event::DragAndDropFinished { .. } => EventTag::DragAndDropFinished,
            Event::FileChooserResponse { .. } => EventTag::FileChooserResponse,
            Event::KeyDown { .. } => EventTag::KeyDown,
            Event::KeyUp { .. } => EventTag::KeyUp,
            Event::ModifiersChanged { .. } => EventTag::ModifiersChanged,
            Event::MouseMoved { .. } => EventTag::MouseMoved,
            Event::MouseEntered { .. } => EventTag::MouseEntered,
            Event::MouseExited { .. } => EventTag::MouseExited,
            Event::MouseUp { .. } => EventTag::MouseUp,
            Event::MouseDown { .. } => EventTag::MouseDown,
            Event::ScrollWheel { .. } => EventTag::ScrollWheel,
            Event::TextInputAvailability { .. } => EventTag::TextInputAvailability,
            Event::TextInput { .. } => EventTag::TextInput,
            Event::WindowCloseRequest { .. } => EventTag::WindowCloseRequest,
            Event::WindowConfigure { .. } => EventTag::WindowConfigure,
            Event::WindowKeyboardEnter { .. } => EventTag::WindowKeyboardEnter,
            Event::WindowKeyboardLeave { .. } => EventTag::WindowKeyboardLeave,
            Event::WindowDraw { .. } => EventTag::WindowDraw,
            Event::WindowScaleChanged { .. } => EventTag::WindowScaleChanged,
            Event::WindowScreenChange { .. } => EventTag::WindowScreenChange,
        }
    }
}

impl PlatformEvent for Event {
    fn window_id(&self) -> Option<WindowId> {
        match self {
            Event::DragAndDropLeave { window_id }
            | Event::DropPerformed { window_id, .. }
            | Event::DragAndDropFinished { window_id, .. }
            | Event::MouseMoved { window_id, .. }
            | Event::MouseEntered { window_id, .. }
            | Event::MouseExited { window_id, .. }
            | Event::MouseUp { window_id, .. }
            | Event::MouseDown { window_id, .. }
            | Event::ScrollWheel { window_id, .. }
            | Event::TextInputAvailability { window_id, .. }
            | Event::WindowCloseRequest { window_id }
            | Event::WindowConfigure { window_id, .. }
            | Event::WindowKeyboardEnter { window_id, .. }
            | Event::WindowKeyboardLeave { window_id }
            | Event::WindowDraw { window_id, .. }
            | Event::WindowScaleChanged { window_id, .. }
            | Event::WindowScreenChange { window_id, .. } => Some(*window_id),
            Event::ApplicationStarted
            | Event::ApplicationWantsToTerminate
            | Event::ApplicationWillTerminate
            | Event::DataTransferAvailable { .. }
            | Event::DataTransfer { .. }
            | Event::DataTransferCancelled { .. }
            | Event::DisplayConfigurationChange { .. }
            | Event::FileChooserResponse { .. }
            | Event::KeyDown { .. }
            | Event::KeyUp { .. }
            | Event::ModifiersChanged { .. }
            | Event::TextInput { .. } => None,
        }
    }

    fn name(&self) -> &'static str {
        self.tag().name()
    }

    fn is_close_request(&self) -> bool {
        matches!(self, Event::WindowCloseRequest { .. })
    }
}

/// Decode a Linux native event record.
pub fn decode(raw: RawEvent<'_>) -> Result<Event, DecodeError> {
    let tag = EventTag::try_from(raw.tag())?;
    let mut r = raw.reader();
    let event = match tag {
        EventTag::ApplicationStarted => Event::ApplicationStarted,
        EventTag::ApplicationWantsToTerminate => Event::ApplicationWantsToTerminate,
        EventTag::ApplicationWillTerminate => Event::ApplicationWillTerminate,
        EventTag::DataTransferAvailable => Event::DataTransferAvailable {
            data_source: r.read()?,
            mime_types: r.read()?,
        },
        EventTag::DataTransfer => Event::DataTransfer {
            serial: r.read()?,
            content: r.read()?,
        },
        EventTag::DataTransferCancelled => Event::DataTransferCancelled {
            data_source: r.read()?,
        },
        EventTag::DisplayConfigurationChange => Event::DisplayConfigurationChange {
            screens: r.read()?,
        },
        EventTag::DragAndDropLeave => Event::DragAndDropLeave {
            window_id: r.read()?,
        },
        EventTag::DropPerformed => Event::DropPerformed {
            window_id: r.read()?,
            content: r.read()?,
            action: r.read()?,
        },
        EventTag::DragAndDropFinished => Event::DragAndDropFinished {
            window_id: r.read()?,
            action: r.read()?,
        },
        EventTag::FileChooserResponse => Event::FileChooserResponse {
            request_id: r.read()?,
            files: r.read()?,
        },
        EventTag::KeyDown => Event::KeyDown {
            key_code: r.read()?,
            characters: r.read()?,
            key: r.read()?,
            is_repeat: r.read()?,
        },
        EventTag::KeyUp => Event::KeyUp {
            key_code: r.read()?,
            key: r.read()?,
        },
        EventTag::ModifiersChanged => Event::ModifiersChanged {
            modifiers: r.read()?,
        },
        EventTag::MouseMoved => Event::MouseMoved {
            window_id: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::MouseEntered => Event::MouseEntered {
            window_id: r.read()?,
            location_in_window: r.read()?,
        },
        EventTag::MouseExited => Event::MouseExited {
            window_id: r.read()?,
            location_in_window: r.read()?,
        },
        EventTag::MouseUp => Event::MouseUp {
            window_id: r.read()?,
            button: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::MouseDown => Event::MouseDown {
            window_id: r.read()?,
            button: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::ScrollWheel => Event::ScrollWheel {
            window_id: r.read()?,
            scrolling_delta_x: r.read()?,
            scrolling_delta_y: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
            horizontal_scroll: r.read()?,
            vertical_scroll: r.read()?,
        },
        EventTag::TextInputAvailability => Event::TextInputAvailability {
            window_id: r.read()?,
            available: r.read()?,
        },
        EventTag::TextInput => Event::TextInput {
            preedit_string_data: r.read()?,
            commit_string_data: r.read()?,
            delete_surrounding_text_data: r.read()?,
        },
        EventTag::WindowCloseRequest => Event::WindowCloseRequest {
            window_id: r.read()?,
        },
        EventTag::WindowConfigure => Event::WindowConfigure {
            window_id: r.read()?,
            size: r.read()?,
            active: r.read()?,
            maximized: r.read()?,
            fullscreen: r.read()?,
            decoration_mode: r.read()?,
            capabilities: r.read()?,
        },
        EventTag::WindowKeyboardEnter => Event::WindowKeyboardEnter {
            window_id: r.read()?,
            key_codes: r.read()?,
            key_syms: r.read()?,
        },
        EventTag::WindowKeyboardLeave => Event::WindowKeyboardLeave {
            window_id: r.read()?,
        },
        EventTag::WindowDraw => Event::WindowDraw {
            window_id: r.read()?,
            size: r.read()?,
            scale: r.read()?,
        },
        EventTag::WindowScaleChanged => Event::WindowScaleChanged {
            window_id: r.read()?,
            new_scale: r.read()?,
        },
        EventTag::WindowScreenChange => Event::WindowScreenChange {
            window_id: r.read()?,
            new_screen_id: r.read()?,
        },
    };
    r.finish()?;
    Ok(event)
}

/// Write the native record for a Linux event.
pub fn encode(event: &Event) -> OwnedRawEvent {
    let mut w = RawWriter::new();
    match event {
        Event::ApplicationStarted
        | Event::ApplicationWantsToTerminate
        | Event::ApplicationWillTerminate => {}
        Event::DataTransferAvailable {
            data_source,
            mime_types,
        } => {
            w.put(data_source).put(mime_types);
        }
        Event::DataTransfer { serial, content } => {
            w.put(serial).put(content);
        }
        Event::DataTransferCancelled { data_source } => {
            w.put(data_source);
        }
        Event::DisplayConfigurationChange { screens } => {
            w.put(screens);
        }
        Event::DragAndDropLeave { window_id }
        | Event::WindowCloseRequest { window_id }
        | Event::WindowKeyboardLeave { window_id } => {
            w.put(window_id);
        }
        Event::DropPerformed {
            window_id,
            content,
            action,
        } => {
            w.put(window_id).put(content).put(action);
        }
        Event::DragAndDropFinished { window_id, action } => {
            w.put(window_id).put(action);
        }
        Event::FileChooserResponse { request_id, files } => {
            w.put(request_id).put(files);
        }
        Event::KeyDown {
            key_code,
            characters,
            key,
            is_repeat,
        } => {
            w.put(key_code).put(characters).put(key).put(is_repeat);
        }
        Event::KeyUp { key_code, key } => {
            w.put(key_code).put(key);
        }
        Event::ModifiersChanged { modifiers } => {
            w.put(modifiers);
        }
        Event::MouseMoved {
            window_id,
            location_in_window,
            timestamp,
        } => {
            w.put(window_id).put(location_in_window).put(timestamp);
        }
        Event::MouseEntered {
            window_id,
            location_in_window,
        }
        | Event::MouseExited {
            window_id,
            location_in_window,
        } => {
            w.put(window_id).put(location_in_window);
        }
        Event::MouseUp {
            window_id,
            button,
            location_in_window,
            timestamp,
        }
        | Event::MouseDown {
            window_id,
            button,
            location_in_window,
            timestamp,
        } => {
            w.put(window_id)
                .put(button)
                .put(location_in_window)
                .put(timestamp);
        }
        Event::ScrollWheel {
            window_id,
            scrolling_delta_x,
            scrolling_delta_y,
            location_in_window,
            timestamp,
            horizontal_scroll,
            vertical_scroll,
        } => {
            w.put(window_id)
                .put(scrolling_delta_x)
                .put(scrolling_delta_y)
                .put(location_in_window)
                .put(timestamp)
                .put(horizontal_scroll)
                .put(vertical_scroll);
        }
        Event::TextInputAvailability {
            window_id,
            available,
        } => {
            w.put(window_id).put(available);
        }
        Event::TextInput {
            preedit_string_data,
            commit_string_data,
            delete_surrounding_text_data,
        } => {
            w.put(preedit_string_data)
                .put(commit_string_data)
                .put(delete_surrounding_text_data);
        }
        Event::WindowConfigure {
            window_id,
            size,
            active,
            maximized,
            fullscreen,
            decoration_mode,
            capabilities,
        } => {
            w.put(window_id)
                .put(size)
                .put(active)
                .put(maximized)
                .put(fullscreen)
                .put(decoration_mode)
                .put(capabilities);
        }
        Event::WindowKeyboardEnter {
            window_id,
            key_codes,
            key_syms,
        } => {
            w.put(window_id).put(key_codes).put(key_syms);
        }
        Event::WindowDraw {
            window_id,
            size,
            scale,
        } => {
            w.put(window_id).put(size).put(scale);
        }
        Event::WindowScaleChanged {
            window_id,
            new_scale,
        } => {
            w.put(window_id).put(new_scale);
        }
        Event::WindowScreenChange {
            window_id,
            new_screen_id,
        } => {
            w.put(window_id).put(new_screen_id);
        }
    }
    w.into_event(event.tag().into())
}

/// Marker type selecting the Linux taxonomy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Linux;

impl EventTaxonomy for Linux {
    type Event = Event;

    const PLATFORM: Platform = Platform::Linux;

    fn decode(raw: RawEvent<'_>) -> Result<Event, DecodeError> {
        let tag = raw.tag();
        decode(raw).inspect_err(|err| {
            log::debug!("Rejected Linux event record with tag {}: {}", tag, err)
        })
    }

    fn encode(event: &Event) -> OwnedRawEvent {
        encode(event)
    }

    fn close_request(window_id: WindowId) -> Event {
        Event::WindowCloseRequest { window_id }
    }

    fn launch_event() -> Option<Event> {
        Some(Event::ApplicationStarted)
    }
}
