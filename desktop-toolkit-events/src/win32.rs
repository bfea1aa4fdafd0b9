//! Win32 event taxonomy.
//!
//! Win32 delivers events per window procedure, so every record starts with
//! the target [`WindowId`] and decodes into a [`WindowEvent`] wrapping the
//! window-less [`Event`].

use std::time::Duration;

use crate::common::WindowId;
use crate::error::DecodeError;
use crate::geometry::{LogicalPoint, PhysicalPoint, PhysicalSize};
use crate::raw::{OwnedRawEvent, RawCodec, RawEvent, RawReader, RawWriter};
use crate::{EventTaxonomy, Platform, PlatformEvent};

/// Milliseconds since an arbitrary fixed moment (`GetMessageTime`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn to_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

/// `VK_*` virtual key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualKey(pub u16);

/// Set of pressed pointer buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PointerButtons(pub u32);

impl PointerButtons {
    pub const NONE: PointerButtons = PointerButtons(0);
    pub const LEFT: PointerButtons = PointerButtons(1);
    pub const RIGHT: PointerButtons = PointerButtons(2);
    pub const MIDDLE: PointerButtons = PointerButtons(4);
    pub const XBUTTON1: PointerButtons = PointerButtons(8);
    pub const XBUTTON2: PointerButtons = PointerButtons(16);

    pub fn has_flag(self, button: PointerButtons) -> bool {
        self.0 & button.0 == button.0
    }
}

/// `MK_*` key state accompanying pointer messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PointerModifiers(pub u32);

impl PointerModifiers {
    pub const SHIFT: u32 = 0x0004;
    pub const CONTROL: u32 = 0x0008;

    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }
}

newtype_codec!(Timestamp, VirtualKey, PointerButtons, PointerModifiers);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PointerState {
    pub pressed_buttons: PointerButtons,
    pub modifiers: PointerModifiers,
}

struct_codec!(PointerState {
    pressed_buttons,
    modifiers
});

/// Keystroke flags from the message's `lParam`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PhysicalKeyStatus {
    pub repeat_count: u16,
    pub scan_code: u16,
    pub is_extended_key: bool,
    pub is_menu_key_down: bool,
    pub was_key_down: bool,
    pub is_key_released: bool,
}

struct_codec!(PhysicalKeyStatus {
    repeat_count,
    scan_code,
    is_extended_key,
    is_menu_key_down,
    was_key_down,
    is_key_released
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowResizeKind {
    Restored,
    Maximized,
    Minimized,
    /// A `SIZE_*` value without a dedicated variant.
    Other(u32),
}

impl RawCodec for WindowResizeKind {
    fn read(reader: &mut RawReader<'_>) -> Result<Self, DecodeError> {
        match reader.read::<u32>()? {
            0 => Ok(WindowResizeKind::Restored),
            1 => Ok(WindowResizeKind::Maximized),
            2 => Ok(WindowResizeKind::Minimized),
            3 => Ok(WindowResizeKind::Other(reader.read()?)),
            other => Err(DecodeError::InvalidValue {
                field: "WindowResizeKind",
                value: u64::from(other),
            }),
        }
    }

    fn write(&self, writer: &mut RawWriter) {
        match self {
            WindowResizeKind::Restored => writer.put(&0u32),
            WindowResizeKind::Maximized => writer.put(&1u32),
            WindowResizeKind::Minimized => writer.put(&2u32),
            WindowResizeKind::Other(kind) => writer.put(&3u32).put(kind),
        };
    }
}

event_tags! {
    /// Native tags of Win32 event records.
    pub enum EventTag for crate::Platform::Win32 {
        CharacterReceived = 0,
        KeyDown = 1,
        KeyUp = 2,
        NCCalcSize = 3,
        NCHitTest = 4,
        PointerDown = 5,
        PointerEntered = 6,
        PointerExited = 7,
        PointerUpdated = 8,
        PointerUp = 9,
        ScrollWheelX = 10,
        ScrollWheelY = 11,
        WindowCloseRequest = 12,
        WindowDraw = 13,
        WindowKeyboardEnter = 14,
        WindowKeyboardLeave = 15,
        WindowMove = 16,
        WindowResize = 17,
        WindowScaleChanged = 18,
        WindowTitleChanged = 19,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Text produced by a keystroke (`WM_CHAR` and friends).
    CharacterReceived {
        key_code: char,
        characters: String,
        key_status: PhysicalKeyStatus,
        is_dead_char: bool,
        is_system_key: bool,
    },
    KeyDown {
        key_code: VirtualKey,
        key_status: PhysicalKeyStatus,
        is_system_key: bool,
        timestamp: Timestamp,
    },
    KeyUp {
        key_code: VirtualKey,
        key_status: PhysicalKeyStatus,
        is_system_key: bool,
        timestamp: Timestamp,
    },
    /// Non-client area size calculation (`WM_NCCALCSIZE`).
    NCCalcSize {
        origin: PhysicalPoint,
        size: PhysicalSize,
        scale: f32,
    },
    /// Non-client hit testing (`WM_NCHITTEST`), in screen coordinates.
    NCHitTest { mouse_x: i32, mouse_y: i32 },
    PointerDown {
        button: PointerButtons,
        location_in_window: LogicalPoint,
        state: PointerState,
        timestamp: Timestamp,
    },
    PointerEntered {
        location_in_window: LogicalPoint,
        state: PointerState,
        timestamp: Timestamp,
    },
    PointerExited { timestamp: Timestamp },
    PointerUpdated {
        location_in_window: LogicalPoint,
        state: PointerState,
        timestamp: Timestamp,
    },
    PointerUp {
        button: PointerButtons,
        location_in_window: LogicalPoint,
        state: PointerState,
        timestamp: Timestamp,
    },
    ScrollWheelX {
        scrolling_delta: i32,
        location_in_window: LogicalPoint,
        state: PointerState,
        timestamp: Timestamp,
    },
    ScrollWheelY {
        scrolling_delta: i32,
        location_in_window: LogicalPoint,
        state: PointerState,
        timestamp: Timestamp,
    },
    WindowCloseRequest,
    WindowDraw { size: PhysicalSize, scale: f32 },
    WindowKeyboardEnter,
    WindowKeyboardLeave,
    WindowMove { origin: PhysicalPoint, scale: f32 },
    WindowResize {
        size: PhysicalSize,
        scale: f32,
        kind: WindowResizeKind,
    },
    WindowScaleChanged {
        origin: PhysicalPoint,
        size: PhysicalSize,
        scale: f32,
    },
    WindowTitleChanged { title: String },
}

impl Event {
    pub fn tag(&self) -> EventTag {
        match self {
            Event::CharacterReceived { .. } => EventTag::CharacterReceived,
            Event::KeyDown { .. } => EventTag::KeyDown,
            Event::KeyUp { .. } => EventTag::KeyUp,
            Event::NCCalcSize { .. } => EventTag::NCCalcSize,
            Event::NCHitTest { .. } => EventTag::NCHitTest,
            Event::PointerDown { .. } => EventTag::PointerDown,
            Event::PointerEntered { .. } => EventTag::PointerEntered,
            Event::PointerExited { .. } => EventTag::PointerExited,
            Event::PointerUpdated { .. } => EventTag::PointerUpdated,
            Event::PointerUp { .. } => EventTag::PointerUp,
            Event::ScrollWheelX { .. } => EventTag::ScrollWheelX,
            Event::ScrollWheelY { .. } => EventTag::ScrollWheelY,
            Event::WindowCloseRequest => EventTag::WindowCloseRequest,
            Event::WindowDraw { .. } => EventTag::WindowDraw,
            Event::WindowKeyboardEnter => EventTag::WindowKeyboardEnter,
            Event::WindowKeyboardLeave => EventTag::WindowKeyboardLeave,
            Event::WindowMove { .. } => EventTag::WindowMove,
            Event::WindowResize { .. } => EventTag::WindowResize,
            Event::WindowScaleChanged { .. } => EventTag::WindowScaleChanged,
            Event::WindowTitleChanged { .. } => EventTag::WindowTitleChanged,
        }
    }
}

/// A Win32 event together with the window whose procedure received it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEvent {
    pub window_id: WindowId,
    pub event: Event,
}

impl PlatformEvent for WindowEvent {
    fn window_id(&self) -> Option<WindowId> {
        Some(self.window_id)
    }

    fn name(&self) -> &'static str {
        self.event.tag().name()
    }

    fn is_close_request(&self) -> bool {
        matches!(self.event, Event::WindowCloseRequest)
    }
}

/// Decode a Win32 native event record.
pub fn decode(raw: RawEvent<'_>) -> Result<WindowEvent, DecodeError> {
    let tag = EventTag::try_from(raw.tag())?;
    let mut r = raw.reader();
    let window_id = r.read()?;
    let event = match tag {
        EventTag::CharacterReceived => Event::CharacterReceived {
            key_code: r.read()?,
            characters: r.read()?,
            key_status: r.read()?,
            is_dead_char: r.read()?,
            is_system_key: r.read()?,
        },
        EventTag::KeyDown => Event::KeyDown {
            key_code: r.read()?,
            key_status: r.read()?,
            is_system_key: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::KeyUp => Event::KeyUp {
            key_code: r.read()?,
            key_status: r.read()?,
            is_system_key: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::NCCalcSize => Event::NCCalcSize {
            origin: r.read()?,
            size: r.read()?,
            scale: r.read()?,
        },
        EventTag::NCHitTest => Event::NCHitTest {
            mouse_x: r.read()?,
            mouse_y: r.read()?,
        },
        EventTag::PointerDown => Event::PointerDown {
            button: r.read()?,
            location_in_window: r.read()?,
            state: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::PointerEntered => Event::PointerEntered {
            location_in_window: r.read()?,
            state: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::PointerExited => Event::PointerExited {
            timestamp: r.read()?,
        },
        EventTag::PointerUpdated => Event::PointerUpdated {
            location_in_window: r.read()?,
            state: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::PointerUp => Event::PointerUp {
            button: r.read()?,
            location_in_window: r.read()?,
            state: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::ScrollWheelX => Event::ScrollWheelX {
            scrolling_delta: r.read()?,
            location_in_window: r.read()?,
            state: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::ScrollWheelY => Event::ScrollWheelY {
            scrolling_delta: r.read()?,
            location_in_window: r.read()?,
            state: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::WindowCloseRequest => Event::WindowCloseRequest,
        EventTag::WindowDraw => Event::WindowDraw {
            size: r.read()?,
            scale: r.read()?,
        },
        EventTag::WindowKeyboardEnter => Event::WindowKeyboardEnter,
        EventTag::WindowKeyboardLeave => Event::WindowKeyboardLeave,
        EventTag::WindowMove => Event::WindowMove {
            origin: r.read()?,
            scale: r.read()?,
        },
        EventTag::WindowResize => Event::WindowResize {
            size: r.read()?,
            scale: r.read()?,
            kind: r.read()?,
        },
        EventTag::WindowScaleChanged => Event::WindowScaleChanged {
            origin: r.read()?,
            size: r.read()?,
            scale: r.read()?,
        },
        EventTag::WindowTitleChanged => Event::WindowTitleChanged { title: r.read()? },
    };
    r.finish()?;
    Ok(WindowEvent { window_id, event })
}

/// Write the native record for a Win32 event.
pub fn encode(window_event: &WindowEvent) -> OwnedRawEvent {
    let mut w = RawWriter::new();
    w.put(&window_event.window_id);
    let event = &window_event.event;
    match event {
        Event::CharacterReceived {
            key_code,
            characters,
            key_status,
            is_dead_char,
            is_system_key,
        } => {
            w.put(key_code)
                .put(characters)
                .put(key_status)
                .put(is_dead_char)
                .put(is_system_key);
        }
        Event::KeyDown {
            key_code,
            key_status,
            is_system_key,
            timestamp,
        }
        | Event::KeyUp {
            key_code,
            key_status,
            is_system_key,
            timestamp,
        } => {
            w.put(key_code)
                .put(key_status)
                .put(is_system_key)
                .put(timestamp);
        }
        Event::NCCalcSize {
            origin,
            size,
            scale,
        }
        | Event::WindowScaleChanged {
            origin,
            size,
            scale,
        } => {
            w.put(origin).put(size).put(scale);
        }
        Event::NCHitTest { mouse_x, mouse_y } => {
            w.put(mouse_x).put(mouse_y);
        }
        Event::PointerDown {
            button,
            location_in_window,
            state,
            timestamp,
        }
        | Event::PointerUp {
            button,
            location_in_window,
            state,
            timestamp,
        } => {
            w.put(button)
                .put(location_in_window)
                .put(state)
                .put(timestamp);
        }
        Event::PointerEntered {
            location_in_window,
            state,
            timestamp,
        }
        | Event::PointerUpdated {
            location_in_window,
            state,
            timestamp,
        } => {
            w.put(location_in_window).put(state).put(timestamp);
        }
        Event::PointerExited { timestamp } => {
            w.put(timestamp);
        }
        Event::ScrollWheelX {
            scrolling_delta,
            location_in_window,
            state,
            timestamp,
        }
        | Event::ScrollWheelY {
            scrolling_delta,
            location_in_window,
            state,
            timestamp,
        } => {
            w.put(scrolling_delta)
                .put(location_in_window)
                .put(state)
                .put(timestamp);
        }
        Event::WindowCloseRequest | Event::WindowKeyboardEnter | Event::WindowKeyboardLeave => {}
        Event::WindowDraw { size, scale } => {
            w.put(size).put(scale);
        }
        Event::WindowMove { origin, scale } => {
            w.put(origin).put(scale);
        }
        Event::WindowResize { size, scale, kind } => {
            w.put(size).put(scale).put(kind);
        }
        Event::WindowTitleChanged { title } => {
            w.put(title);
        }
    }
    w.into_event(event.tag().into())
}

/// Marker type selecting the Win32 taxonomy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Win32;

impl EventTaxonomy for Win32 {
    type Event = WindowEvent;

    const PLATFORM: Platform = Platform::Win32;

    fn decode(raw: RawEvent<'_>) -> Result<WindowEvent, DecodeError> {
        let tag = raw.tag();
        decode(raw).inspect_err(|err| {
            log::debug!("Rejected Win32 event record with tag {}: {}", tag, err)
        })
    }

    fn encode(event: &WindowEvent) -> OwnedRawEvent {
        encode(event)
    }

    fn close_request(window_id: WindowId) -> WindowEvent {
        WindowEvent {
            window_id,
            event: Event::WindowCloseRequest,
        }
    }

    fn launch_event() -> Option<WindowEvent> {
        None
    }
}
