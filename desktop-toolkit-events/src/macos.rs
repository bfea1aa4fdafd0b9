//! macOS (AppKit) event taxonomy.
//!
//! Coordinates are logical points relative to the window's content view,
//! origin top-left. Timestamps are seconds since system startup, as AppKit
//! reports them.

use std::time::Duration;

use crate::common::{MouseButton, ScreenId, WindowId};
use crate::error::DecodeError;
use crate::geometry::{LogicalPoint, LogicalSize};
use crate::raw::{OwnedRawEvent, RawEvent, RawWriter};
use crate::{EventTaxonomy, Platform, PlatformEvent};

/// Hardware-independent virtual key code (`kVK_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u16);

/// `NSEventModifierFlags` subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyModifiers(pub u32);

impl KeyModifiers {
    pub const CAPS_LOCK: u32 = 1 << 16;
    pub const SHIFT: u32 = 1 << 17;
    pub const CONTROL: u32 = 1 << 18;
    pub const OPTION: u32 = 1 << 19;
    pub const COMMAND: u32 = 1 << 20;
    pub const NUMERIC_PAD: u32 = 1 << 21;
    pub const HELP: u32 = 1 << 22;
    pub const FUNCTION: u32 = 1 << 23;

    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }
}

/// Seconds since system startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Timestamp(pub f64);

impl Timestamp {
    /// Negative and NaN values map to zero; values past the range of
    /// `Duration` (including infinity) saturate at `Duration::MAX`.
    pub fn to_duration(self) -> Duration {
        Duration::try_from_secs_f64(self.0.max(0.0)).unwrap_or(Duration::MAX)
    }
}

newtype_codec!(KeyCode, KeyModifiers, Timestamp);

event_tags! {
    /// Native tags of macOS event records.
    pub enum EventTag for crate::Platform::Macos {
        KeyDown = 0,
        KeyUp = 1,
        ModifiersChanged = 2,
        MouseMoved = 3,
        MouseDragged = 4,
        MouseEntered = 5,
        MouseExited = 6,
        MouseDown = 7,
        MouseUp = 8,
        ScrollWheel = 9,
        WindowScreenChange = 10,
        WindowResize = 11,
        WindowMove = 12,
        WindowFocusChange = 13,
        WindowCloseRequest = 14,
        WindowFullScreenToggle = 15,
        DisplayConfigurationChange = 16,
        ApplicationDidFinishLaunching = 17,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    KeyDown {
        window_id: WindowId,
        key_code: KeyCode,
        /// Text produced by the key, after modifiers.
        characters: String,
        /// Text the key would produce without modifiers.
        key: String,
        modifiers: KeyModifiers,
        is_repeat: bool,
        timestamp: Timestamp,
    },
    KeyUp {
        window_id: WindowId,
        key_code: KeyCode,
        characters: String,
        key: String,
        modifiers: KeyModifiers,
        timestamp: Timestamp,
    },
    ModifiersChanged {
        window_id: WindowId,
        modifiers: KeyModifiers,
        key_code: KeyCode,
        timestamp: Timestamp,
    },
    MouseMoved {
        window_id: WindowId,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
    },
    MouseDragged {
        window_id: WindowId,
        button: MouseButton,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
    },
    MouseEntered {
        window_id: WindowId,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
    },
    MouseExited {
        window_id: WindowId,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
    },
    MouseDown {
        window_id: WindowId,
        button: MouseButton,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
    },
    MouseUp {
        window_id: WindowId,
        button: MouseButton,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
    },
    ScrollWheel {
        window_id: WindowId,
        scrolling_delta_x: f64,
        scrolling_delta_y: f64,
        /// Trackpad-style pixel deltas rather than line steps.
        has_precise_scrolling_deltas: bool,
        location_in_window: LogicalPoint,
        timestamp: Timestamp,
    },
    WindowScreenChange {
        window_id: WindowId,
        new_screen_id: ScreenId,
    },
    WindowResize {
        window_id: WindowId,
        size: LogicalSize,
    },
    WindowMove {
        window_id: WindowId,
        origin: LogicalPoint,
    },
    WindowFocusChange {
        window_id: WindowId,
        is_key_window: bool,
        is_main_window: bool,
    },
    WindowCloseRequest {
        window_id: WindowId,
    },
    WindowFullScreenToggle {
        window_id: WindowId,
        is_full_screen: bool,
    },
    DisplayConfigurationChange,
    ApplicationDidFinishLaunching,
}

impl Event {
    pub fn tag(&self) -> EventTag {
        match self {
            Event::KeyDown { .. } => EventTag::KeyDown,
            Event::KeyUp { .. } => EventTag::KeyUp,
            Event::ModifiersChanged { .. } => EventTag::ModifiersChanged,
            Event::MouseMoved { .. } => EventTag::MouseMoved,
            Event::MouseDragged { .. } => EventTag::MouseDragged,
            Event::MouseEntered { .. } => EventTag::MouseEntered,
            Event::MouseExited { .. } => EventTag::MouseExited,
            Event::MouseDown { .. } => EventTag::MouseDown,
            Event::MouseUp { .. } => EventTag::MouseUp,
            Event::ScrollWheel { .. } => EventTag::ScrollWheel,
            Event::WindowScreenChange { .. } => EventTag::WindowScreenChange,
            Event::WindowResize { .. } => EventTag::WindowResize,
            Event::WindowMove { .. } => EventTag::WindowMove,
            Event::WindowFocusChange { .. } => EventTag::WindowFocusChange,
            Event::WindowCloseRequest { .. } => EventTag::WindowCloseRequest,
            Event::WindowFullScreenToggle { .. } => EventTag::WindowFullScreenToggle,
            Event::DisplayConfigurationChange => EventTag::DisplayConfigurationChange,
            Event::ApplicationDidFinishLaunching => EventTag::ApplicationDidFinishLaunching,
        }
    }
}

impl PlatformEvent for Event {
    fn window_id(&self) -> Option<WindowId> {
        match self {
            Event::KeyDown { window_id, .. }
            | Event::KeyUp { window_id, .. }
            | Event::ModifiersChanged { window_id, .. }
            | Event::MouseMoved { window_id, .. }
            | Event::MouseDragged { window_id, .. }
            | Event::MouseEntered { window_id, .. }
            | Event::MouseExited { window_id, .. }
            | Event::MouseDown { window_id, .. }
            | Event::MouseUp { window_id, .. }
            | Event::ScrollWheel { window_id, .. }
            | Event::WindowScreenChange { window_id, .. }
            | Event::WindowResize { window_id, .. }
            | Event::WindowMove { window_id, .. }
            | Event::WindowFocusChange { window_id, .. }
            | Event::WindowCloseRequest { window_id }
            | Event::WindowFullScreenToggle { window_id, .. } => Some(*window_id),
            Event::DisplayConfigurationChange | Event::ApplicationDidFinishLaunching => None,
        }
    }

    fn name(&self) -> &'static str {
        self.tag().name()
    }

    fn is_close_request(&self) -> bool {
        matches!(self, Event::WindowCloseRequest { .. })
    }
}

/// Decode a macOS native event record.
pub fn decode(raw: RawEvent<'_>) -> Result<Event, DecodeError> {
    let tag = EventTag::try_from(raw.tag())?;
    let mut r = raw.reader();
    let event = match tag {
        EventTag::KeyDown => Event::KeyDown {
            window_id: r.read()?,
            key_code: r.read()?,
            characters: r.read()?,
            key: r.read()?,
            modifiers: r.read()?,
            is_repeat: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::KeyUp => Event::KeyUp {
            window_id: r.read()?,
            key_code: r.read()?,
            characters: r.read()?,
            key: r.read()?,
            modifiers: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::ModifiersChanged => Event::ModifiersChanged {
            window_id: r.read()?,
            modifiers: r.read()?,
            key_code: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::MouseMoved => Event::MouseMoved {
            window_id: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::MouseDragged => Event::MouseDragged {
            window_id: r.read()?,
            button: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::MouseEntered => Event::MouseEntered {
            window_id: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::MouseExited => Event::MouseExited {
            window_id: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::MouseDown => Event::MouseDown {
            window_id: r.read()?,
            button: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::MouseUp => Event::MouseUp {
            window_id: r.read()?,
            button: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::ScrollWheel => Event::ScrollWheel {
            window_id: r.read()?,
            scrolling_delta_x: r.read()?,
            scrolling_delta_y: r.read()?,
            has_precise_scrolling_deltas: r.read()?,
            location_in_window: r.read()?,
            timestamp: r.read()?,
        },
        EventTag::WindowScreenChange => Event::WindowScreenChange {
            window_id: r.read()?,
            new_screen_id: r.read()?,
        },
        EventTag::WindowResize => Event::WindowResize {
            window_id: r.read()?,
            size: r.read()?,
        },
        EventTag::WindowMove => Event::WindowMove {
            window_id: r.read()?,
            origin: r.read()?,
        },
        EventTag::WindowFocusChange => Event::WindowFocusChange {
            window_id: r.read()?,
            is_key_window: r.read()?,
            is_main_window: r.read()?,
        },
        EventTag::WindowCloseRequest => Event::WindowCloseRequest {
            window_id: r.read()?,
        },
        EventTag::WindowFullScreenToggle => Event::WindowFullScreenToggle {
            window_id: r.read()?,
            is_full_screen: r.read()?,
        },
        EventTag::DisplayConfigurationChange => Event::DisplayConfigurationChange,
        EventTag::ApplicationDidFinishLaunching => Event::ApplicationDidFinishLaunching,
    };
    r.finish()?;
    Ok(event)
}

/// Write the native record for a macOS event.
pub fn encode(event: &Event) -> OwnedRawEvent {
    let mut w = RawWriter::new();
    match event {
        Event::KeyDown {
            window_id,
            key_code,
            characters,
            key,
            modifiers,
            is_repeat,
            timestamp,
        } => {
            w.put(window_id)
                .put(key_code)
                .put(characters)
                .put(key)
                .put(modifiers)
                .put(is_repeat)
                .put(timestamp);
        }
        Event::KeyUp {
            window_id,
            key_code,
            characters,
            key,
            modifiers,
            timestamp,
        } => {
            w.put(window_id)
                .put(key_code)
                .put(characters)
                .put(key)
                .put(modifiers)
                .put(timestamp);
        }
        Event::ModifiersChanged {
            window_id,
            modifiers,
            key_code,
            timestamp,
        } => {
            w.put(window_id)
                .put(modifiers)
                .put(key_code)
                .put(timestamp);
        }
        Event::MouseMoved {
            window_id,
            location_in_window,
            timestamp,
        }
        | Event::MouseEntered {
            window_id,
            location_in_window,
            timestamp,
        }
        | Event::MouseExited {
            window_id,
            location_in_window,
            timestamp,
        } => {
            w.put(window_id).put(location_in_window).put(timestamp);
        }
        Event::MouseDragged {
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
        }
        | Event::MouseUp {
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
            has_precise_scrolling_deltas,
            location_in_window,
            timestamp,
        } => {
            w.put(window_id)
                .put(scrolling_delta_x)
                .put(scrolling_delta_y)
                .put(has_precise_scrolling_deltas)
                .put(location_in_window)
                .put(timestamp);
        }
        Event::WindowScreenChange {
            window_id,
            new_screen_id,
        } => {
            w.put(window_id).put(new_screen_id);
        }
        Event::WindowResize { window_id, size } => {
            w.put(window_id).put(size);
        }
        Event::WindowMove { window_id, origin } => {
            w.put(window_id).put(origin);
        }
        Event::WindowFocusChange {
            window_id,
            is_key_window,
            is_main_window,
        } => {
            w.put(window_id).put(is_key_window).put(is_main_window);
        }
        Event::WindowCloseRequest { window_id } => {
            w.put(window_id);
        }
        Event::WindowFullScreenToggle {
            window_id,
            is_full_screen,
        } => {
            w.put(window_id).put(is_full_screen);
        }
        Event::DisplayConfigurationChange | Event::ApplicationDidFinishLaunching => {}
    }
    w.into_event(event.tag().into())
}

/// Marker type selecting the macOS taxonomy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Macos;

impl EventTaxonomy for Macos {
    type Event = Event;

    const PLATFORM: Platform = Platform::Macos;

    fn decode(raw: RawEvent<'_>) -> Result<Event, DecodeError> {
        let tag = raw.tag();
        decode(raw).inspect_err(|err| {
            log::debug!("Rejected macOS event record with tag {}: {}", tag, err)
        })
    }

    fn encode(event: &Event) -> OwnedRawEvent {
        encode(event)
    }

    fn close_request(window_id: WindowId) -> Event {
        Event::WindowCloseRequest { window_id }
    }

    fn launch_event() -> Option<Event> {
        Some(Event::ApplicationDidFinishLaunching)
    }
}
