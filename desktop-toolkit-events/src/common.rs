//! Value types shared by every platform taxonomy.

use std::fmt;

/// Identity of a native window.
///
/// Ids are issued by the application's window registry, start at 1 and are
/// never reused within a process, so a stale id can always be told apart from
/// a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub i64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Identity of a display, as reported by the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenId(pub u32);

/// Correlates an asynchronous native request (e.g. a file chooser) with the
/// event that answers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u32);

/// Platform mouse button number. Buttons beyond the first three are passed
/// through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseButton(pub u32);

impl MouseButton {
    pub const LEFT: MouseButton = MouseButton(0);
    pub const RIGHT: MouseButton = MouseButton(1);
    pub const MIDDLE: MouseButton = MouseButton(2);
}

newtype_codec!(WindowId, ScreenId, RequestId, MouseButton);

/// Answer an event handler gives back to the native layer.
///
/// `Stop` means the event was consumed and default native processing must not
/// run; `Continue` lets it proceed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EventHandlerResult {
    #[default]
    Continue,
    Stop,
}

impl EventHandlerResult {
    /// The boolean handed back across the native boundary.
    pub fn is_consumed(self) -> bool {
        matches!(self, EventHandlerResult::Stop)
    }

    pub fn from_consumed(consumed: bool) -> Self {
        if consumed {
            EventHandlerResult::Stop
        } else {
            EventHandlerResult::Continue
        }
    }
}

impl From<EventHandlerResult> for bool {
    fn from(result: EventHandlerResult) -> Self {
        result.is_consumed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_result_native_mapping() {
        assert!(EventHandlerResult::Stop.is_consumed());
        assert!(!EventHandlerResult::Continue.is_consumed());
        assert_eq!(
            EventHandlerResult::from_consumed(true),
            EventHandlerResult::Stop
        );
        assert_eq!(EventHandlerResult::default(), EventHandlerResult::Continue);
    }

    #[test]
    fn test_window_id_display() {
        assert_eq!(WindowId(7).to_string(), "window#7");
    }
}
