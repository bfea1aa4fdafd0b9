//! Window identity and the outbound command vocabulary.
//!
//! The [`WindowRegistry`] is the single issuer of [`WindowId`]s. Ids start at
//! 1, grow monotonically and are never reused, so any id below the next one
//! to be issued that is not open anymore is known to be closed.

use std::collections::BTreeSet;

use desktop_toolkit_config::WindowDefaults;
use desktop_toolkit_events::{LogicalPoint, LogicalSize, WindowId};

use crate::error::WindowError;

/// Parameters for a new native window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowParams {
    pub title: String,
    pub size: LogicalSize,
    pub min_size: Option<LogicalSize>,
    /// Show the window right after creation.
    pub visible: bool,
}

impl WindowParams {
    pub fn from_defaults(defaults: &WindowDefaults) -> Self {
        Self {
            title: defaults.title.clone(),
            size: LogicalSize::new(defaults.width, defaults.height),
            min_size: Some(LogicalSize::new(defaults.min_width, defaults.min_height)),
            visible: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = LogicalSize::new(width, height);
        self
    }
}

impl Default for WindowParams {
    fn default() -> Self {
        Self::from_defaults(&WindowDefaults::default())
    }
}

/// Operation requested for a drag started by the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DragAction {
    #[default]
    Copy,
    Move,
}

/// A command sent to the native layer for one window.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowCommand {
    Show,
    SetTitle(String),
    SetRect {
        origin: LogicalPoint,
        size: LogicalSize,
    },
    SetMinSize(LogicalSize),
    RequestRedraw,
    /// Ask the window to close. The native layer answers with a close-request
    /// event; the window stays open until the application closes it.
    RequestClose,
    StartDrag {
        mime_types: Vec<String>,
        action: DragAction,
    },
}

impl WindowCommand {
    pub fn name(&self) -> &'static str {
        match self {
            WindowCommand::Show => "Show",
            WindowCommand::SetTitle(_) => "SetTitle",
            WindowCommand::SetRect { .. } => "SetRect",
            WindowCommand::SetMinSize(_) => "SetMinSize",
            WindowCommand::RequestRedraw => "RequestRedraw",
            WindowCommand::RequestClose => "RequestClose",
            WindowCommand::StartDrag { .. } => "StartDrag",
        }
    }
}

/// Issues window ids and tracks which ones are open.
#[derive(Debug)]
pub struct WindowRegistry {
    next_id: i64,
    open: BTreeSet<WindowId>,
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self {
            next_id: 1,
            open: BTreeSet::new(),
        }
    }
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh id and mark it open.
    pub fn allocate(&mut self) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        self.open.insert(id);
        id
    }

    /// `Ok` only for an open window.
    pub fn check(&self, id: WindowId) -> Result<(), WindowError> {
        if self.open.contains(&id) {
            Ok(())
        } else if id.0 >= 1 && id.0 < self.next_id {
            Err(WindowError::Closed(id))
        } else {
            Err(WindowError::Unknown(id))
        }
    }

    /// Mark `id` closed. Releasing it again is an error.
    pub fn release(&mut self, id: WindowId) -> Result<(), WindowError> {
        self.check(id)?;
        self.open.remove(&id);
        Ok(())
    }

    pub fn is_open(&self, id: WindowId) -> bool {
        self.open.contains(&id)
    }

    /// Open windows in creation order.
    pub fn open_windows(&self) -> Vec<WindowId> {
        self.open.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_are_not_reused() {
        let mut registry = WindowRegistry::new();
        let first = registry.allocate();
        let second = registry.allocate();
        assert_eq!(first, WindowId(1));
        assert_eq!(second, WindowId(2));

        registry.release(first).unwrap();
        assert_eq!(registry.allocate(), WindowId(3));
        assert_eq!(registry.open_windows(), vec![WindowId(2), WindowId(3)]);
    }

    #[test]
    fn test_closed_and_unknown_ids_are_distinguished() {
        let mut registry = WindowRegistry::new();
        let id = registry.allocate();
        registry.release(id).unwrap();

        assert!(matches!(registry.check(id), Err(WindowError::Closed(w)) if w == id));
        assert!(matches!(
            registry.check(WindowId(7)),
            Err(WindowError::Unknown(WindowId(7)))
        ));
        assert!(matches!(
            registry.check(WindowId(0)),
            Err(WindowError::Unknown(WindowId(0)))
        ));
    }

    #[test]
    fn test_double_release_is_an_error() {
        let mut registry = WindowRegistry::new();
        let id = registry.allocate();
        registry.release(id).unwrap();
        assert!(matches!(registry.release(id), Err(WindowError::Closed(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_params_follow_config_defaults() {
        let defaults = WindowDefaults::default();
        let params = WindowParams::default().with_title("Demo");
        assert_eq!(params.title, "Demo");
        assert_eq!(params.size, LogicalSize::new(defaults.width, defaults.height));
        assert_eq!(
            params.min_size,
            Some(LogicalSize::new(defaults.min_width, defaults.min_height))
        );
    }
}
