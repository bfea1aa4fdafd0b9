//! Typed per-platform event taxonomy for desktop-toolkit.
//!
//! Each supported platform has a closed [`EventTaxonomy`]: one Rust enum with
//! every event the native windowing layer can report, plus a total conversion
//! from the native event record format ([`RawEvent`]) into that enum.
//!
//! Sub-modules:
//! - [`macos`], [`linux`], [`win32`]: the three taxonomies
//! - [`raw`]: native event record reader and writer
//! - [`common`], [`geometry`]: value types carried by events
//! - [`error`]: [`DecodeError`]

/// Generate `TryFrom<u32>`, `ALL` and `name` for a `#[repr(u32)]` tag enum whose
/// discriminants are listed explicitly.
macro_rules! event_tags {
    (
        $(#[$meta:meta])*
        pub enum $name:ident for $platform:path {
            $($variant:ident = $value:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum $name {
            $($variant = $value),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)*
                }
            }
        }

        impl TryFrom<u32> for $name {
            type Error = $crate::DecodeError;

            fn try_from(tag: u32) -> Result<Self, Self::Error> {
                match tag {
                    $($value => Ok($name::$variant),)*
                    _ => Err($crate::DecodeError::UnknownTag {
                        platform: $platform,
                        tag,
                    }),
                }
            }
        }

        impl From<$name> for u32 {
            fn from(tag: $name) -> u32 {
                tag as u32
            }
        }
    };
}

/// Implement [`RawCodec`] for single-field tuple structs by delegating to the
/// wrapped value.
macro_rules! newtype_codec {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $crate::raw::RawCodec for $ty {
                fn read(
                    reader: &mut $crate::raw::RawReader<'_>,
                ) -> Result<Self, $crate::DecodeError> {
                    Ok(Self(reader.read()?))
                }

                fn write(&self, writer: &mut $crate::raw::RawWriter) {
                    writer.put(&self.0);
                }
            }
        )*
    };
}

/// Implement [`RawCodec`] for a struct whose fields are laid out in
/// declaration order.
macro_rules! struct_codec {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::raw::RawCodec for $ty {
            fn read(reader: &mut $crate::raw::RawReader<'_>) -> Result<Self, $crate::DecodeError> {
                Ok(Self {
                    $($field: reader.read()?,)*
                })
            }

            fn write(&self, writer: &mut $crate::raw::RawWriter) {
                $(writer.put(&self.$field);)*
            }
        }
    };
}

/// Declare a field-less enum carried as a `u32` in native records. Values
/// outside the listed discriminants decode to [`DecodeError::InvalidValue`].
macro_rules! value_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),*
        }

        impl $crate::raw::RawCodec for $name {
            fn read(reader: &mut $crate::raw::RawReader<'_>) -> Result<Self, $crate::DecodeError> {
                match reader.read::<u32>()? {
                    $($value => Ok($name::$variant),)*
                    other => Err($crate::DecodeError::InvalidValue {
                        field: stringify!($name),
                        value: u64::from(other),
                    }),
                }
            }

            fn write(&self, writer: &mut $crate::raw::RawWriter) {
                writer.put(&(*self as u32));
            }
        }
    };
}

pub mod common;
pub mod error;
pub mod geometry;
pub mod linux;
pub mod macos;
pub mod raw;
pub mod win32;

use std::fmt;
use std::str::FromStr;

pub use common::{EventHandlerResult, MouseButton, RequestId, ScreenId, WindowId};
pub use error::DecodeError;
pub use geometry::{LogicalPoint, LogicalSize, PhysicalPoint, PhysicalSize};
pub use linux::Linux;
pub use macos::Macos;
pub use raw::{OwnedRawEvent, RawCodec, RawEvent, RawReader, RawWriter};
pub use win32::Win32;

/// Windowing platforms with a dedicated event taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Macos,
    Linux,
    Win32,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Macos, Platform::Linux, Platform::Win32];

    pub fn name(self) -> &'static str {
        match self {
            Platform::Macos => "macos",
            Platform::Linux => "linux",
            Platform::Win32 => "win32",
        }
    }

    /// The platform this binary was compiled for, if it is a supported one.
    pub fn current() -> Option<Platform> {
        if cfg!(target_os = "macos") {
            Some(Platform::Macos)
        } else if cfg!(target_os = "linux") {
            Some(Platform::Linux)
        } else if cfg!(target_os = "windows") {
            Some(Platform::Win32)
        } else {
            None
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "macos" | "mac" => Ok(Platform::Macos),
            "linux" => Ok(Platform::Linux),
            "win32" | "windows" => Ok(Platform::Win32),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Behaviour every decoded platform event offers to generic code.
pub trait PlatformEvent: fmt::Debug + Clone + Send + 'static {
    /// The window the event is addressed to, or `None` for application-wide
    /// events.
    fn window_id(&self) -> Option<WindowId>;

    /// Variant name, for logging.
    fn name(&self) -> &'static str;

    /// Whether the user asked to close the addressed window.
    fn is_close_request(&self) -> bool;
}

/// A closed event taxonomy together with its native record codec.
pub trait EventTaxonomy: Send + Sync + 'static {
    type Event: PlatformEvent;

    const PLATFORM: Platform;

    /// Convert a native event record into the typed event. Strings and byte
    /// buffers are copied, so the record may be freed right after this
    /// returns.
    fn decode(raw: RawEvent<'_>) -> Result<Self::Event, DecodeError>;

    /// Produce the native record for an event. This is the native side's half
    /// of the contract and is what in-process bindings use to inject events.
    fn encode(event: &Self::Event) -> OwnedRawEvent;

    /// The event the native layer reports when the user asks to close
    /// `window_id`.
    fn close_request(window_id: WindowId) -> Self::Event;

    /// The event reported once the native application finished launching, if
    /// the platform has one.
    fn launch_event() -> Option<Self::Event>;
}
