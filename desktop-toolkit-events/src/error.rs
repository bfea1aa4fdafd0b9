//! Typed error variants for native event record decoding.
//!
//! Every variant describes a contract violation between the native layer and
//! this crate. Callers must treat them as fatal: an event that cannot be
//! decoded is never replaced by a default variant.

use thiserror::Error;

use crate::Platform;

/// Errors produced while decoding a native event record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The record's tag does not correspond to any variant of the platform's
    /// event taxonomy.
    #[error("Unexpected {platform} event tag {tag}")]
    UnknownTag {
        /// Platform whose taxonomy was used for decoding.
        platform: Platform,
        /// The raw tag value found in the record.
        tag: u32,
    },

    /// The payload ended before all fields of the variant were read.
    #[error("Native record truncated at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Byte offset at which the read was attempted.
        offset: usize,
        /// Number of bytes the read needed.
        needed: usize,
        /// Number of bytes left in the payload.
        remaining: usize,
    },

    /// The payload was longer than the variant's layout.
    #[error("Native record has {0} trailing bytes")]
    TrailingBytes(usize),

    /// A string field did not contain valid UTF-8.
    #[error("Invalid UTF-8 in string field at offset {offset}")]
    InvalidUtf8 {
        /// Byte offset of the string's length prefix.
        offset: usize,
    },

    /// A field holding an enumeration or flag had a value outside its domain.
    #[error("Invalid value {value} for {field}")]
    InvalidValue {
        /// Name of the field type being decoded.
        field: &'static str,
        /// The offending raw value.
        value: u64,
    },
}
