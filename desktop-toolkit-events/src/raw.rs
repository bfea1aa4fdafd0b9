//! Native event records.
//!
//! The native windowing layer reports every occurrence as a record made of a
//! `u32` tag and a little-endian payload. The payload layout is defined by the
//! order of the fields of the corresponding event variant:
//!
//! | Field type        | Encoding                                         |
//! |-------------------|--------------------------------------------------|
//! | integers, floats  | fixed width, little-endian                       |
//! | `bool`            | one byte, `0` or `1`                             |
//! | `String`          | `u32` byte length followed by UTF-8 bytes        |
//! | `Vec<T>`          | `u32` element count followed by the elements     |
//! | `Option<T>`       | one presence byte, then the value when present   |
//!
//! Decoding copies every string and buffer out of the record, so the native
//! side may free the record as soon as `decode` returns.

use crate::error::DecodeError;

/// A borrowed native event record, valid only for the duration of a native
/// callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent<'a> {
    tag: u32,
    payload: &'a [u8],
}

impl<'a> RawEvent<'a> {
    pub fn new(tag: u32, payload: &'a [u8]) -> Self {
        Self { tag, payload }
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Start reading the payload from its first byte.
    pub fn reader(&self) -> RawReader<'a> {
        RawReader::new(self.payload)
    }

    pub fn to_owned_event(&self) -> OwnedRawEvent {
        OwnedRawEvent {
            tag: self.tag,
            payload: self.payload.to_vec(),
        }
    }
}

/// A native event record that owns its payload.
///
/// Used when a record has to cross threads before it is decoded, e.g. when the
/// native layer queues records for the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRawEvent {
    tag: u32,
    payload: Vec<u8>,
}

impl OwnedRawEvent {
    pub fn new(tag: u32, payload: Vec<u8>) -> Self {
        Self { tag, payload }
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn as_raw(&self) -> RawEvent<'_> {
        RawEvent::new(self.tag, &self.payload)
    }
}

/// A value with a fixed position in the native record layout.
pub trait RawCodec: Sized {
    fn read(reader: &mut RawReader<'_>) -> Result<Self, DecodeError>;
    fn write(&self, writer: &mut RawWriter);
}

/// Sequential reader over a record payload.
#[derive(Debug)]
pub struct RawReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RawReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Read the next field of type `T`.
    pub fn read<T: RawCodec>(&mut self) -> Result<T, DecodeError> {
        T::read(self)
    }

    /// Fail unless the whole payload has been consumed.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < needed {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}

/// Builder for record payloads, the inverse of [`RawReader`].
#[derive(Debug, Default)]
pub struct RawWriter {
    buf: Vec<u8>,
}

impl RawWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn put<T: RawCodec>(&mut self, value: &T) -> &mut Self {
        value.write(self);
        self
    }

    pub fn into_event(self, tag: u32) -> OwnedRawEvent {
        OwnedRawEvent::new(tag, self.buf)
    }

    fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }
}

macro_rules! impl_codec_for_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RawCodec for $ty {
                fn read(reader: &mut RawReader<'_>) -> Result<Self, DecodeError> {
                    Ok(<$ty>::from_le_bytes(reader.take_array()?))
                }

                fn write(&self, writer: &mut RawWriter) {
                    writer.extend(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_codec_for_le!(u8, u16, u32, u64, i32, i64, f32, f64);

impl RawCodec for bool {
    fn read(reader: &mut RawReader<'_>) -> Result<Self, DecodeError> {
        match reader.read::<u8>()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidValue {
                field: "bool",
                value: u64::from(other),
            }),
        }
    }

    fn write(&self, writer: &mut RawWriter) {
        writer.put(&u8::from(*self));
    }
}

impl RawCodec for char {
    fn read(reader: &mut RawReader<'_>) -> Result<Self, DecodeError> {
        let value = reader.read::<u32>()?;
        char::from_u32(value).ok_or(DecodeError::InvalidValue {
            field: "char",
            value: u64::from(value),
        })
    }

    fn write(&self, writer: &mut RawWriter) {
        writer.put(&u32::from(*self));
    }
}

impl RawCodec for String {
    fn read(reader: &mut RawReader<'_>) -> Result<Self, DecodeError> {
        let offset = reader.offset();
        let len = reader.read::<u32>()? as usize;
        let bytes = reader.take(len)?;
        // Copy out of native memory; the record may be freed after decode.
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { offset })
    }

    fn write(&self, writer: &mut RawWriter) {
        writer.put(&(self.len() as u32));
        writer.extend(self.as_bytes());
    }
}

impl<T: RawCodec> RawCodec for Vec<T> {
    fn read(reader: &mut RawReader<'_>) -> Result<Self, DecodeError> {
        let count = reader.read::<u32>()? as usize;
        // Every element occupies at least one byte, so a corrupt count cannot
        // trigger an oversized allocation.
        let mut items = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            items.push(reader.read()?);
        }
        Ok(items)
    }

    fn write(&self, writer: &mut RawWriter) {
        writer.put(&(self.len() as u32));
        for item in self {
            writer.put(item);
        }
    }
}

impl<T: RawCodec> RawCodec for Option<T> {
    fn read(reader: &mut RawReader<'_>) -> Result<Self, DecodeError> {
        if reader.read::<bool>()? {
            Ok(Some(reader.read()?))
        } else {
            Ok(None)
        }
    }

    fn write(&self, writer: &mut RawWriter) {
        match self {
            Some(value) => {
                writer.put(&true).put(value);
            }
            None => {
                writer.put(&false);
            }
        }
    }
}
