//! Minimal CBOR decoder for WebAuthn structures.
//!
//! Covers the subset that browsers and authenticators emit inside attestation
//! objects and COSE keys:
//!
//! - Unsigned and negative integers
//! - Byte strings and text strings
//! - Arrays and maps (integer or text keys)
//!
//! Only definite lengths up to 32 bits are accepted. Tags, floats, simple
//! values and 64-bit or indefinite lengths fail with a [`CborError`].
//!
//! Decoding walks the input with an explicit cursor ([`Decoder`]) so the
//! number of bytes consumed by an item is always known to the caller.

use std::collections::BTreeMap;

use crate::error::CborError;

// CBOR major types
const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;

/// Maximum container nesting accepted by the decoder.
pub const MAX_DEPTH: usize = 16;

/// Key of a decoded CBOR map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Integer(i64),
    Text(String),
}

/// A decoded CBOR item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CborValue {
    /// Major types 0 and 1. Negative values are already `-1 - n`.
    Integer(i64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<CborValue>),
    /// Entries are looked up by key; encoding order is not kept.
    Map(BTreeMap<MapKey, CborValue>),
}

impl CborValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[CborValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<MapKey, CborValue>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up an integer label in a map. `None` for non-maps.
    pub fn get_int(&self, label: i64) -> Option<&CborValue> {
        self.as_map()?.get(&MapKey::Integer(label))
    }

    /// Look up a text key in a map. `None` for non-maps.
    pub fn get_text(&self, key: &str) -> Option<&CborValue> {
        self.as_map()?.get(&MapKey::Text(key.to_owned()))
    }
}

/// Cursor over a CBOR buffer.
///
/// Each call to [`Decoder::decode_item`] consumes exactly one item and leaves
/// the cursor on the first byte after it.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Decode the next item.
    ///
    /// On error the cursor position is unspecified; the decoder should be
    /// dropped.
    pub fn decode_item(&mut self) -> Result<CborValue, CborError> {
        self.item(0)
    }

    fn item(&mut self, depth: usize) -> Result<CborValue, CborError> {
        if depth > MAX_DEPTH {
            return Err(CborError::DepthLimitExceeded { max: MAX_DEPTH });
        }

        let start = self.offset;
        let initial = self.read_u8()?;
        let major = initial >> 5;
        let additional = initial & 0x1f;

        match major {
            MAJOR_UNSIGNED => {
                let value = self.read_argument(additional, start)?;
                Ok(CborValue::Integer(value as i64))
            }
            MAJOR_NEGATIVE => {
                let magnitude = self.read_argument(additional, start)?;
                Ok(CborValue::Integer(-1 - magnitude as i64))
            }
            MAJOR_BYTES => {
                let len = self.read_length(additional, start)?;
                Ok(CborValue::Bytes(self.take(len)?.to_vec()))
            }
            MAJOR_TEXT => {
                let len = self.read_length(additional, start)?;
                let body_offset = self.offset;
                let bytes = self.take(len)?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| CborError::InvalidUtf8 {
                        offset: body_offset,
                    })?;
                Ok(CborValue::Text(text.to_owned()))
            }
            MAJOR_ARRAY => {
                let count = self.read_length(additional, start)?;
                // Every item takes at least one byte, so never reserve more
                // slots than there are bytes left.
                let mut items = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    items.push(self.item(depth + 1)?);
                }
                Ok(CborValue::Array(items))
            }
            MAJOR_MAP => {
                let count = self.read_length(additional, start)?;
                let mut entries = BTreeMap::new();
                for _ in 0..count {
                    let key_offset = self.offset;
                    let key = match self.item(depth + 1)? {
                        CborValue::Integer(label) => MapKey::Integer(label),
                        CborValue::Text(text) => MapKey::Text(text),
                        _ => return Err(CborError::InvalidMapKey { offset: key_offset }),
                    };
                    let value = self.item(depth + 1)?;
                    entries.insert(key, value);
                }
                Ok(CborValue::Map(entries))
            }
            _ => Err(CborError::UnsupportedMajorType {
                major,
                offset: start,
            }),
        }
    }

    /// Read the integer argument that follows an initial byte.
    fn read_argument(&mut self, additional: u8, start: usize) -> Result<u64, CborError> {
        match additional {
            0..=23 => Ok(u64::from(additional)),
            24 => Ok(u64::from(self.read_u8()?)),
            25 => {
                let bytes = self.take(2)?;
                Ok(u64::from(u16::from_be_bytes([bytes[0], bytes[1]])))
            }
            26 => {
                let bytes = self.take(4)?;
                Ok(u64::from(u32::from_be_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3],
                ])))
            }
            _ => Err(CborError::UnsupportedLength {
                additional,
                offset: start,
            }),
        }
    }

    fn read_length(&mut self, additional: u8, start: usize) -> Result<usize, CborError> {
        let value = self.read_argument(additional, start)?;
        usize::try_from(value).map_err(|_| CborError::UnsupportedLength {
            additional,
            offset: start,
        })
    }

    fn read_u8(&mut self) -> Result<u8, CborError> {
        let byte = *self
            .input
            .get(self.offset)
            .ok_or(CborError::UnexpectedEnd {
                offset: self.offset,
                needed: 1,
            })?;
        self.offset += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CborError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or(CborError::UnexpectedEnd {
                offset: self.offset,
                needed: len.saturating_sub(self.remaining()),
            })?;
        let slice = &self.input[self.offset..end];
        self.offset = end;
        Ok(slice)
    }
}

/// Decode one item from the start of `input`.
///
/// Returns the value and the number of bytes it occupied. Bytes after the
/// item are left for the caller to inspect.
pub fn decode(input: &[u8]) -> Result<(CborValue, usize), CborError> {
    let mut decoder = Decoder::new(input);
    let value = decoder.decode_item()?;
    Ok((value, decoder.offset()))
}

/// Decode one item that must span the whole of `input`.
pub fn decode_exact(input: &[u8]) -> Result<CborValue, CborError> {
    let (value, consumed) = decode(input)?;
    if consumed != input.len() {
        return Err(CborError::TrailingBytes {
            consumed,
            remaining: input.len() - consumed,
        });
    }
    Ok(value)
}
