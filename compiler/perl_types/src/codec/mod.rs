//! Byte-level encoder and decoder for the persisted stub form.
//!
//! Integers are unsigned LEB128, strings are a length followed by UTF-8
//! bytes. Each encodable item writes its [`Tag`](crate::Tag) first and then
//! its own payload; the payload layout of a tag never changes once released.
//!
//! Decoding untrusted bytes never panics: every read is bounds-checked and
//! nesting is capped at [`MAX_DEPTH`].

use thiserror::Error;

use crate::Tag;

/// Deepest value nesting accepted by the decoder.
pub const MAX_DEPTH: u32 = 64;

/// Failure to decode a stub.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input at byte {offset}")]
    Truncated { offset: usize },
    #[error("unknown tag {tag} at byte {offset}")]
    UnknownTag { tag: u8, offset: usize },
    #[error("expected {expected} at byte {offset}, found {found:?}")]
    UnexpectedTag {
        expected: &'static str,
        found: Tag,
        offset: usize,
    },
    #[error("invalid UTF-8 in string at byte {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("integer overflow at byte {offset}")]
    Overflow { offset: usize },
    #[error("values nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
    #[error("invalid payload: {0}")]
    InvalidPayload(&'static str),
    #[error("unsupported stub format version {0}")]
    UnsupportedVersion(u8),
    #[error("{count} trailing bytes after the encoded item")]
    TrailingBytes { count: usize },
}

/// Append-only byte sink.
#[derive(Default, Debug)]
pub struct Encoder {
    bytes: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder::default()
    }

    #[inline]
    pub fn tag(&mut self, tag: Tag) {
        self.bytes.push(tag.as_u8());
    }

    #[inline]
    pub fn u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    #[inline]
    pub fn bool(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    /// Unsigned LEB128.
    pub fn uint(&mut self, mut value: u64) {
        loop {
            #[expect(clippy::cast_possible_truncation, reason = "masked to 7 bits")]
            let low = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.bytes.push(low);
                return;
            }
            self.bytes.push(low | 0x80);
        }
    }

    #[inline]
    pub fn u32(&mut self, value: u32) {
        self.uint(u64::from(value));
    }

    #[inline]
    pub fn seq_len(&mut self, len: usize) {
        self.uint(len as u64);
    }

    pub fn str(&mut self, value: &str) {
        self.seq_len(value.len());
        self.bytes.extend_from_slice(value.as_bytes());
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Bounds-checked reader over an encoded stub.
#[derive(Debug)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: u32,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Decoder {
            bytes,
            pos: 0,
            depth: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Fail unless every byte has been consumed.
    pub fn finish(&self) -> Result<(), DecodeError> {
        match self.bytes.len().saturating_sub(self.pos) {
            0 => Ok(()),
            count => Err(DecodeError::TrailingBytes { count }),
        }
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or(DecodeError::Truncated { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn tag(&mut self) -> Result<Tag, DecodeError> {
        let offset = self.pos;
        Tag::from_u8(self.u8()?, offset)
    }

    /// Read a tag and require it to be `expected`.
    pub fn expect_tag(&mut self, expected: Tag) -> Result<(), DecodeError> {
        let offset = self.pos;
        let found = self.tag()?;
        if found == expected {
            Ok(())
        } else {
            Err(DecodeError::UnexpectedTag {
                expected: expected.name(),
                found,
                offset,
            })
        }
    }

    pub fn bool(&mut self) -> Result<bool, DecodeError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DecodeError::InvalidPayload("boolean out of range")),
        }
    }

    pub fn uint(&mut self) -> Result<u64, DecodeError> {
        let start = self.pos;
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.u8()?;
            if shift >= 64 || (shift == 63 && byte > 1) {
                return Err(DecodeError::Overflow { offset: start });
            }
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        let offset = self.pos;
        u32::try_from(self.uint()?).map_err(|_| DecodeError::Overflow { offset })
    }

    /// A length prefix. Lengths larger than the remaining input are rejected
    /// before anything is allocated for them.
    pub fn seq_len(&mut self) -> Result<usize, DecodeError> {
        let offset = self.pos;
        let len = usize::try_from(self.uint()?).map_err(|_| DecodeError::Overflow { offset })?;
        if len > self.bytes.len() - self.pos {
            return Err(DecodeError::Truncated {
                offset: self.bytes.len(),
            });
        }
        Ok(len)
    }

    pub fn str(&mut self) -> Result<&'a str, DecodeError> {
        let len = self.seq_len()?;
        let start = self.pos;
        let raw = &self.bytes[start..start + len];
        self.pos += len;
        std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8 { offset: start })
    }

    /// Enter one level of nesting.
    pub fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(DecodeError::TooDeep);
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
