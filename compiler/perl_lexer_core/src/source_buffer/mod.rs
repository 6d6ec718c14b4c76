//! Sentinel-terminated copy of the source text.
//!
//! # Layout
//!
//! ```text
//! [source_bytes..., 0x00, padding_zeros...]
//!  ^                ^     ^
//!  0                |     rounded up to a 64-byte boundary
//!              source_len (sentinel)
//! ```
//!
//! A Perl source may legitimately contain NUL bytes inside strings, so EOF
//! is the sentinel *and* `pos >= source_len`, never the byte value alone.

use crate::Cursor;

const CACHE_LINE: usize = 64;

/// Owned, sentinel-padded source buffer.
#[derive(Clone, Debug)]
pub struct SourceBuffer<'src> {
    text: &'src str,
    buf: Vec<u8>,
    source_len: u32,
}

impl<'src> SourceBuffer<'src> {
    /// Copy `text` into a padded buffer.
    ///
    /// Sources longer than `u32::MAX` bytes are truncated to that length;
    /// spans are 32-bit.
    pub fn new(text: &'src str) -> Self {
        let bytes = text.as_bytes();
        let source_len = bytes.len().min(u32::MAX as usize - CACHE_LINE);
        let padded_len = (source_len + 1 + CACHE_LINE - 1) & !(CACHE_LINE - 1);
        let mut buf = vec![0u8; padded_len];
        buf[..source_len].copy_from_slice(&bytes[..source_len]);

        Self {
            text,
            buf,
            source_len: u32::try_from(source_len).unwrap_or(u32::MAX),
        }
    }

    /// Cursor positioned at byte 0.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.buf, self.text, self.source_len)
    }

    /// Cursor positioned at `pos` (clamped to the end of the source).
    pub fn cursor_at(&self, pos: u32) -> Cursor<'_> {
        let mut cursor = self.cursor();
        cursor.set_pos(pos.min(self.source_len));
        cursor
    }

    pub fn text(&self) -> &'src str {
        self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.source_len as usize]
    }

    pub fn len(&self) -> u32 {
        self.source_len
    }

    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }

    /// Length of a leading UTF-8 byte order mark, 0 if absent.
    pub fn bom_len(&self) -> u32 {
        if self.as_bytes().starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests;
