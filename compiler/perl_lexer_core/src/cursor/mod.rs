//! Byte cursor over a sentinel-terminated buffer.
//!
//! EOF is the sentinel byte at a position `>= source_len`; a NUL inside the
//! source is ordinary content. Lookahead past the end reads zero padding.

/// Returns the earliest of two optional offsets.
///
/// memchr searches at most three needles at once; wider needle sets are
/// split and their results combined with this.
fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Offset of the first byte in `haystack` that is one of `needles`.
fn find_any(needles: &[u8], haystack: &[u8]) -> Option<usize> {
    needles
        .chunks(3)
        .map(|chunk| match *chunk {
            [a] => memchr::memchr(a, haystack),
            [a, b] => memchr::memchr2(a, b, haystack),
            [a, b, c] => memchr::memchr3(a, b, c, haystack),
            _ => None,
        })
        .fold(None, earliest_of)
}

/// `Copy` cursor over a [`SourceBuffer`](crate::SourceBuffer).
///
/// # Invariant
///
/// `buf[source_len..]` is all zero and at least one byte long.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    text: &'a str,
    pos: u32,
    source_len: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8], text: &'a str, source_len: u32) -> Self {
        debug_assert!((source_len as usize) < buf.len());
        Self {
            buf,
            text,
            pos: 0,
            source_len,
        }
    }

    /// Byte at the current position (`0` at EOF).
    #[inline]
    pub fn current(&self) -> u8 {
        self.byte_at(self.pos)
    }

    #[inline]
    pub fn peek(&self) -> u8 {
        self.byte_at(self.pos + 1)
    }

    /// Byte `n` positions ahead of current.
    #[inline]
    pub fn peek_at(&self, n: u32) -> u8 {
        self.byte_at(self.pos + n)
    }

    /// Byte at an absolute position; `0` anywhere past the source.
    #[inline]
    pub fn byte_at(&self, pos: u32) -> u8 {
        self.buf.get(pos as usize).copied().unwrap_or(0)
    }

    /// Byte before the current position, `None` at the start.
    #[inline]
    pub fn prev(&self) -> Option<u8> {
        self.pos.checked_sub(1).map(|p| self.byte_at(p))
    }

    #[inline]
    pub fn advance(&mut self) {
        self.pos = (self.pos + 1).min(self.source_len);
    }

    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos = (self.pos + n).min(self.source_len);
    }

    /// Move to an absolute position (clamped to the end of the source).
    #[inline]
    pub fn set_pos(&mut self, pos: u32) {
        self.pos = pos.min(self.source_len);
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source_len
    }

    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    /// True at offset 0 or right after a `\n`.
    #[inline]
    pub fn at_line_start(&self) -> bool {
        self.pos == 0 || self.byte_at(self.pos - 1) == b'\n'
    }

    /// Source text between two offsets.
    ///
    /// Offsets that split a UTF-8 sequence yield an empty string.
    #[inline]
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        self.text.get(start as usize..end as usize).unwrap_or("")
    }

    #[inline]
    pub fn slice_from(&self, start: u32) -> &'a str {
        self.slice(start, self.pos)
    }

    /// Remaining source bytes from the current position.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos as usize..self.source_len as usize]
    }

    /// Does the source continue with `prefix` at the current position?
    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Advance while `pred` holds. `pred(0)` must be `false`.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Width of the UTF-8 sequence introduced by `byte`.
    #[inline]
    pub fn utf8_char_width(byte: u8) -> u32 {
        match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        }
    }

    /// Advance past one full UTF-8 character.
    #[inline]
    pub fn advance_char(&mut self) {
        let width = Self::utf8_char_width(self.current());
        self.advance_n(width);
    }

    /// Skip spaces, tabs, carriage returns and form feeds.
    #[inline]
    pub fn eat_blanks(&mut self) {
        self.eat_while(crate::is_blank);
    }

    /// Offset of the next `\n` at or after `from`, or the source length.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offsets are bounded by source_len which fits in u32"
    )]
    pub fn line_end_from(&self, from: u32) -> u32 {
        let from = from.min(self.source_len);
        let hay = &self.buf[from as usize..self.source_len as usize];
        match memchr::memchr(b'\n', hay) {
            Some(off) => from + off as u32,
            None => self.source_len,
        }
    }

    /// Move to the next `\n` (not past it), or to EOF.
    pub fn eat_until_newline_or_eof(&mut self) {
        self.pos = self.line_end_from(self.pos);
    }

    /// Move to the next byte that is one of `needles` and return it, or move
    /// to EOF and return `0`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offsets are bounded by source_len which fits in u32"
    )]
    pub fn skip_to_any(&mut self, needles: &[u8]) -> u8 {
        match find_any(needles, self.rest()) {
            Some(off) => {
                self.pos += off as u32;
                self.current()
            }
            None => {
                self.pos = self.source_len;
                0
            }
        }
    }
}
