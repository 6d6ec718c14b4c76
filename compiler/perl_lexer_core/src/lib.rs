//! Low-level scanning primitives for the Perl lexer.
//!
//! - [`SourceBuffer`]: the source bytes followed by a zero sentinel and
//!   zero padding, so lookahead never needs a bounds check in the common case.
//! - [`Cursor`]: a `Copy` byte cursor over a `SourceBuffer` with the
//!   memchr-backed skips the lexer needs (to end of line, to the next
//!   quote delimiter, to a heredoc terminator line).
//!
//! Nothing here knows about Perl tokens; that lives in `perl_lexer`.

mod cursor;
mod source_buffer;

pub use cursor::Cursor;
pub use source_buffer::SourceBuffer;

/// Perl identifier continuation byte.
///
/// Bytes >= 0x80 are accepted so that `use utf8` identifiers and stray
/// non-ASCII text lex as words instead of error tokens.
#[inline]
pub const fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Perl identifier start byte.
#[inline]
pub const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

/// Horizontal whitespace and the other non-newline blanks Perl skips.
#[inline]
pub const fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | 0x0C)
}
