//! Token types for the Perl lexer.
//!
//! A token is a kind, a span and the lexer mode it was emitted in. Token
//! text is never copied; consumers slice the source with the span.

mod kind;
mod list;

pub use kind::{TokenKind, TOKEN_KIND_COUNT};
pub use list::TokenList;

use super::Span;
use std::fmt;

/// Lexer mode active when a token was emitted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LexMode {
    /// Ordinary program text.
    #[default]
    Code,
    /// Inside an interpolating string or pattern.
    Interpolated,
    /// Inside a non-interpolating string.
    Literal,
    /// Inside a heredoc body.
    HeredocBody,
    /// Inside a POD block.
    Pod,
}

bitflags::bitflags! {
    /// Layout context preceding a significant token.
    ///
    /// Only filled in for the parser's token list; trivia tokens carry no flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TokenFlags: u8 {
        /// Whitespace or a comment preceded this token.
        const SPACE_BEFORE = 1 << 0;
        /// A newline preceded this token.
        const NEWLINE_BEFORE = 1 << 1;
    }
}

/// A token with its span in the source.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
    pub mode: LexMode,
    pub flags: TokenFlags,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, span: Span, mode: LexMode) -> Self {
        Token {
            span,
            kind,
            mode,
            flags: TokenFlags::empty(),
        }
    }

    /// Create a dummy token for tests and synthesized input.
    pub const fn dummy(kind: TokenKind) -> Self {
        Token::new(kind, Span::DUMMY, LexMode::Code)
    }

    /// Source text covered by this token.
    #[inline]
    pub fn text(self, source: &str) -> &str {
        self.span.text(source)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)?;
        if self.mode != LexMode::Code {
            write!(f, " [{:?}]", self.mode)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
