//! Parse error types.
//!
//! The parser never stops at an error. Each one is recorded with the span it
//! concerns and parsing continues after recovery, so a file yields a tree
//! and a list of errors together.

use std::fmt;

use perl_ir::{Span, TokenKind};

/// What went wrong.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParseErrorKind {
    /// A specific token was required.
    Expected {
        expected: TokenKind,
        found: TokenKind,
    },
    /// An operand was required.
    ExpectedExpression { found: TokenKind },
    /// A package, sub or module name was required.
    ExpectedName {
        what: &'static str,
        found: TokenKind,
    },
    /// A token that cannot start a statement.
    UnexpectedToken { found: TokenKind },
    /// A `{`, `(` or `[` without its closing partner.
    UnclosedDelimiter { open: TokenKind },
    UnterminatedString,
    UnterminatedHeredoc,
}

/// One parse error.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    #[inline]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError { kind, span }
    }

    /// Short title for diagnostics.
    pub const fn title(&self) -> &'static str {
        match self.kind {
            ParseErrorKind::Expected { .. } => "missing token",
            ParseErrorKind::ExpectedExpression { .. } => "missing expression",
            ParseErrorKind::ExpectedName { .. } => "missing name",
            ParseErrorKind::UnexpectedToken { .. } => "unexpected token",
            ParseErrorKind::UnclosedDelimiter { .. } => "unclosed delimiter",
            ParseErrorKind::UnterminatedString => "unterminated string",
            ParseErrorKind::UnterminatedHeredoc => "unterminated heredoc",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParseErrorKind::Expected { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ParseErrorKind::ExpectedExpression { found } => {
                write!(f, "expected an expression, found {found}")
            }
            ParseErrorKind::ExpectedName { what, found } => {
                write!(f, "expected {what} name, found {found}")
            }
            ParseErrorKind::UnexpectedToken { found } => write!(f, "unexpected {found}"),
            ParseErrorKind::UnclosedDelimiter { open } => write!(f, "unclosed {open}"),
            ParseErrorKind::UnterminatedString => {
                f.write_str("string is not terminated before end of file")
            }
            ParseErrorKind::UnterminatedHeredoc => {
                f.write_str("heredoc terminator not found before end of file")
            }
        }
    }
}

impl std::error::Error for ParseError {}
