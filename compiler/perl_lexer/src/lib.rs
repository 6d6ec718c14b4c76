//! Perl lexer.
//!
//! Turns source text into [`Token`]s. Two entry points:
//!
//! - [`Lexer`]: a lazy iterator over every token, trivia included, that
//!   can be suspended with [`Lexer::checkpoint`] and resumed later.
//! - [`lex`]: runs a `Lexer` to completion and splits the stream into the
//!   parser's [`TokenList`] (with [`TokenFlags`](perl_ir::TokenFlags)) and
//!   the trivia, records line-start checkpoints for [`relex`], and collects
//!   `#@name` annotations.
//!
//! Lexing never fails. Unterminated quote-likes and heredocs produce
//! `UnterminatedQuote` / `UnterminatedHeredoc` tokens, and bytes that fit
//! no token become one-character `Error` tokens.
//!
//! # Incremental re-lexing
//!
//! Lookahead never crosses a newline, so the tokens before a checkpoint at
//! a line start depend only on the text before it. [`relex`] keeps those
//! tokens and resumes from the last checkpoint at or before the edit.

mod annotation;
mod checkpoint;
mod lexer;
mod output;

pub use annotation::{Annotation, AnnotationKind};
pub use checkpoint::LexCheckpoint;
pub use lexer::{unindent_heredoc, Lexer};
pub use output::{lex, lex_with, relex, LexOptions, LexOutput};

pub use perl_ir::{LexMode, Token, TokenKind, TokenList};
pub use perl_lexer_core::SourceBuffer;
