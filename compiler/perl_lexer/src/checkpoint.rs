//! Resumable lexer state.

use std::collections::VecDeque;

use perl_ir::TokenKind;

use crate::lexer::{PendingHeredoc, QuoteState};

/// Everything a [`Lexer`](crate::Lexer) needs to continue from `offset`.
///
/// [`lex`](crate::lex) only records checkpoints at line starts in plain
/// code, where the mode stack and the heredoc queue are empty, but a
/// checkpoint taken anywhere with [`Lexer::checkpoint`](crate::Lexer::checkpoint)
/// resumes correctly.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LexCheckpoint {
    pub offset: u32,
    pub(crate) expect_term: bool,
    pub(crate) prev_kind: TokenKind,
    pub(crate) after_sub: u8,
    pub(crate) modes: Vec<QuoteState>,
    pub(crate) pending_heredocs: VecDeque<PendingHeredoc>,
}

impl LexCheckpoint {
    /// Whether an operand is expected at `offset` (`/` starts a regex).
    #[inline]
    pub fn expects_term(&self) -> bool {
        self.expect_term
    }

    /// Inside a quote-like or with a heredoc body still to come.
    pub fn is_nested(&self) -> bool {
        !self.modes.is_empty() || !self.pending_heredocs.is_empty()
    }
}
