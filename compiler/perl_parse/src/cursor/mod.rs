//! Token cursor for navigating the token stream.
//!
//! Heredoc bodies are lexed after the rest of the line that opens them, so
//! they sit in the token list between two ordinary tokens. The cursor walks
//! only the ordinary ("code") tokens and reports the body tokens it steps
//! over, so the parser can attach them once the current statement is done.

use std::ops::Range;

use perl_ir::{LexMode, Span, Token, TokenKind, TokenList};
use tracing::trace;

/// Cursor over the code tokens of a [`TokenList`].
pub struct Cursor<'a> {
    tokens: &'a TokenList,
    /// Indices of tokens outside heredoc bodies. The last one is `Eof`.
    code: Vec<u32>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "token counts are bounded by u32 source offsets"
        )]
        let mut code: Vec<u32> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.mode != LexMode::HeredocBody)
            .map(|(i, _)| i as u32)
            .collect();
        if code.last().map(|&i| tokens.kind(i as usize)) != Some(TokenKind::Eof) {
            // A list always ends in Eof; keep the invariant for hand-built ones.
            #[expect(
                clippy::cast_possible_truncation,
                reason = "token counts are bounded by u32 source offsets"
            )]
            code.push(tokens.len().saturating_sub(1) as u32);
        }
        Cursor {
            tokens,
            code,
            pos: 0,
        }
    }

    #[inline]
    pub fn tokens(&self) -> &'a TokenList {
        self.tokens
    }

    /// Position among the code tokens, for progress checks.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Index of the current token in the full token list.
    #[inline]
    pub fn current_index(&self) -> u32 {
        self.code[self.pos.min(self.code.len() - 1)]
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        &self.tokens[self.current_index() as usize]
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Token at code position `pos`, clamped to `Eof`.
    #[inline]
    pub fn token_at(&self, pos: usize) -> &'a Token {
        let idx = self.code[pos.min(self.code.len() - 1)];
        &self.tokens[idx as usize]
    }

    /// The `n`-th code token after the current one.
    #[inline]
    pub fn peek(&self, n: usize) -> &'a Token {
        self.token_at(self.pos + n)
    }

    #[inline]
    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.peek(n).kind
    }

    /// Span of the last consumed code token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.token_at(self.pos - 1).span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub fn previous_kind(&self) -> TokenKind {
        if self.pos > 0 {
            self.token_at(self.pos - 1).kind
        } else {
            TokenKind::Eof
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Step past the current token.
    ///
    /// Returns the indices of heredoc body tokens lying between it and the
    /// next code token (usually empty). Never moves past `Eof`.
    pub fn advance(&mut self) -> Range<u32> {
        if self.is_at_end() {
            return 0..0;
        }
        let from = self.code[self.pos] + 1;
        self.pos += 1;
        let to = self.code[self.pos];
        trace!(pos = self.pos, kind = ?self.current_kind(), "advance");
        from..to
    }

    /// Heredoc body tokens after the last code token before `Eof`.
    pub fn trailing_bodies(&self) -> Range<u32> {
        let eof = self.code[self.code.len() - 1];
        #[expect(
            clippy::cast_possible_truncation,
            reason = "token counts are bounded by u32 source offsets"
        )]
        let len = self.tokens.len() as u32;
        (eof + 1).min(len)..len
    }
}

#[cfg(test)]
mod tests;
