//! Flat token storage for the parser.

use super::{Token, TokenKind};
use crate::Span;

/// A list of significant tokens, always terminated by [`TokenKind::Eof`]
/// once produced by the lexer.
///
/// Keeps a parallel array of kinds so the parser's lookahead touches one
/// byte per token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
    kinds: Vec<TokenKind>,
}

impl TokenList {
    #[inline]
    pub fn new() -> Self {
        TokenList::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        TokenList {
            tokens: Vec::with_capacity(capacity),
            kinds: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, token: Token) {
        self.kinds.push(token.kind);
        self.tokens.push(token);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Kind at `index`, or `Eof` past the end.
    #[inline]
    pub fn kind(&self, index: usize) -> TokenKind {
        self.kinds.get(index).copied().unwrap_or(TokenKind::Eof)
    }

    /// Span at `index`, or a point span at the end of the last token.
    #[inline]
    pub fn span(&self, index: usize) -> Span {
        match self.tokens.get(index) {
            Some(token) => token.span,
            None => self
                .tokens
                .last()
                .map_or(Span::DUMMY, |t| Span::point(t.span.end)),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    pub fn kinds(&self) -> &[TokenKind] {
        &self.kinds
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Index of the first token whose span ends at or after `offset`.
    pub fn index_at_offset(&self, offset: u32) -> usize {
        self.tokens.partition_point(|t| t.span.end < offset)
    }
}

impl std::ops::Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl std::fmt::Debug for TokenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tokens.iter()).finish()
    }
}

impl FromIterator<Token> for TokenList {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut list = TokenList::new();
        for token in iter {
            list.push(token);
        }
        list
    }
}
