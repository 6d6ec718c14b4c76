//! Token sets for error recovery and lookahead decisions.
//!
//! A [`TokenSet`] is a `u128` bitset indexed by `TokenKind` discriminant, so
//! membership is one AND. Sets are built in const context and shared as
//! constants below.

use perl_ir::{TokenKind, TOKEN_KIND_COUNT};

const _: () = assert!(
    TOKEN_KIND_COUNT <= 128,
    "TokenSet uses a u128 bitset; every TokenKind discriminant must be < 128"
);

/// A set of token kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TokenSet(u128);

impl TokenSet {
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Add a kind (builder form for const contexts).
    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1u128 << kind as u8))
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, kind: TokenKind) -> bool {
        (self.0 & (1u128 << kind as u8)) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

/// Where a damaged statement ends. `;` is consumed, `}` and end of file are not.
pub const STMT_END: TokenSet = TokenSet::new()
    .with(TokenKind::Semicolon)
    .with(TokenKind::RBrace)
    .with(TokenKind::Eof);

/// Simple variable tokens.
pub const VARIABLES: TokenSet = TokenSet::new()
    .with(TokenKind::ScalarVar)
    .with(TokenKind::ArrayVar)
    .with(TokenKind::HashVar)
    .with(TokenKind::CodeVar)
    .with(TokenKind::GlobVar)
    .with(TokenKind::ArrayLastIndex);

/// Sigils applied to an expression.
pub const CASTS: TokenSet = TokenSet::new()
    .with(TokenKind::CastScalar)
    .with(TokenKind::CastArray)
    .with(TokenKind::CastHash)
    .with(TokenKind::CastCode)
    .with(TokenKind::CastGlob)
    .with(TokenKind::CastLastIndex);

/// `my`, `our`, `local`, `state`.
pub const DECLARATORS: TokenSet = TokenSet::new()
    .with(TokenKind::KwMy)
    .with(TokenKind::KwOur)
    .with(TokenKind::KwLocal)
    .with(TokenKind::KwState);

/// Tokens that start an operand and cannot continue one as an infix
/// operator. A bareword followed by one of these is a list-operator call.
pub const LIST_ARG_START: TokenSet = VARIABLES
    .union(CASTS)
    .union(DECLARATORS)
    .with(TokenKind::Number)
    .with(TokenKind::VString)
    .with(TokenKind::QuoteOpen)
    .with(TokenKind::HeredocOpener)
    .with(TokenKind::ReadLine)
    .with(TokenKind::Ident)
    .with(TokenKind::LBracket)
    .with(TokenKind::LBrace)
    .with(TokenKind::Backslash)
    .with(TokenKind::Bang)
    .with(TokenKind::FileTest)
    .with(TokenKind::KwSub)
    .with(TokenKind::KwDo)
    .with(TokenKind::KwEval)
    .with(TokenKind::KwCurrentPackage);

/// Every token an expression can start with.
pub const TERM_START: TokenSet = LIST_ARG_START
    .with(TokenKind::LParen)
    .with(TokenKind::Tilde)
    .with(TokenKind::Minus)
    .with(TokenKind::Plus)
    .with(TokenKind::PlusPlus)
    .with(TokenKind::MinusMinus)
    .with(TokenKind::KwNot)
    .with(TokenKind::KwReturn)
    .with(TokenKind::KwRequire)
    .with(TokenKind::KwLast)
    .with(TokenKind::KwNext)
    .with(TokenKind::KwRedo)
    .with(TokenKind::KwGoto);

/// `EXPR if COND;` and friends.
pub const STATEMENT_MODIFIERS: TokenSet = TokenSet::new()
    .with(TokenKind::KwIf)
    .with(TokenKind::KwUnless)
    .with(TokenKind::KwWhile)
    .with(TokenKind::KwUntil)
    .with(TokenKind::KwFor)
    .with(TokenKind::KwForeach);

#[cfg(test)]
mod tests;
