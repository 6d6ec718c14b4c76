//! Binary operator precedence table.
//!
//! Levels run from loosest (`or`) to tightest (`**`). Prefix operators and
//! the comma are handled by the expression loop itself; their levels are
//! listed here so every binding power lives in one place.

use perl_ir::TokenKind;

/// Binding power, higher binds tighter.
pub(crate) type Prec = u8;

pub(crate) const LOW_OR: Prec = 1;
pub(crate) const LOW_AND: Prec = 2;
pub(crate) const LOW_NOT: Prec = 3;
pub(crate) const COMMA: Prec = 5;
pub(crate) const ASSIGN: Prec = 6;
pub(crate) const TERNARY: Prec = 7;
pub(crate) const RANGE: Prec = 8;
pub(crate) const OR: Prec = 9;
pub(crate) const AND: Prec = 10;
pub(crate) const BIT_OR: Prec = 11;
pub(crate) const BIT_AND: Prec = 12;
pub(crate) const EQUALITY: Prec = 13;
pub(crate) const RELATIONAL: Prec = 14;
pub(crate) const NAMED_UNARY: Prec = 15;
pub(crate) const ISA: Prec = 16;
pub(crate) const SHIFT: Prec = 17;
pub(crate) const ADDITIVE: Prec = 18;
pub(crate) const MULTIPLICATIVE: Prec = 19;
pub(crate) const BIND: Prec = 20;
pub(crate) const UNARY: Prec = 21;
pub(crate) const POW: Prec = 22;
pub(crate) const INCDEC: Prec = 23;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Assoc {
    Left,
    Right,
    /// Chaining is not meaningful (`..`); parsed like `Left`.
    None,
}

/// Precedence and associativity of `kind` as an infix operator.
///
/// `isa` is a plain word to the lexer, so the caller passes the token text
/// for identifiers.
pub(crate) fn infix(kind: TokenKind, text: &str) -> Option<(Prec, Assoc)> {
    use TokenKind::{
        AndAnd, Amp, Assign, Caret, DefinedOr, Dot, Ellipsis, GtEq, Ident, KwAnd, KwCmp, KwEq,
        KwGe, KwGt, KwLe, KwLt, KwNe, KwOr, KwX, KwXor, LAngle, LtEq, Match, Minus, NotMatch,
        NumEq, NumNe, OpAssign, OrOr, Percent, Pipe, Plus, Question, RAngle, Range, Shl, Shr,
        Slash, SmartMatch, Spaceship, Star, StarStar,
    };
    Some(match kind {
        KwOr | KwXor => (LOW_OR, Assoc::Left),
        KwAnd => (LOW_AND, Assoc::Left),
        Assign | OpAssign => (ASSIGN, Assoc::Right),
        Question => (TERNARY, Assoc::Right),
        Range | Ellipsis => (RANGE, Assoc::None),
        OrOr | DefinedOr => (OR, Assoc::Left),
        AndAnd => (AND, Assoc::Left),
        Pipe | Caret => (BIT_OR, Assoc::Left),
        Amp => (BIT_AND, Assoc::Left),
        NumEq | NumNe | Spaceship | KwEq | KwNe | KwCmp | SmartMatch => (EQUALITY, Assoc::None),
        LAngle | RAngle | LtEq | GtEq | KwLt | KwGt | KwLe | KwGe => (RELATIONAL, Assoc::None),
        Ident if text == "isa" => (ISA, Assoc::None),
        Shl | Shr => (SHIFT, Assoc::Left),
        Plus | Minus | Dot => (ADDITIVE, Assoc::Left),
        Star | Slash | Percent | KwX => (MULTIPLICATIVE, Assoc::Left),
        Match | NotMatch => (BIND, Assoc::Left),
        StarStar => (POW, Assoc::Right),
        _ => return None,
    })
}

/// Binding power for the right operand.
#[inline]
pub(crate) const fn right_operand(prec: Prec, assoc: Assoc) -> Prec {
    match assoc {
        Assoc::Right => prec,
        Assoc::Left | Assoc::None => prec + 1,
    }
}
