//! Expression parsing.
//!
//! A Pratt loop over the table in [`operators`]. Operands are built by
//! [`primary`] and extended with subscripts and method calls by
//! [`postfix`]; [`calls`] decides what a bareword is.
//!
//! Left-recursive shapes (binary operators, subscripts, lists) are built by
//! taking a builder checkpoint before the left operand and opening the
//! wrapping node at it once the operator is seen.

mod calls;
pub(crate) mod operators;
mod postfix;
mod primary;

use perl_ir::{NodeKind, TokenKind};
use perl_stack::ensure_sufficient_stack;

use self::operators::{Prec, ASSIGN, COMMA, INCDEC, LOW_NOT, LOW_OR, NAMED_UNARY, TERNARY, UNARY};
use crate::recovery::TERM_START;
use crate::{ParseErrorKind, Parser};

impl Parser<'_> {
    /// A full expression, including `and`/`or`/`not` and comma lists.
    pub(crate) fn expression(&mut self) {
        self.expr_bp(LOW_OR);
    }

    /// One list item: an assignment expression without a top-level comma.
    pub(crate) fn assign_expr(&mut self) {
        self.expr_bp(ASSIGN);
    }

    /// List-operator arguments: everything up to a low-precedence word
    /// operator or a statement boundary.
    pub(crate) fn list_args(&mut self) {
        self.expr_bp(COMMA);
    }

    /// Whether the current token can start an operand.
    #[inline]
    pub(crate) fn starts_term(&self) -> bool {
        TERM_START.contains(self.current_kind())
    }

    pub(crate) fn expr_bp(&mut self, min: Prec) {
        ensure_sufficient_stack(|| self.expr_bp_inner(min));
    }

    fn expr_bp_inner(&mut self, min: Prec) {
        let checkpoint = self.checkpoint();
        if !self.prefix() {
            return;
        }
        loop {
            let kind = self.current_kind();
            if matches!(kind, TokenKind::Comma | TokenKind::FatComma) {
                if COMMA < min {
                    break;
                }
                self.start_at(checkpoint, NodeKind::ListExpr);
                while matches!(self.current_kind(), TokenKind::Comma | TokenKind::FatComma) {
                    self.bump();
                    if !self.starts_term() {
                        break;
                    }
                    self.assign_expr();
                }
                self.finish();
                continue;
            }
            let Some((prec, assoc)) = operators::infix(kind, self.current_text()) else {
                break;
            };
            if prec < min {
                break;
            }
            match kind {
                TokenKind::Question => {
                    self.start_at(checkpoint, NodeKind::TernaryExpr);
                    self.bump();
                    self.operand(ASSIGN);
                    self.expect(TokenKind::Colon);
                    self.operand(TERNARY);
                }
                TokenKind::Assign | TokenKind::OpAssign => {
                    self.start_at(checkpoint, NodeKind::AssignExpr);
                    self.bump();
                    self.operand(ASSIGN);
                }
                _ => {
                    self.start_at(checkpoint, NodeKind::BinaryExpr);
                    self.bump();
                    self.operand(operators::right_operand(prec, assoc));
                }
            }
            self.finish();
        }
    }

    /// A required operand. Records an error and consumes nothing when the
    /// current token cannot start one.
    pub(crate) fn operand(&mut self, min: Prec) {
        if self.starts_term() {
            self.expr_bp(min);
        } else {
            self.error(
                ParseErrorKind::ExpectedExpression {
                    found: self.current_kind(),
                },
                self.current_span(),
            );
        }
    }

    /// Prefix operators, then a term. Returns `false` when nothing could be
    /// parsed (an error has been recorded).
    fn prefix(&mut self) -> bool {
        match self.current_kind() {
            TokenKind::KwNot => {
                self.start(NodeKind::UnaryExpr);
                self.bump();
                if self.starts_term() {
                    self.expr_bp(LOW_NOT);
                }
                self.finish();
            }
            TokenKind::Bang | TokenKind::Tilde | TokenKind::Minus | TokenKind::Plus => {
                self.start(NodeKind::UnaryExpr);
                self.bump();
                self.operand(UNARY);
                self.finish();
            }
            TokenKind::Backslash => {
                self.start(NodeKind::RefExpr);
                self.bump();
                self.operand(UNARY);
                self.finish();
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                self.start(NodeKind::UnaryExpr);
                self.bump();
                self.operand(INCDEC);
                self.finish();
            }
            TokenKind::FileTest => {
                self.start(NodeKind::UnaryExpr);
                self.bump();
                if self.starts_term() {
                    self.expr_bp(NAMED_UNARY + 1);
                }
                self.finish();
            }
            _ if self.starts_term() => self.term(),
            found => {
                self.error(
                    ParseErrorKind::ExpectedExpression { found },
                    self.current_span(),
                );
                return false;
            }
        }
        true
    }

    /// A primary followed by its subscripts, method calls and postfix
    /// `++`/`--`.
    pub(crate) fn term(&mut self) {
        let checkpoint = self.checkpoint();
        let Some(kind) = self.primary() else {
            return;
        };
        self.postfix(checkpoint, kind);
    }
}
