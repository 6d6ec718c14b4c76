//! Subscripts, arrows, method calls and postfix `++`/`--`.

use perl_ir::{Checkpoint, NodeKind, Span, TokenFlags, TokenKind};

use crate::{ParseErrorKind, Parser};

/// Node kinds after which a bare subscript implies an arrow:
/// `$a[0][1]` is `$a[0]->[1]`.
const fn subscripted(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::ArrayElement
            | NodeKind::HashElement
            | NodeKind::DerefArrayElement
            | NodeKind::DerefHashElement
    )
}

impl Parser<'_> {
    /// Extend the term started at `checkpoint`, whose outermost node is
    /// `last`.
    pub(super) fn postfix(&mut self, checkpoint: Checkpoint, mut last: NodeKind) {
        loop {
            last = match self.current_kind() {
                TokenKind::Arrow => match self.arrow(checkpoint) {
                    Some(kind) => kind,
                    None => return,
                },
                TokenKind::LBracket if subscripted(last) => {
                    self.start_at(checkpoint, NodeKind::DerefArrayElement);
                    self.array_subscript();
                    self.finish();
                    NodeKind::DerefArrayElement
                }
                TokenKind::LBrace if subscripted(last) => {
                    self.start_at(checkpoint, NodeKind::DerefHashElement);
                    self.hash_subscript();
                    self.finish();
                    NodeKind::DerefHashElement
                }
                TokenKind::LParen if subscripted(last) => {
                    // `$h->{cb}(...)`
                    self.start_at(checkpoint, NodeKind::CodeCall);
                    self.paren_args();
                    self.finish();
                    NodeKind::CodeCall
                }
                TokenKind::LBracket if matches!(last, NodeKind::ParenList | NodeKind::QwList) => {
                    // List slice: `(stat $f)[7]`, `qw(a b c)[1]`.
                    self.start_at(checkpoint, NodeKind::ArraySlice);
                    self.array_subscript();
                    self.finish();
                    NodeKind::ArraySlice
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus
                    if !self.cursor.current().flags.contains(TokenFlags::NEWLINE_BEFORE) =>
                {
                    self.start_at(checkpoint, NodeKind::PostfixExpr);
                    self.bump();
                    self.finish();
                    return;
                }
                _ => return,
            };
        }
    }

    /// `->[..]`, `->{..}`, `->(..)`, `->method(..)`, `->$method(..)`.
    fn arrow(&mut self, checkpoint: Checkpoint) -> Option<NodeKind> {
        let kind = match self.peek_kind(1) {
            TokenKind::LBracket => {
                self.start_at(checkpoint, NodeKind::DerefArrayElement);
                self.bump();
                self.array_subscript();
                NodeKind::DerefArrayElement
            }
            TokenKind::LBrace => {
                self.start_at(checkpoint, NodeKind::DerefHashElement);
                self.bump();
                self.hash_subscript();
                NodeKind::DerefHashElement
            }
            TokenKind::LParen => {
                self.start_at(checkpoint, NodeKind::CodeCall);
                self.bump();
                self.paren_args();
                NodeKind::CodeCall
            }
            TokenKind::Ident => {
                self.start_at(checkpoint, NodeKind::MethodCall);
                self.bump();
                let name = self.intern(self.current_text());
                self.set_name(name);
                self.bump();
                if self.check(TokenKind::LParen) {
                    self.paren_args();
                }
                NodeKind::MethodCall
            }
            TokenKind::ScalarVar => {
                self.start_at(checkpoint, NodeKind::MethodCall);
                self.bump();
                self.var();
                if self.check(TokenKind::LParen) {
                    self.paren_args();
                }
                NodeKind::MethodCall
            }
            found => {
                self.start_at(checkpoint, NodeKind::Error);
                self.bump();
                self.error(
                    ParseErrorKind::ExpectedName {
                        what: "method",
                        found,
                    },
                    self.current_span(),
                );
                self.finish();
                return None;
            }
        };
        self.finish();
        Some(kind)
    }

    /// `[ EXPR ]` at the current token.
    pub(super) fn array_subscript(&mut self) {
        let open = self.current_span();
        self.bump();
        if !self.check(TokenKind::RBracket) {
            self.expression();
        }
        self.close(TokenKind::RBracket, TokenKind::LBracket, open);
    }

    /// `{ KEY }` at the current token. A lone word, or `-word`, is a
    /// string key.
    pub(super) fn hash_subscript(&mut self) {
        let open = self.current_span();
        self.bump();
        match (self.current_kind(), self.peek_kind(1), self.peek_kind(2)) {
            (TokenKind::Ident, TokenKind::RBrace, _) => {
                self.bareword();
            }
            (TokenKind::Minus, TokenKind::Ident, TokenKind::RBrace) => {
                self.start(NodeKind::UnaryExpr);
                self.bump();
                self.bareword();
                self.finish();
            }
            (TokenKind::RBrace, ..) => {}
            _ => self.expression(),
        }
        self.close(TokenKind::RBrace, TokenKind::LBrace, open);
    }

    /// `( ARGS )` wrapped in an `Args` node.
    pub(super) fn paren_args(&mut self) {
        self.start(NodeKind::Args);
        let open = self.current_span();
        self.bump();
        if !self.check(TokenKind::RParen) {
            self.expression();
        }
        self.close(TokenKind::RParen, TokenKind::LParen, open);
        self.finish();
    }

    /// Consume the closing delimiter `close`, or report `open` (at
    /// `open_span`) as unclosed.
    pub(crate) fn close(&mut self, close: TokenKind, open: TokenKind, open_span: Span) {
        if !self.eat(close) {
            self.error(ParseErrorKind::UnclosedDelimiter { open }, open_span);
        }
    }

    /// A bareword node for the current identifier.
    pub(crate) fn bareword(&mut self) -> NodeKind {
        self.start(NodeKind::Bareword);
        let name = self.intern(self.current_text());
        self.set_name(name);
        self.bump();
        self.finish();
        NodeKind::Bareword
    }
}
