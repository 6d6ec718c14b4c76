//! Compound statements: `if`/`unless`, `while`/`until`, `for`/`foreach`.

use perl_ir::{NodeKind, TokenKind};

use crate::recovery::DECLARATORS;
use crate::{ParseErrorKind, Parser};

impl Parser<'_> {
    /// `if (COND) BLOCK [elsif (COND) BLOCK]... [else BLOCK]`
    pub(super) fn if_stmt(&mut self) {
        self.start(NodeKind::IfStmt);
        self.bump();
        self.condition();
        self.expect_block();
        loop {
            match self.current_kind() {
                TokenKind::KwElsif => {
                    self.start(NodeKind::ElsifClause);
                    self.bump();
                    self.condition();
                    self.expect_block();
                    self.finish();
                }
                TokenKind::KwElse => {
                    self.start(NodeKind::ElseClause);
                    self.bump();
                    self.expect_block();
                    self.finish();
                    break;
                }
                _ => break,
            }
        }
        self.finish();
    }

    /// `while (COND) BLOCK [continue BLOCK]`
    pub(super) fn while_stmt(&mut self) {
        self.start(NodeKind::WhileStmt);
        self.bump();
        self.condition();
        self.expect_block();
        self.continue_block();
        self.finish();
    }

    fn continue_block(&mut self) {
        if self.check(TokenKind::Ident)
            && self.current_text() == "continue"
            && self.peek_kind(1) == TokenKind::LBrace
        {
            self.bump();
            self.block();
        }
    }

    /// `( EXPR )`. The expression may be empty (`while ()`). Without the
    /// parentheses an error is recorded and a bare expression is parsed.
    fn condition(&mut self) {
        let open = self.current_span();
        if self.eat(TokenKind::LParen) {
            if !self.check(TokenKind::RParen) {
                self.expression();
            }
            self.close(TokenKind::RParen, TokenKind::LParen, open);
        } else {
            self.expect(TokenKind::LParen);
            if self.starts_term() {
                self.expression();
            }
        }
    }

    pub(super) fn for_stmt(&mut self) {
        if self.is_c_style_for() {
            self.c_style_for();
        } else {
            self.foreach_stmt();
        }
    }

    /// A `;` at parenthesis depth 1 after `for (`.
    fn is_c_style_for(&self) -> bool {
        if self.peek_kind(1) != TokenKind::LParen {
            return false;
        }
        let mut depth = 0u32;
        let mut n = 1;
        loop {
            match self.peek_kind(n) {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return false;
                    }
                }
                TokenKind::Semicolon if depth == 1 => return true,
                TokenKind::Eof => return false,
                _ => {}
            }
            n += 1;
        }
    }

    /// `for (INIT; COND; STEP) BLOCK`
    fn c_style_for(&mut self) {
        self.start(NodeKind::ForStmt);
        self.bump();
        let open = self.current_span();
        self.bump();
        for _ in 0..2 {
            if !self.check(TokenKind::Semicolon) {
                self.expression();
            }
            self.expect(TokenKind::Semicolon);
        }
        if !self.check(TokenKind::RParen) {
            self.expression();
        }
        self.close(TokenKind::RParen, TokenKind::LParen, open);
        self.expect_block();
        self.finish();
    }

    /// `foreach [my $var] (LIST) BLOCK`
    fn foreach_stmt(&mut self) {
        self.start(NodeKind::ForeachStmt);
        self.bump();
        match self.current_kind() {
            kind if DECLARATORS.contains(kind) => {
                self.var_decl();
            }
            TokenKind::ScalarVar => {
                self.var();
            }
            _ => {}
        }
        let open = self.current_span();
        if self.eat(TokenKind::LParen) {
            if !self.check(TokenKind::RParen) {
                self.expression();
            }
            self.close(TokenKind::RParen, TokenKind::LParen, open);
        } else {
            self.error(
                ParseErrorKind::Expected {
                    expected: TokenKind::LParen,
                    found: self.current_kind(),
                },
                open,
            );
        }
        self.expect_block();
        self.continue_block();
        self.finish();
    }
}
