//! Grammar productions.
//!
//! Statement-level productions live here; declarations, control flow,
//! registry scans and expressions have their own modules.

mod control;
mod decl;
mod expr;
mod symbols;

use perl_ir::{NodeId, NodeKind, TokenKind};
use perl_stack::ensure_sufficient_stack;
use tracing::debug;

use crate::recovery::{STATEMENT_MODIFIERS, STMT_END, TERM_START};
use crate::{ParseErrorKind, Parser};

/// Phase block names.
const PHASES: &[&str] = &["BEGIN", "END", "INIT", "CHECK", "UNITCHECK"];

impl Parser<'_> {
    pub(crate) fn parse_file(&mut self) {
        self.start(NodeKind::File);
        self.statements(false);
        self.flush_bodies();
        let trailing = self.cursor.trailing_bodies();
        if !trailing.is_empty() {
            self.attach_bodies(trailing);
        }
        self.finish();
    }

    /// Statements up to end of file, or up to the closing `}` of a block.
    fn statements(&mut self, in_block: bool) {
        loop {
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::RBrace if in_block => break,
                _ => {}
            }
            let before = self.cursor.position();
            self.statement();
            if self.cursor.position() == before {
                self.recover_unexpected();
            }
        }
    }

    fn statement(&mut self) {
        self.collect_annotations();
        match self.current_kind() {
            TokenKind::Semicolon => {
                self.start(NodeKind::EmptyStmt);
                self.bump();
                self.finish();
            }
            TokenKind::Ellipsis => {
                self.start(NodeKind::EmptyStmt);
                self.bump();
                self.statement_end();
                self.finish();
            }
            TokenKind::LBrace => {
                self.block();
            }
            TokenKind::KwPackage => self.package_decl(),
            TokenKind::KwSub if self.peek_kind(1) == TokenKind::Ident => self.sub_decl(),
            TokenKind::KwUse | TokenKind::KwNo => self.use_stmt(),
            TokenKind::KwIf | TokenKind::KwUnless => self.if_stmt(),
            TokenKind::KwWhile | TokenKind::KwUntil => self.while_stmt(),
            TokenKind::KwFor | TokenKind::KwForeach => self.for_stmt(),
            TokenKind::Ident
                if self.peek_kind(1) == TokenKind::LBrace
                    && PHASES.contains(&self.current_text()) =>
            {
                self.phase_block();
            }
            TokenKind::Ident if self.peek_kind(1) == TokenKind::Colon => self.labeled_statement(),
            kind if TERM_START.contains(kind) => {
                self.expr_statement();
            }
            _ => self.recover_unexpected(),
        }
    }

    /// `EXPR [MODIFIER EXPR];`
    fn expr_statement(&mut self) -> NodeId {
        let first = self.cursor.position();
        self.start(NodeKind::ExprStmt);
        self.expression();
        if self.at(STATEMENT_MODIFIERS) {
            self.start(NodeKind::StatementModifier);
            self.bump();
            self.expression();
            self.finish();
        }
        self.statement_end();
        let id = self.finish();
        self.scan_package_arrays(first, self.cursor.position());
        id
    }

    /// `;`, or nothing before `}` and end of file. Anything else is an error
    /// and is skipped up to the statement boundary.
    fn statement_end(&mut self) {
        match self.current_kind() {
            TokenKind::Semicolon => self.bump(),
            TokenKind::RBrace | TokenKind::Eof => {}
            found => {
                self.error(
                    ParseErrorKind::Expected {
                        expected: TokenKind::Semicolon,
                        found,
                    },
                    self.current_span(),
                );
                self.start(NodeKind::Error);
                self.skip_to_statement_end();
                self.finish();
            }
        }
    }

    /// A token that cannot start a statement: wrap it and everything up to
    /// the next boundary in an `Error` node.
    fn recover_unexpected(&mut self) {
        let found = self.current_kind();
        let span = self.current_span();
        if found == TokenKind::Eof {
            return;
        }
        debug!(?found, %span, "resynchronising");
        self.error(ParseErrorKind::UnexpectedToken { found }, span);
        self.start(NodeKind::Error);
        self.bump();
        self.skip_to_statement_end();
        self.finish();
    }

    /// Consume tokens up to a `;` (eaten), `}` or end of file at brace depth 0.
    fn skip_to_statement_end(&mut self) {
        let mut depth = 0u32;
        loop {
            let kind = self.current_kind();
            if depth == 0 && STMT_END.contains(kind) {
                self.eat(TokenKind::Semicolon);
                return;
            }
            match kind {
                TokenKind::Eof => return,
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
    }

    /// `{ STATEMENTS }`. Pragmas and package switches inside end with it.
    pub(crate) fn block(&mut self) -> NodeId {
        self.start(NodeKind::Block);
        let saved = self.builder.current_context_id();
        let open = self.current_span();
        self.bump();
        ensure_sufficient_stack(|| self.statements(true));
        if !self.eat(TokenKind::RBrace) {
            self.error(
                ParseErrorKind::UnclosedDelimiter {
                    open: TokenKind::LBrace,
                },
                open,
            );
        }
        self.builder.restore_context(saved);
        self.finish()
    }

    /// A block where one is required.
    pub(crate) fn expect_block(&mut self) -> Option<NodeId> {
        if self.check(TokenKind::LBrace) {
            Some(self.block())
        } else {
            self.expect(TokenKind::LBrace);
            None
        }
    }

    /// `BEGIN { ... }` and the other phase blocks.
    fn phase_block(&mut self) {
        self.start(NodeKind::PhaseBlock);
        let name = self.intern(self.current_text());
        self.set_name(name);
        self.bump();
        self.block();
        self.finish();
    }

    /// `LABEL: STATEMENT`. The label node comes first, then the statement.
    fn labeled_statement(&mut self) {
        self.start(NodeKind::Label);
        let name = self.intern(self.current_text());
        self.set_name(name);
        self.bump();
        self.bump();
        self.finish();
        if !matches!(self.current_kind(), TokenKind::RBrace | TokenKind::Eof) {
            self.statement();
        }
    }
}
