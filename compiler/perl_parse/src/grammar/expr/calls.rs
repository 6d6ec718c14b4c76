//! Bareword disambiguation: is a word a call, a class name, a hash key or a
//! filehandle? Settled by the word itself and the token after it.

use perl_ir::{NodeKind, TokenFlags, TokenKind};

use super::operators::NAMED_UNARY;
use crate::recovery::LIST_ARG_START;
use crate::Parser;

/// Functions whose first argument may be a block (`map { ... } @list`).
const BLOCK_LIST_OPS: &[&str] = &[
    "map", "grep", "sort", "first", "any", "all", "none", "notall", "reduce", "reductions",
    "first_index", "firstidx", "last_index", "pairmap", "pairgrep", "sum_by", "max_by", "min_by",
    "sort_by", "nsort_by", "uniq_by", "try", "catch", "finally", "defer",
];

/// Builtins that never take arguments.
const NULLARY: &[&str] = &[
    "time", "times", "wait", "wantarray", "fork", "getppid", "__FILE__", "__LINE__", "__SUB__",
];

/// Builtins parsed with named-unary precedence: one optional operand.
const NAMED_UNARY_OPS: &[&str] = &[
    "defined", "ref", "scalar", "lc", "uc", "lcfirst", "ucfirst", "fc", "length", "exists",
    "delete", "each", "keys", "values", "shift", "pop", "chomp", "chop", "chr", "ord", "hex",
    "oct", "abs", "int", "sqrt", "log", "exp", "sin", "cos", "rand", "srand", "quotemeta",
    "readline", "chdir", "rmdir", "readlink", "undef", "exit", "umask", "sleep", "lock", "caller",
    "lstat", "stat", "uc", "alarm", "localtime", "gmtime",
];

/// Output functions that accept a leading filehandle.
const PRINT_OPS: &[&str] = &["print", "printf", "say"];

/// `STDERR`, `FH`, `OUT_FILE`.
fn is_handle_word(text: &str) -> bool {
    text.bytes().next().is_some_and(|b| b.is_ascii_uppercase())
        && text
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// `Foo`, `Foo::Bar`, `Foo::`: the last segment starts with a capital.
fn is_class_word(text: &str) -> bool {
    let trimmed = text.trim_end_matches("::");
    let last = trimmed.rsplit("::").next().unwrap_or(trimmed);
    last.bytes().next().is_some_and(|b| b.is_ascii_uppercase())
}

impl Parser<'_> {
    /// A word in term position.
    pub(super) fn ident(&mut self) -> NodeKind {
        let text = self.current_text();
        let next = *self.peek(1);
        let attached = !self
            .cursor
            .current()
            .flags
            .intersects(TokenFlags::SPACE_BEFORE | TokenFlags::NEWLINE_BEFORE);

        // `-bareword` and `key => ...`
        if next.kind == TokenKind::FatComma
            || (attached && self.cursor.previous_kind() == TokenKind::Minus)
        {
            return self.bareword();
        }
        match next.kind {
            TokenKind::Arrow if matches!(text, "shift" | "pop") => return self.call_without_args(),
            TokenKind::Arrow => return self.bareword(),
            TokenKind::LParen if matches!(text, "catch") => return self.block_list_call(),
            TokenKind::LParen => {
                self.start(NodeKind::Call);
                let name = self.intern(text);
                self.set_name(name);
                self.bump();
                self.paren_args();
                self.finish();
                return NodeKind::Call;
            }
            _ => {}
        }
        if text == "new" && next.kind == TokenKind::Ident && is_class_word(self.peek_text(1)) {
            return self.indirect_new();
        }
        if next.kind == TokenKind::LBrace && BLOCK_LIST_OPS.contains(&text) {
            return self.block_list_call();
        }
        if PRINT_OPS.contains(&text) && self.filehandle_follows() {
            return self.print_with_handle();
        }
        let name = self.intern(text);
        if NULLARY.contains(&text) || self.constants.contains(&name) {
            return self.call_without_args();
        }
        if NAMED_UNARY_OPS.contains(&text) {
            self.start(NodeKind::Call);
            self.set_name(name);
            self.bump();
            if self.at(LIST_ARG_START) && !self.check(TokenKind::LBrace) {
                self.start(NodeKind::Args);
                self.expr_bp(NAMED_UNARY + 1);
                self.finish();
            }
            self.finish();
            return NodeKind::Call;
        }
        if is_class_word(text) && !LIST_ARG_START.contains(next.kind) {
            return self.bareword();
        }
        if LIST_ARG_START.contains(next.kind) {
            self.start(NodeKind::Call);
            self.set_name(name);
            self.bump();
            self.start(NodeKind::Args);
            self.list_args();
            self.finish();
            self.finish();
            return NodeKind::Call;
        }
        self.call_without_args()
    }

    fn call_without_args(&mut self) -> NodeKind {
        self.start(NodeKind::Call);
        let name = self.intern(self.current_text());
        self.set_name(name);
        self.bump();
        self.finish();
        NodeKind::Call
    }

    /// `new Foo(...)`: a method call with the class first.
    fn indirect_new(&mut self) -> NodeKind {
        self.start(NodeKind::MethodCall);
        let name = self.intern(self.current_text());
        self.set_name(name);
        self.bump();
        self.bareword();
        if self.check(TokenKind::LParen) {
            self.paren_args();
        }
        self.finish();
        NodeKind::MethodCall
    }

    /// `map { ... } LIST`, `try { ... } catch ($e) { ... }`.
    fn block_list_call(&mut self) -> NodeKind {
        self.start(NodeKind::Call);
        let name = self.intern(self.current_text());
        self.set_name(name);
        self.bump();
        self.start(NodeKind::Args);
        if self.check(TokenKind::LParen) {
            self.paren_args();
        }
        if self.check(TokenKind::LBrace) {
            self.block();
        }
        self.eat(TokenKind::Comma);
        if self.starts_term() {
            self.list_args();
        }
        self.finish();
        self.finish();
        NodeKind::Call
    }

    /// Whether the token after `print` is a filehandle: `{$fh}`, `STDERR`
    /// or `$fh` followed by the first list item.
    fn filehandle_follows(&self) -> bool {
        let after = self.peek(2);
        match self.peek_kind(1) {
            TokenKind::LBrace => true,
            TokenKind::Ident => {
                is_handle_word(self.peek_text(1))
                    && !matches!(
                        after.kind,
                        TokenKind::Comma
                            | TokenKind::LParen
                            | TokenKind::Arrow
                            | TokenKind::FatComma
                    )
            }
            TokenKind::ScalarVar => {
                LIST_ARG_START.contains(after.kind)
                    && !matches!(after.kind, TokenKind::LBracket | TokenKind::LBrace)
                    && after.flags.contains(TokenFlags::SPACE_BEFORE)
            }
            _ => false,
        }
    }

    fn print_with_handle(&mut self) -> NodeKind {
        self.start(NodeKind::Call);
        let name = self.intern(self.current_text());
        self.set_name(name);
        self.bump();
        self.start(NodeKind::Args);
        match self.current_kind() {
            TokenKind::LBrace => {
                self.block();
            }
            TokenKind::Ident => {
                self.bareword();
            }
            _ => {
                self.var();
            }
        }
        if self.starts_term() {
            self.list_args();
        }
        self.finish();
        self.finish();
        NodeKind::Call
    }
}
