//! Primary expressions: variables, literals, quote-likes, brackets and
//! the keyword-introduced terms.

use perl_ir::{NodeKind, TokenFlags, TokenKind};
use perl_lexer::AnnotationKind;
use perl_types::Value;

use super::operators::NAMED_UNARY;
use crate::recovery::DECLARATORS;
use crate::{var_name, var_node_kind, ParseErrorKind, Parser};

/// Node kind for a quote-like, from the text of its `QuoteOpen` token.
fn quote_kind(open: &str) -> NodeKind {
    let word_len = open.bytes().take_while(u8::is_ascii_alphabetic).count();
    match &open[..word_len] {
        "qw" => NodeKind::QwList,
        "m" => NodeKind::RegexMatch,
        "qr" => NodeKind::RegexQr,
        "s" => NodeKind::RegexSubst,
        "tr" | "y" => NodeKind::Transliterate,
        "" if open.starts_with('/') => NodeKind::RegexMatch,
        _ => NodeKind::StringLit,
    }
}

impl Parser<'_> {
    /// Parse one primary. Returns the kind of the node built, or `None`
    /// (after recording an error) when the current token starts none.
    pub(super) fn primary(&mut self) -> Option<NodeKind> {
        let kind = match self.current_kind() {
            TokenKind::ScalarVar => self.scalar_term(),
            TokenKind::ArrayVar | TokenKind::HashVar => self.aggregate_term(),
            TokenKind::CodeVar => self.code_var_term(),
            TokenKind::GlobVar | TokenKind::ArrayLastIndex => self.var(),
            kind if kind.is_cast() => self.cast(),
            TokenKind::Number => self.leaf(NodeKind::NumberLit),
            TokenKind::VString => self.leaf(NodeKind::VersionLit),
            TokenKind::QuoteOpen => self.quote(),
            TokenKind::HeredocOpener => self.leaf(NodeKind::HeredocLit),
            TokenKind::ReadLine => self.leaf(NodeKind::ReadLine),
            TokenKind::LBracket => {
                self.delimited(
                    NodeKind::AnonArray,
                    TokenKind::LBracket,
                    TokenKind::RBracket,
                )
            }
            TokenKind::LBrace => {
                self.delimited(NodeKind::AnonHash, TokenKind::LBrace, TokenKind::RBrace)
            }
            TokenKind::LParen => {
                self.delimited(NodeKind::ParenList, TokenKind::LParen, TokenKind::RParen)
            }
            kind if DECLARATORS.contains(kind) => self.var_decl(),
            TokenKind::KwSub => self.anon_sub(),
            TokenKind::KwDo | TokenKind::KwEval => self.do_or_eval(),
            TokenKind::KwReturn => self.return_expr(),
            TokenKind::KwRequire => self.require_expr(),
            TokenKind::KwLast | TokenKind::KwNext | TokenKind::KwRedo | TokenKind::KwGoto => {
                self.loop_control()
            }
            TokenKind::KwCurrentPackage => {
                self.start(NodeKind::CurrentPackage);
                let package = self.package();
                self.set_name(package);
                self.bump();
                self.finish();
                NodeKind::CurrentPackage
            }
            TokenKind::Ident => self.ident(),
            found => {
                self.error(
                    ParseErrorKind::ExpectedExpression { found },
                    self.current_span(),
                );
                return None;
            }
        };
        Some(kind)
    }

    /// A variable node for the current variable token.
    pub(crate) fn var(&mut self) -> NodeKind {
        let kind = var_node_kind(self.current_kind());
        self.start(kind);
        let name = self.intern(var_name(self.current_text()));
        self.set_name(name);
        self.bump();
        self.finish();
        kind
    }

    fn leaf(&mut self, kind: NodeKind) -> NodeKind {
        self.start(kind);
        self.bump();
        self.finish();
        kind
    }

    /// `$x`, `$a[0]`, `$h{k}`.
    fn scalar_term(&mut self) -> NodeKind {
        let kind = match self.peek_kind(1) {
            TokenKind::LBracket => NodeKind::ArrayElement,
            TokenKind::LBrace => NodeKind::HashElement,
            _ => return self.var(),
        };
        self.start(kind);
        let name = self.intern(var_name(self.current_text()));
        self.set_name(name);
        self.bump();
        if kind == NodeKind::ArrayElement {
            self.array_subscript();
        } else {
            self.hash_subscript();
        }
        self.finish();
        kind
    }

    /// `@a`, `%h`, and the slices `@a[..]`, `@h{..}`, `%h{..}`, `%a[..]`.
    /// A slice subscript must follow the variable without a space.
    fn aggregate_term(&mut self) -> NodeKind {
        let next = self.peek(1);
        let adjacent = !next
            .flags
            .intersects(TokenFlags::SPACE_BEFORE | TokenFlags::NEWLINE_BEFORE);
        let kind = match next.kind {
            TokenKind::LBracket if adjacent => NodeKind::ArraySlice,
            TokenKind::LBrace if adjacent => NodeKind::HashSlice,
            _ => return self.var(),
        };
        self.start(kind);
        let name = self.intern(var_name(self.current_text()));
        self.set_name(name);
        self.bump();
        if kind == NodeKind::ArraySlice {
            self.array_subscript();
        } else {
            self.hash_subscript();
        }
        self.finish();
        kind
    }

    /// `&name(...)` is a call; a bare `&name` stays a variable.
    fn code_var_term(&mut self) -> NodeKind {
        if self.peek_kind(1) != TokenKind::LParen {
            return self.var();
        }
        self.start(NodeKind::CodeCall);
        let name = self.intern(var_name(self.current_text()));
        self.set_name(name);
        self.var();
        self.paren_args();
        self.finish();
        NodeKind::CodeCall
    }

    /// A sigil applied to an expression. `$$r[0]`, `${$r}{k}`, `@$r[1, 2]`
    /// and `&$c(...)` take their subscript into the same node.
    fn cast(&mut self) -> NodeKind {
        let sigil = self.current_kind();
        self.start(NodeKind::Cast);
        self.bump();
        self.cast_operand();
        let wrapped = match (sigil, self.current_kind()) {
            (TokenKind::CastScalar, TokenKind::LBracket) => NodeKind::DerefArrayElement,
            (TokenKind::CastScalar, TokenKind::LBrace) => NodeKind::DerefHashElement,
            (TokenKind::CastArray, TokenKind::LBracket) => NodeKind::ArraySlice,
            (TokenKind::CastArray, TokenKind::LBrace) => NodeKind::HashSlice,
            (TokenKind::CastCode, TokenKind::LParen) => NodeKind::CodeCall,
            _ => {
                self.finish();
                return NodeKind::Cast;
            }
        };
        self.builder.set_kind(wrapped);
        match wrapped {
            NodeKind::DerefArrayElement | NodeKind::ArraySlice => self.array_subscript(),
            NodeKind::CodeCall => self.paren_args(),
            _ => self.hash_subscript(),
        }
        self.finish();
        wrapped
    }

    /// The reference a cast applies to: `$name`, `{ EXPR }` or another cast.
    fn cast_operand(&mut self) {
        match self.current_kind() {
            TokenKind::LBrace => {
                let open = self.current_span();
                self.bump();
                if !self.check(TokenKind::RBrace) {
                    self.expression();
                }
                self.close(TokenKind::RBrace, TokenKind::LBrace, open);
            }
            TokenKind::ScalarVar => {
                self.var();
            }
            kind if kind.is_cast() => {
                self.start(NodeKind::Cast);
                self.bump();
                self.cast_operand();
                self.finish();
            }
            found => {
                self.error(
                    ParseErrorKind::ExpectedExpression { found },
                    self.current_span(),
                );
            }
        }
    }

    /// `[ .. ]`, `{ .. }` or `( .. )` around an optional expression.
    fn delimited(&mut self, kind: NodeKind, open: TokenKind, close: TokenKind) -> NodeKind {
        self.start(kind);
        let open_span = self.current_span();
        self.bump();
        if !self.check(close) {
            self.expression();
        }
        self.close(close, open, open_span);
        self.finish();
        kind
    }

    /// A quote-like: content runs, interpolated variables and `${ .. }`
    /// blocks up to the closing delimiter and modifiers.
    fn quote(&mut self) -> NodeKind {
        let mut kind = quote_kind(self.current_text());
        let open = self.current_span();
        self.start(kind);
        self.bump();
        loop {
            match self.current_kind() {
                TokenKind::QuoteClose => {
                    self.bump();
                    self.eat(TokenKind::QuoteModifiers);
                    break;
                }
                TokenKind::StringContent | TokenKind::QuoteMid => self.bump(),
                k if k.is_variable() => {
                    self.var();
                }
                k if k.is_cast() => {
                    self.cast();
                }
                other => {
                    kind = NodeKind::UnterminatedString;
                    self.builder.set_kind(kind);
                    self.error(
                        ParseErrorKind::UnterminatedString,
                        open.merge(self.cursor.previous_span()),
                    );
                    if other == TokenKind::UnterminatedQuote {
                        self.bump();
                    }
                    break;
                }
            }
        }
        self.finish();
        kind
    }

    /// `my`/`our`/`local`/`state`, an optional class name and the declared
    /// term. A preceding `#@type` annotation or the class name records the
    /// declared type.
    pub(crate) fn var_decl(&mut self) -> NodeKind {
        let mut declared = self
            .take_annotation(AnnotationKind::Type)
            .and_then(|a| Value::from_annotation(a.argument_text(self.source)));
        self.start(NodeKind::VarDecl);
        self.bump();
        if self.check(TokenKind::Ident) && self.peek_kind(1) == TokenKind::ScalarVar {
            if declared.is_none() {
                declared = Some(Value::object(self.current_text()));
            }
            self.bareword();
        }
        if self.starts_term() {
            self.term();
        } else {
            self.error(
                ParseErrorKind::ExpectedExpression {
                    found: self.current_kind(),
                },
                self.current_span(),
            );
        }
        let id = self.finish();
        if let Some(value) = declared {
            self.declared_types.push((id, value));
        }
        NodeKind::VarDecl
    }

    fn anon_sub(&mut self) -> NodeKind {
        self.start(NodeKind::AnonSub);
        self.bump();
        self.sub_tail(true);
        self.finish();
        NodeKind::AnonSub
    }

    /// `do BLOCK` / `eval BLOCK`, otherwise `do FILE` / `eval STRING` calls.
    fn do_or_eval(&mut self) -> NodeKind {
        let is_do = self.check(TokenKind::KwDo);
        if self.peek_kind(1) == TokenKind::LBrace {
            let kind = if is_do {
                NodeKind::DoBlock
            } else {
                NodeKind::EvalBlock
            };
            self.start(kind);
            self.bump();
            self.block();
            self.finish();
            return kind;
        }
        self.start(NodeKind::Call);
        let name = self.intern(self.current_text());
        self.set_name(name);
        self.bump();
        if self.starts_term() {
            self.start(NodeKind::Args);
            self.expr_bp(NAMED_UNARY + 1);
            self.finish();
        }
        self.finish();
        NodeKind::Call
    }

    fn return_expr(&mut self) -> NodeKind {
        self.start(NodeKind::Return);
        self.bump();
        if self.starts_term() {
            self.list_args();
        }
        self.finish();
        NodeKind::Return
    }

    /// `require Foo::Bar`, `require VERSION`, `require EXPR`.
    fn require_expr(&mut self) -> NodeKind {
        self.start(NodeKind::Require);
        self.bump();
        match self.current_kind() {
            TokenKind::Ident => {
                let module = self.intern(self.current_text());
                self.set_name(module);
                self.bareword();
            }
            TokenKind::VString | TokenKind::Number => {
                self.leaf(NodeKind::VersionLit);
            }
            _ if self.starts_term() => self.expr_bp(NAMED_UNARY + 1),
            _ => {}
        }
        self.finish();
        NodeKind::Require
    }

    /// `last`/`next`/`redo` with an optional label, `goto LABEL`/`goto &sub`.
    fn loop_control(&mut self) -> NodeKind {
        let is_goto = self.check(TokenKind::KwGoto);
        self.start(NodeKind::LoopControl);
        self.bump();
        if self.check(TokenKind::Ident)
            && !matches!(self.peek_kind(1), TokenKind::LParen | TokenKind::Arrow)
        {
            let label = self.intern(self.current_text());
            self.set_name(label);
            self.bump();
        } else if is_goto && self.starts_term() {
            self.expr_bp(NAMED_UNARY + 1);
        }
        self.finish();
        NodeKind::LoopControl
    }
}
