//! `package`, `sub` and `use`/`no` declarations, and the registry entries
//! they produce.

use perl_ir::{NodeKind, PerlVersion, TokenFlags, TokenKind};
use perl_lexer::{Annotation, AnnotationKind};
use perl_types::{SubEntry, SubFlags, UseEntry, UseKind, Value};

use crate::recovery::STMT_END;
use crate::{var_name, ParseErrorKind, Parser};

/// First-parameter names that mark a sub as a method.
const SELF_NAMES: &[&str] = &["self", "class", "this"];

/// What the parts of a sub after its name revealed.
#[derive(Copy, Clone, Default, Debug)]
pub(crate) struct SubTail {
    /// First signature parameter or first `my` in the body is `$self`.
    pub self_param: bool,
    /// `:method` attribute.
    pub method_attr: bool,
    pub has_body: bool,
}

fn annotation_flags(annotations: &[Annotation]) -> SubFlags {
    annotations
        .iter()
        .fold(SubFlags::empty(), |flags, a| match a.kind {
            AnnotationKind::Method => flags | SubFlags::METHOD,
            AnnotationKind::Override => flags | SubFlags::OVERRIDE,
            AnnotationKind::Abstract => flags | SubFlags::ABSTRACT,
            AnnotationKind::Deprecated => flags | SubFlags::DEPRECATED,
            _ => flags,
        })
}

impl Parser<'_> {
    /// `package NAME [VERSION];` or `package NAME [VERSION] BLOCK`.
    pub(super) fn package_decl(&mut self) {
        self.start(NodeKind::PackageDecl);
        let keyword = self.current_span();
        self.bump();
        if !self.check(TokenKind::Ident) {
            self.error(
                ParseErrorKind::ExpectedName {
                    what: "package name",
                    found: self.current_kind(),
                },
                self.current_span(),
            );
            self.skip_to_statement_end();
            self.finish();
            return;
        }
        let name = self.intern(self.current_text());
        self.set_name(name);
        let span = keyword.merge(self.current_span());
        self.bump();
        let version = match self.current_kind() {
            TokenKind::VString | TokenKind::Number => {
                let version = PerlVersion::parse(self.current_text());
                self.bump();
                version
            }
            _ => None,
        };
        self.registry.register_package(name, span, version);
        if self.check(TokenKind::LBrace) {
            let saved = self.builder.current_context_id();
            self.enter_package(name);
            self.block();
            self.builder.restore_context(saved);
        } else {
            self.statement_end();
            self.enter_package(name);
        }
        self.finish();
    }

    /// `sub NAME ...`, registered in the current package unless the name is
    /// qualified.
    pub(super) fn sub_decl(&mut self) {
        let annotations = std::mem::take(&mut self.pending_annotations);
        self.start(NodeKind::SubDecl);
        self.bump();
        let text = self.current_text();
        let span = self.current_span();
        let (package, short) = match text.rsplit_once("::") {
            Some(("", short)) => (self.registry.main(), short),
            Some((package, short)) => (self.intern(package), short),
            None => (self.package(), text),
        };
        let name = self.intern(short);
        self.set_name(name);
        self.bump();
        let tail = self.sub_tail(false);
        if !tail.has_body {
            self.statement_end();
        }
        let node = self.finish();

        let mut flags = annotation_flags(&annotations);
        if tail.self_param || tail.method_attr {
            flags |= SubFlags::METHOD;
        }
        if !tail.has_body {
            flags |= SubFlags::FORWARD;
        }
        let returns = annotations
            .iter()
            .find(|a| a.kind == AnnotationKind::Returns)
            .and_then(|a| Value::from_annotation(a.argument_text(self.source)));
        self.registry.register_sub(SubEntry {
            name,
            package,
            span,
            node,
            returns,
            flags,
        });
    }

    /// Signature or prototype, attributes and body.
    pub(crate) fn sub_tail(&mut self, require_body: bool) -> SubTail {
        let mut tail = SubTail::default();
        if self.check(TokenKind::LParen) {
            tail.self_param |= self.signature();
        }
        tail.method_attr = self.attributes();
        if self.check(TokenKind::LParen) {
            tail.self_param |= self.signature();
        }
        if self.check(TokenKind::LBrace) {
            tail.self_param |= self.body_starts_with_self();
            self.block();
            tail.has_body = true;
        } else if require_body {
            self.expect(TokenKind::LBrace);
        }
        tail
    }

    /// `( ... )` after the sub name. Returns whether the first parameter is
    /// `$self` or one of its synonyms.
    fn signature(&mut self) -> bool {
        self.start(NodeKind::Signature);
        let open = self.current_span();
        self.bump();
        let first_is_self =
            self.check(TokenKind::ScalarVar) && SELF_NAMES.contains(&var_name(self.current_text()));
        if self.check(TokenKind::StringContent) {
            // prototype
            self.bump();
        } else if !self.check(TokenKind::RParen) {
            self.expression();
        }
        self.close(TokenKind::RParen, TokenKind::LParen, open);
        self.finish();
        first_is_self
    }

    /// `:lvalue :method :prototype($)`. Returns whether `:method` was seen.
    fn attributes(&mut self) -> bool {
        let mut method = false;
        while self.check(TokenKind::Colon) && self.peek_kind(1) == TokenKind::Ident {
            self.bump();
            method |= self.current_text() == "method";
            self.bump();
            let attached = !self
                .cursor
                .current()
                .flags
                .intersects(TokenFlags::SPACE_BEFORE | TokenFlags::NEWLINE_BEFORE);
            if attached && self.check(TokenKind::LParen) {
                self.skip_parenthesised();
            }
        }
        method
    }

    /// Consume a balanced `( ... )` without parsing it.
    fn skip_parenthesised(&mut self) {
        let mut depth = 0u32;
        loop {
            match self.current_kind() {
                TokenKind::Eof => return,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return;
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// `{ my $self ...` or `{ my ($self, ...`.
    fn body_starts_with_self(&self) -> bool {
        if self.peek_kind(1) != TokenKind::KwMy {
            return false;
        }
        let var = match self.peek_kind(2) {
            TokenKind::ScalarVar => 2,
            TokenKind::LParen if self.peek_kind(3) == TokenKind::ScalarVar => 3,
            _ => return false,
        };
        SELF_NAMES.contains(&var_name(self.peek_text(var)))
    }

    /// `use VERSION`, `use MODULE [VERSION] [LIST]` and the `no` forms.
    pub(super) fn use_stmt(&mut self) {
        let is_use = self.check(TokenKind::KwUse);
        self.start(if is_use {
            NodeKind::UseStmt
        } else {
            NodeKind::NoStmt
        });
        let keyword = self.current_span();
        self.bump();
        match self.current_kind() {
            TokenKind::VString | TokenKind::Number => {
                let version = PerlVersion::parse(self.current_text());
                self.bump();
                self.statement_end();
                self.finish();
                if let (true, Some(version)) = (is_use, version) {
                    let features = self.features().with_version(version);
                    self.update_features(features);
                }
                return;
            }
            TokenKind::Ident => {}
            found => {
                self.error(
                    ParseErrorKind::ExpectedName {
                        what: "module name",
                        found,
                    },
                    self.current_span(),
                );
                self.skip_to_statement_end();
                self.finish();
                return;
            }
        }
        let module_text = self.current_text();
        let module = self.intern(module_text);
        self.set_name(module);
        self.bump();
        if matches!(self.current_kind(), TokenKind::VString | TokenKind::Number)
            && !matches!(self.peek_kind(1), TokenKind::Comma | TokenKind::FatComma)
        {
            self.bump();
        }
        let list_start = self.cursor.position();
        let has_list = !self.at(STMT_END);
        if has_list {
            self.expression();
        }
        let list_end = self.cursor.position();
        let span = keyword.merge(self.cursor.previous_span());
        self.statement_end();
        let node = self.finish();

        let words = has_list.then(|| self.import_words(list_start, list_end));
        let word_refs: Vec<&str> = words.iter().flatten().map(String::as_str).collect();
        let features = self.features().with_pragma(module_text, &word_refs, is_use);
        if features != self.features() {
            self.update_features(features);
        }
        let package = self.package();
        if is_use {
            match module_text {
                "parent" | "base" => {
                    let parents: Vec<_> = word_refs
                        .iter()
                        .filter(|w| !w.starts_with('-'))
                        .map(|w| self.intern(w))
                        .collect();
                    self.registry.add_parents(package, &parents);
                }
                "constant" => {
                    for (name, span) in self.constant_names(list_start, list_end) {
                        let name = self.intern(name);
                        self.constants.insert(name);
                        self.registry.register_sub(SubEntry {
                            name,
                            package,
                            span,
                            node,
                            returns: None,
                            flags: SubFlags::CONSTANT,
                        });
                    }
                }
                _ => {}
            }
        }
        let imports = words.map(|ws| ws.iter().map(|w| self.intern(w)).collect());
        self.registry.register_use(
            package,
            UseEntry {
                module,
                kind: if is_use { UseKind::Use } else { UseKind::No },
                imports,
                span,
            },
        );
    }
}
