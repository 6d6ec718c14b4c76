//! Error-recovering parser for Perl.
//!
//! Consumes the significant tokens of a [`LexOutput`] and produces a
//! [`SyntaxTree`] together with the file's [`Registry`].
//!
//! # Design
//!
//! - **Never aborts**: a token that cannot continue the current construct
//!   is wrapped in an `Error` node and parsing resumes at the next statement
//!   boundary (`;`, `}` or end of file)
//! - **Lexical contexts**: `package`, `use`/`no` pragmas and blocks push
//!   [`ScopeContext`]s on the tree builder, so every node records the
//!   package and features in effect where it starts
//! - **One-token heuristics**: the bareword-vs-call question and the other
//!   Perl ambiguities are settled by looking at the next token, never by
//!   backtracking
//! - **Registry as a side product**: packages, subs, parents, exports and
//!   `use` statements are registered while their statements are parsed

mod cursor;
mod error;
mod grammar;
mod recovery;

use std::ops::Range;

pub use cursor::Cursor;
pub use error::{ParseError, ParseErrorKind};
pub use recovery::TokenSet;

use perl_ir::{
    Checkpoint, FeatureTable, Name, NodeId, NodeKind, ScopeContext, Span, StringInterner,
    SyntaxTree, Token, TokenKind, TreeBuilder,
};
use perl_lexer::{Annotation, AnnotationKind, LexOutput};
use perl_types::{Registry, RegistryBuilder, Value};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Parser input options.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct ParseOptions {
    /// Pragmas in effect at the top of the file.
    pub features: FeatureTable,
}

/// Everything a parse produces.
#[derive(Clone, Debug)]
pub struct ParseOutput {
    pub tree: SyntaxTree,
    pub registry: Registry,
    pub errors: Vec<ParseError>,
    /// Trivia passed through from the lexer.
    pub trivia: Vec<Token>,
    /// `#@type` annotations, keyed by the `VarDecl` they precede.
    pub declared_types: Vec<(NodeId, Value)>,
}

impl ParseOutput {
    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Declared type of a `VarDecl` node.
    pub fn declared_type(&self, decl: NodeId) -> Option<&Value> {
        self.declared_types
            .iter()
            .find(|(id, _)| *id == decl)
            .map(|(_, v)| v)
    }
}

/// Parse one file.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = lex.tokens.len()))]
pub fn parse(
    lex: &LexOutput,
    source: &str,
    interner: &StringInterner,
    options: ParseOptions,
) -> ParseOutput {
    let mut parser = Parser::new(lex, source, interner, options);
    parser.parse_file();
    let Parser {
        builder,
        registry,
        errors,
        declared_types,
        ..
    } = parser;
    let tree = builder.finish(lex.tokens.clone());
    debug!(nodes = tree.len(), errors = errors.len(), "parsed");
    ParseOutput {
        tree,
        registry: registry.finish(),
        errors,
        trivia: lex.trivia.clone(),
        declared_types,
    }
}

/// Parser state for one file.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    source: &'a str,
    interner: &'a StringInterner,
    builder: TreeBuilder,
    registry: RegistryBuilder,
    errors: Vec<ParseError>,
    annotations: &'a [Annotation],
    next_annotation: usize,
    /// Annotations written right before the statement being parsed.
    pending_annotations: Vec<Annotation>,
    /// Heredoc body tokens stepped over and not yet attached.
    pending_bodies: Vec<Range<u32>>,
    /// `use constant` names; bare uses of these take no arguments.
    constants: FxHashSet<Name>,
    declared_types: Vec<(NodeId, Value)>,
}

impl<'a> Parser<'a> {
    fn new(
        lex: &'a LexOutput,
        source: &'a str,
        interner: &'a StringInterner,
        options: ParseOptions,
    ) -> Self {
        let mut registry = RegistryBuilder::new(interner);
        let main = registry.main();
        registry.set_features(main, options.features);
        Parser {
            cursor: Cursor::new(&lex.tokens),
            source,
            interner,
            builder: TreeBuilder::new(ScopeContext {
                package: main,
                features: options.features,
            }),
            registry,
            errors: Vec::new(),
            annotations: &lex.annotations,
            next_annotation: 0,
            pending_annotations: Vec::new(),
            pending_bodies: Vec::new(),
            constants: FxHashSet::default(),
            declared_types: Vec::new(),
        }
    }

    // === Token access ===

    #[inline]
    fn current_kind(&self) -> TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    fn current_text(&self) -> &'a str {
        self.cursor.current().span.text(self.source)
    }

    #[inline]
    fn peek_kind(&self, n: usize) -> TokenKind {
        self.cursor.peek_kind(n)
    }

    #[inline]
    fn peek(&self, n: usize) -> &'a Token {
        self.cursor.peek(n)
    }

    #[inline]
    fn peek_text(&self, n: usize) -> &'a str {
        self.cursor.peek(n).span.text(self.source)
    }

    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    fn at(&self, set: TokenSet) -> bool {
        set.contains(self.current_kind())
    }

    #[inline]
    fn intern(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    // === Tree building ===

    /// Open a node. Pending heredoc bodies are attached first so that
    /// children stay in source order.
    fn start(&mut self, kind: NodeKind) {
        self.flush_bodies();
        self.builder.start_node(kind);
    }

    #[inline]
    fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    #[inline]
    fn start_at(&mut self, checkpoint: Checkpoint, kind: NodeKind) {
        self.builder.start_node_at(checkpoint, kind);
    }

    #[inline]
    fn finish(&mut self) -> NodeId {
        self.builder.finish_node()
    }

    #[inline]
    fn set_name(&mut self, name: Name) {
        self.builder.set_name(name);
    }

    /// Attach the current token to the open node and step past it.
    fn bump(&mut self) {
        if self.cursor.is_at_end() {
            return;
        }
        self.flush_bodies();
        let index = self.cursor.current_index();
        self.builder.token(index, self.current_span());
        let bodies = self.cursor.advance();
        if !bodies.is_empty() {
            self.pending_bodies.push(bodies);
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or record an error without consuming anything.
    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(
            ParseErrorKind::Expected {
                expected: kind,
                found: self.current_kind(),
            },
            self.current_span(),
        );
        false
    }

    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        debug!(?kind, %span, "parse error");
        self.errors.push(ParseError::new(kind, span));
    }

    // === Context ===

    #[inline]
    fn package(&self) -> Name {
        self.builder.current_context().package
    }

    #[inline]
    fn features(&self) -> FeatureTable {
        self.builder.current_context().features
    }

    /// Make `package` current for the rest of the enclosing scope.
    fn enter_package(&mut self, package: Name) {
        let features = self.features();
        self.builder.push_context(ScopeContext { package, features });
        self.registry.set_features(package, features);
    }

    /// Replace the features for the rest of the enclosing scope.
    fn update_features(&mut self, features: FeatureTable) {
        let package = self.package();
        self.builder.push_context(ScopeContext { package, features });
        self.registry.set_features(package, features);
    }

    // === Heredoc bodies ===

    fn flush_bodies(&mut self) {
        if self.pending_bodies.is_empty() {
            return;
        }
        let ranges = std::mem::take(&mut self.pending_bodies);
        for range in ranges {
            self.attach_bodies(range);
        }
    }

    /// Wrap body tokens in `HeredocBody` nodes, one per terminator.
    fn attach_bodies(&mut self, range: Range<u32>) {
        let tokens = self.cursor.tokens();
        let mut open = false;
        for index in range {
            let token = tokens[index as usize];
            if !open {
                self.builder.start_node(NodeKind::HeredocBody);
                open = true;
            }
            match token.kind {
                TokenKind::HeredocTerminator => {
                    self.builder.token(index, token.span);
                    self.builder.finish_node();
                    open = false;
                }
                TokenKind::UnterminatedHeredoc => {
                    self.builder.token(index, token.span);
                    self.builder.finish_node();
                    open = false;
                    self.error(ParseErrorKind::UnterminatedHeredoc, token.span);
                }
                kind if kind.is_variable() => {
                    self.interpolated_var(index, token);
                }
                _ => self.builder.token(index, token.span),
            }
        }
        if open {
            self.builder.finish_node();
        }
    }

    /// A variable token inside a string or heredoc body, as a variable node.
    fn interpolated_var(&mut self, index: u32, token: Token) {
        let kind = var_node_kind(token.kind);
        self.builder.start_node(kind);
        let name = self.intern(var_name(token.span.text(self.source)));
        self.builder.set_name(name);
        self.builder.token(index, token.span);
        self.builder.finish_node();
    }

    // === Annotations ===

    /// Collect the annotation comments between the previous token and the
    /// current one.
    fn collect_annotations(&mut self) {
        self.pending_annotations.clear();
        let start = self.cursor.previous_span().end;
        let end = self.current_span().start;
        while let Some(annotation) = self.annotations.get(self.next_annotation) {
            if annotation.span.start >= end {
                break;
            }
            if annotation.span.start >= start {
                self.pending_annotations.push(*annotation);
            }
            self.next_annotation += 1;
        }
    }

    fn take_annotation(&mut self, kind: AnnotationKind) -> Option<Annotation> {
        let pos = self.pending_annotations.iter().position(|a| a.kind == kind)?;
        Some(self.pending_annotations.remove(pos))
    }
}

/// Variable node kind for a variable token.
pub(crate) const fn var_node_kind(kind: TokenKind) -> NodeKind {
    match kind {
        TokenKind::ArrayVar => NodeKind::ArrayVar,
        TokenKind::HashVar => NodeKind::HashVar,
        TokenKind::CodeVar => NodeKind::CodeVar,
        TokenKind::GlobVar => NodeKind::GlobVar,
        TokenKind::ArrayLastIndex => NodeKind::ArrayLastIndex,
        _ => NodeKind::ScalarVar,
    }
}

/// Variable name without sigil or braces: `${ foo }` is `foo`, `$#a` is `a`,
/// `$::x` is `x`.
pub fn var_name(text: &str) -> &str {
    let rest = text.strip_prefix("$#").unwrap_or(text);
    let rest = rest
        .strip_prefix(['$', '@', '%', '&', '*'])
        .unwrap_or(rest);
    let rest = rest
        .strip_prefix('{')
        .and_then(|r| r.strip_suffix('}'))
        .map_or(rest, str::trim);
    match rest.strip_prefix("::") {
        Some(unqualified) if !unqualified.is_empty() => unqualified,
        _ => rest,
    }
}

#[cfg(test)]
mod tests;
