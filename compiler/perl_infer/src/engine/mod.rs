//! Node dispatch.
//!
//! [`Engine::infer_value`] guards every visit (cancellation, the visited
//! set, stack growth, depth truncation) and hands the node to
//! `infer_node`, which dispatches on [`NodeKind`] to the submodules:
//!
//! - `constructors`: lists, anonymous containers, subscripts and casts
//! - `operators`: unary, binary, ternary and assignment expressions
//! - `variables`: declarations and the assignments reaching a use
//! - `calls`: builtins, named subs, methods and sub summaries

mod calls;
mod constructors;
mod operators;
mod variables;

use std::sync::OnceLock;

use perl_ir::{Name, NodeId, NodeKind, StringInterner, SyntaxTree};
use perl_parse::ParseOutput;
use perl_stack::ensure_sufficient_stack;
use perl_types::{PackageEntry, PackageLookup, Registry, ScalarKind, SubEntry, Value};
use tracing::trace;

use crate::{Cancellation, InferOptions, SummaryCache, Visited};

use variables::VarIndex;

/// Packages and sub summaries that live outside the file being analysed.
///
/// A workspace implements this to make inference see across files.
pub trait ExternalLookup: Sync {
    /// A package declared in some other file.
    fn package(&self, name: Name) -> Option<&PackageEntry>;

    /// Inferred return value of a sub declared in some other file. `None`
    /// when the declaring file is not available.
    fn sub_returns(&self, sub: &SubEntry, cancel: &Cancellation) -> Option<Value>;
}

/// Package lookup over the local registry, then the external one.
#[derive(Copy, Clone)]
struct Scope<'a> {
    local: &'a Registry,
    external: Option<&'a dyn ExternalLookup>,
}

impl PackageLookup for Scope<'_> {
    fn package(&self, name: Name) -> Option<&PackageEntry> {
        self.local
            .package(name)
            .or_else(|| self.external.and_then(|ext| ext.package(name)))
    }
}

/// Value inference over one parsed file.
///
/// Cheap to build; create one per query or share one between threads.
/// Everything mutable lives in the [`Visited`] set of the query and in the
/// shared [`SummaryCache`].
pub struct Engine<'a> {
    parse: &'a ParseOutput,
    source: &'a str,
    interner: &'a StringInterner,
    cache: &'a SummaryCache,
    scope: Scope<'a>,
    cancel: Cancellation,
    options: InferOptions,
    vars: OnceLock<VarIndex>,
}

impl<'a> Engine<'a> {
    pub fn new(
        parse: &'a ParseOutput,
        source: &'a str,
        interner: &'a StringInterner,
        cache: &'a SummaryCache,
    ) -> Self {
        Engine {
            parse,
            source,
            interner,
            cache,
            scope: Scope {
                local: &parse.registry,
                external: None,
            },
            cancel: Cancellation::new(),
            options: InferOptions::default(),
            vars: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_external(mut self, external: &'a dyn ExternalLookup) -> Self {
        self.scope.external = Some(external);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: InferOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn tree(&self) -> &'a SyntaxTree {
        &self.parse.tree
    }

    #[inline]
    pub fn registry(&self) -> &'a Registry {
        &self.parse.registry
    }

    #[inline]
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancel
    }

    /// Infer `node` on a fresh query.
    pub fn infer(&self, node: NodeId) -> Value {
        self.infer_value(node, &mut Visited::new())
    }

    /// Infer `node` as part of the query that owns `visited`.
    ///
    /// Total: cancelled queries, nodes of another tree version, cycles and
    /// anything not understood all come back as `Unknown`.
    pub fn infer_value(&self, node: NodeId, visited: &mut Visited) -> Value {
        if self.cancel.is_cancelled() || self.tree().get(node).is_none() {
            return Value::Unknown;
        }
        if let Some(value) = visited.finished(node) {
            return value.clone();
        }
        if !visited.enter(node) {
            trace!(?node, "cycle cut");
            return Value::Unknown;
        }
        let value = ensure_sufficient_stack(|| self.infer_node(node, visited))
            .truncated(self.options.max_depth);
        visited.exit(node, &value);
        value
    }

    fn infer_node(&self, node: NodeId, v: &mut Visited) -> Value {
        let tree = self.tree();
        match tree.kind(node) {
            // Literals
            NodeKind::NumberLit => Value::Scalar(ScalarKind::Number),
            NodeKind::VersionLit | NodeKind::Bareword | NodeKind::CurrentPackage => {
                Value::Scalar(ScalarKind::String)
            }
            NodeKind::StringLit
            | NodeKind::UnterminatedString
            | NodeKind::HeredocLit
            | NodeKind::ReadLine => Value::Scalar(ScalarKind::String),
            NodeKind::QwList => Value::array_of(Value::Scalar(ScalarKind::String)),
            NodeKind::RegexMatch | NodeKind::RegexSubst => Value::SCALAR,
            NodeKind::Transliterate => Value::Scalar(ScalarKind::Number),
            NodeKind::RegexQr => Value::SCALAR.blessed_copy("Regexp"),

            // Constructors
            NodeKind::AnonArray => self.anon_array(node, v),
            NodeKind::AnonHash => self.anon_hash(node, v),
            NodeKind::AnonSub => self.anon_sub(node),
            NodeKind::RefExpr => self.first_value(node, v).reference(),
            NodeKind::ParenList | NodeKind::ListExpr => self.list_value(node, v),

            // Variables
            NodeKind::ScalarVar | NodeKind::ArrayVar | NodeKind::HashVar => {
                self.variable(node, v)
            }
            NodeKind::CodeVar => self.code_var(node),
            NodeKind::GlobVar => Value::Glob,
            NodeKind::ArrayLastIndex => Value::Scalar(ScalarKind::Number),
            NodeKind::VarDecl => match tree.child_nodes(node).next_back() {
                Some(target) => self.infer_value(target, v),
                None => Value::Unknown,
            },

            // Subscripts
            NodeKind::ArrayElement => self.array_element(node, v),
            NodeKind::HashElement => self.hash_element(node, v),
            NodeKind::ArraySlice => self.array_slice(node, v),
            NodeKind::HashSlice => self.hash_slice(node, v),
            NodeKind::DerefArrayElement => self.deref_element(node, v),
            NodeKind::DerefHashElement => self.deref_hash_element(node, v),
            NodeKind::Cast => self.cast(node, v),

            // Operators
            NodeKind::BinaryExpr => self.binary(node, v),
            NodeKind::UnaryExpr => self.unary(node, v),
            NodeKind::PostfixExpr => Value::Scalar(ScalarKind::Number),
            NodeKind::TernaryExpr => self.ternary(node, v),
            NodeKind::AssignExpr => self.assignment(node, v),

            // Calls
            NodeKind::Call => self.call(node, v),
            NodeKind::MethodCall => self.method_call(node, v),
            NodeKind::CodeCall => self.first_value(node, v).call_result(),
            NodeKind::SubDecl => self.sub_decl(node),

            NodeKind::Return | NodeKind::ExprStmt => self.first_value(node, v),
            NodeKind::DoBlock => match tree.child_of_kind(node, NodeKind::Block) {
                Some(block) => self.block_value(block, v),
                None => Value::Unknown,
            },
            NodeKind::EvalBlock => match tree.child_of_kind(node, NodeKind::Block) {
                Some(block) => self.block_value(block, v).merge(&Value::Undef),
                None => Value::Undef,
            },
            NodeKind::Require => Value::SCALAR,

            NodeKind::File
            | NodeKind::Error
            | NodeKind::EmptyStmt
            | NodeKind::Block
            | NodeKind::PackageDecl
            | NodeKind::PhaseBlock
            | NodeKind::UseStmt
            | NodeKind::NoStmt
            | NodeKind::IfStmt
            | NodeKind::ElsifClause
            | NodeKind::ElseClause
            | NodeKind::WhileStmt
            | NodeKind::ForStmt
            | NodeKind::ForeachStmt
            | NodeKind::StatementModifier
            | NodeKind::Label
            | NodeKind::Signature
            | NodeKind::HeredocBody
            | NodeKind::Args
            | NodeKind::LoopControl => Value::Unknown,
        }
    }

    /// Value of the first child node, `Unknown` without one.
    fn first_value(&self, node: NodeId, v: &mut Visited) -> Value {
        match self.tree().child_nodes(node).next() {
            Some(child) => self.infer_value(child, v),
            None => Value::Unknown,
        }
    }

    #[inline]
    fn name_of(&self, node: NodeId) -> &'static str {
        self.interner.lookup(self.tree().name(node))
    }

    /// Package in effect at `node`.
    #[inline]
    fn current_package(&self, node: NodeId) -> Name {
        self.tree().node_context(node).package
    }
}
