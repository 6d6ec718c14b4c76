//! Immutable per-file analysis results.
//!
//! A [`FileSnapshot`] owns one version of a file's text together with
//! everything derived from it: tokens, syntax tree, registry and the
//! summary cache inference fills lazily. Snapshots are never mutated;
//! a new version of the file gets a new snapshot.

mod completion;
mod symbols;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use perl_infer::{builtin, Engine, InferOptions, SummaryCache, WaitGraph};
use perl_ir::{FeatureTable, NodeId, NodeKind, SharedInterner, SyntaxTree};
use perl_lexer::{lex, relex, LexOutput};
use perl_parse::{parse, ParseError, ParseOutput};
use perl_types::{Registry, SubFlags, Value};
use tracing::debug;

use crate::{AnalysisConfig, ContentHash};

pub use completion::{annotation_names, ImportCandidates, REFERENCE_TYPES};
pub use symbols::{PackageIndex, Symbol, SymbolKind};

/// One version of one file, analysed.
pub struct FileSnapshot {
    path: PathBuf,
    source: String,
    hash: ContentHash,
    interner: SharedInterner,
    lex: LexOutput,
    parse: ParseOutput,
    summaries: SummaryCache,
    options: InferOptions,
}

impl std::fmt::Debug for FileSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSnapshot")
            .field("path", &self.path)
            .field("hash", &self.hash)
            .field("nodes", &self.parse.tree.len())
            .field("errors", &self.parse.errors.len())
            .finish_non_exhaustive()
    }
}

impl FileSnapshot {
    /// Lex and parse `source`.
    ///
    /// `waits` is shared by every snapshot of a workspace so that summary
    /// computations waiting on each other across files cannot deadlock.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn build(
        path: PathBuf,
        source: String,
        interner: SharedInterner,
        config: &AnalysisConfig,
        waits: Arc<WaitGraph>,
    ) -> Self {
        let lex = lex(&source);
        Self::from_lex(path, source, lex, interner, config, waits)
    }

    /// Snapshot of a new version of this file. Tokens before the first
    /// changed line are reused.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    pub fn edited(&self, source: String, config: &AnalysisConfig, waits: Arc<WaitGraph>) -> Self {
        let offset = common_prefix(&self.source, &source);
        let lex = relex(&self.lex, &source, offset);
        Self::from_lex(
            self.path.clone(),
            source,
            lex,
            self.interner.clone(),
            config,
            waits,
        )
    }

    fn from_lex(
        path: PathBuf,
        source: String,
        lex: LexOutput,
        interner: SharedInterner,
        config: &AnalysisConfig,
        waits: Arc<WaitGraph>,
    ) -> Self {
        let parse = parse(&lex, &source, &interner, config.parse_options());
        debug!(
            errors = parse.errors.len(),
            packages = parse.registry.packages().len(),
            "snapshot built"
        );
        FileSnapshot {
            hash: ContentHash::of(&source),
            path,
            source,
            interner,
            lex,
            parse,
            summaries: SummaryCache::with_wait_graph(waits),
            options: config.infer_options(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    #[inline]
    pub fn lex(&self) -> &LexOutput {
        &self.lex
    }

    #[inline]
    pub fn parse(&self) -> &ParseOutput {
        &self.parse
    }

    #[inline]
    pub fn tree(&self) -> &SyntaxTree {
        &self.parse.tree
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.parse.registry
    }

    #[inline]
    pub fn errors(&self) -> &[ParseError] {
        &self.parse.errors
    }

    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Inference over this snapshot, seeing no other file.
    pub fn engine(&self) -> Engine<'_> {
        Engine::new(&self.parse, &self.source, &self.interner, &self.summaries)
            .with_options(self.options)
    }

    /// Drop the cached sub summaries; they are recomputed on demand.
    pub fn forget_summaries(&self) {
        self.summaries.clear();
    }

    // === Position queries ===

    /// Innermost expression at `offset`, not looking past the enclosing
    /// statement.
    pub fn expression_at(&self, offset: u32) -> Option<NodeId> {
        let tree = self.tree();
        let node = tree.node_at_offset(offset)?;
        std::iter::once(node)
            .chain(tree.ancestors(node))
            .take_while(|&n| {
                let kind = tree.kind(n);
                !kind.is_statement() && kind != NodeKind::File
            })
            .find(|&n| is_expression(tree.kind(n)))
    }

    /// Value of the expression at `offset`; `Unknown` outside expressions.
    pub fn value_at(&self, offset: u32) -> Value {
        self.value_with(&self.engine(), offset)
    }

    /// [`value_at`](Self::value_at) on a caller-configured engine.
    pub fn value_with(&self, engine: &Engine<'_>, offset: u32) -> Value {
        self.expression_at(offset)
            .map_or(Value::Unknown, |node| engine.infer(node))
    }

    /// Pragmas and version floor in effect at `offset`.
    pub fn features_at(&self, offset: u32) -> FeatureTable {
        self.tree().context_at(offset).features
    }

    /// Package in effect at `offset`.
    pub fn package_at(&self, offset: u32) -> &'static str {
        self.interner.lookup(self.tree().context_at(offset).package)
    }

    /// Text for a documentation popup at `offset`.
    pub fn documentation_at(&self, offset: u32) -> Option<String> {
        self.documentation_with(&self.engine(), offset)
    }

    /// [`documentation_at`](Self::documentation_at) on a caller-configured
    /// engine.
    pub fn documentation_with(&self, engine: &Engine<'_>, offset: u32) -> Option<String> {
        let tree = self.tree();
        let start = tree.node_at_offset(offset)?;
        let Some(node) = std::iter::once(start)
            .chain(tree.ancestors(start))
            .find(|&n| is_documented(tree.kind(n)))
        else {
            return self.value_text(engine, offset);
        };
        let name = self.interner.lookup(tree.name(node));
        match tree.kind(node) {
            NodeKind::Call => {
                if let Some(builtin) = self.builtin_at(node, name) {
                    return Some(format!("{}\n\n{}", builtin.signature, builtin.doc));
                }
                Some(format!(
                    "sub {}\n\nreturns {}",
                    self.qualified(node, name),
                    engine.infer(node)
                ))
            }
            NodeKind::MethodCall if !name.is_empty() => Some(format!(
                "method {name}\n\nreturns {}",
                engine.infer(node)
            )),
            NodeKind::SubDecl => {
                let deprecated = self
                    .registry()
                    .all_subs()
                    .find(|sub| sub.node == node)
                    .is_some_and(|sub| sub.flags.contains(SubFlags::DEPRECATED));
                Some(format!(
                    "sub {}{}\n\nreturns {}",
                    self.qualified(node, name),
                    if deprecated { " (deprecated)" } else { "" },
                    engine.summary(node)
                ))
            }
            NodeKind::ScalarVar | NodeKind::ArrayVar | NodeKind::HashVar => Some(format!(
                "{}\n\n{}",
                tree.text(node, &self.source),
                engine.infer(node)
            )),
            _ => self.value_text(engine, offset),
        }
    }

    fn value_text(&self, engine: &Engine<'_>, offset: u32) -> Option<String> {
        let value = self.value_with(engine, offset);
        (!value.is_unknown()).then(|| value.to_string())
    }

    /// The builtin a call refers to, unless the current package declares
    /// a sub of that name.
    fn builtin_at(&self, call: NodeId, name: &str) -> Option<&'static perl_infer::Builtin> {
        let short = name
            .strip_prefix("CORE::GLOBAL::")
            .or_else(|| name.strip_prefix("CORE::"));
        if let Some(short) = short {
            return builtin(short);
        }
        if name.contains("::") {
            return None;
        }
        let package = self.tree().node_context(call).package;
        let shadowed = self
            .interner
            .get(name)
            .is_some_and(|n| self.registry().sub(package, n).is_some());
        if shadowed {
            None
        } else {
            builtin(name)
        }
    }

    fn qualified(&self, node: NodeId, name: &str) -> String {
        if name.contains("::") {
            return name.to_owned();
        }
        let package = self.interner.lookup(self.tree().node_context(node).package);
        format!("{package}::{name}")
    }
}

/// Nodes a value can be asked of.
fn is_expression(kind: NodeKind) -> bool {
    !matches!(
        kind,
        NodeKind::Label
            | NodeKind::Signature
            | NodeKind::Args
            | NodeKind::StatementModifier
            | NodeKind::ElsifClause
            | NodeKind::ElseClause
            | NodeKind::HeredocBody
            | NodeKind::LoopControl
    )
}

/// Nodes with their own documentation text.
fn is_documented(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Call
            | NodeKind::MethodCall
            | NodeKind::SubDecl
            | NodeKind::ScalarVar
            | NodeKind::ArrayVar
            | NodeKind::HashVar
    )
}

/// Length in bytes of the common prefix of two texts.
fn common_prefix(old: &str, new: &str) -> u32 {
    let len = old
        .bytes()
        .zip(new.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    u32::try_from(len).unwrap_or(u32::MAX)
}
