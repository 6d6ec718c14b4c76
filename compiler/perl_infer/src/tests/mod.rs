//! Inference tests.
//!
//! - `expressions`: literals, constructors, subscripts and operators
//! - `variables`: lexical flow, package variables and topics
//! - `calls`: builtins, sub summaries, methods and imports
//! - `totality`: cycles, cancellation, depth and arbitrary input

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod calls;
mod totality;
mod variables;

use perl_ir::{NodeId, StringInterner};
use perl_parse::{parse, ParseOptions, ParseOutput};
use perl_types::Value;

use crate::{Engine, SummaryCache};

pub(super) struct Analyzed {
    pub interner: StringInterner,
    pub source: String,
    pub out: ParseOutput,
    pub cache: SummaryCache,
}

impl Analyzed {
    pub fn engine(&self) -> Engine<'_> {
        Engine::new(&self.out, &self.source, &self.interner, &self.cache)
    }

    /// The last expression node whose source text is exactly `text`.
    pub fn node(&self, text: &str) -> NodeId {
        let tree = &self.out.tree;
        tree.preorder(tree.root())
            .filter(|&id| !tree.kind(id).is_statement())
            .filter(|&id| tree.text(id, &self.source) == text)
            .last()
            .unwrap_or_else(|| panic!("no node {text:?} in {:?}", self.source))
    }

    /// Inferred value of the last occurrence of `text`.
    pub fn value_of(&self, text: &str) -> Value {
        self.engine().infer(self.node(text))
    }
}

pub(super) fn analyze(source: &str) -> Analyzed {
    analyze_with(StringInterner::new(), source)
}

/// Analyze with an interner shared with other files.
pub(super) fn analyze_with(interner: StringInterner, source: &str) -> Analyzed {
    let lex = perl_lexer::lex(source);
    let out = parse(&lex, source, &interner, ParseOptions::default());
    assert!(
        !out.has_errors(),
        "unexpected errors in {source:?}: {:?}",
        out.errors
    );
    Analyzed {
        interner,
        source: source.to_owned(),
        out,
        cache: SummaryCache::new(),
    }
}
