//! Parser tests.
//!
//! - `expressions`: precedence, terms, subscripts and bareword decisions
//! - `statements`: declarations, control flow and lexical contexts
//! - `registry`: packages, subs, parents, exports and imports
//! - `recovery`: malformed input and the token-coverage property

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod expressions;
mod registry;

use perl_ir::{NodeId, NodeKind, StringInterner, SyntaxTree};

use crate::{parse, ParseOptions, ParseOutput};

pub(super) struct Parsed {
    pub interner: StringInterner,
    pub out: ParseOutput,
}

impl Parsed {
    pub fn tree(&self) -> &SyntaxTree {
        &self.out.tree
    }

    /// Top-level statements.
    pub fn statements(&self) -> Vec<NodeId> {
        let tree = self.tree();
        tree.child_nodes(tree.root()).collect()
    }

    /// The `i`-th top-level statement, rendered.
    pub fn stmt(&self, i: usize) -> String {
        render(self.tree(), &self.interner, self.statements()[i])
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.interner.lookup(self.tree().name(id))
    }

    pub fn first(&self, kind: NodeKind) -> NodeId {
        let tree = self.tree();
        tree.descendants_of_kind(tree.root(), kind)
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no {kind:?} node"))
    }
}

pub(super) fn parse_src(source: &str) -> Parsed {
    let interner = StringInterner::new();
    let lex = perl_lexer::lex(source);
    let out = parse(&lex, source, &interner, ParseOptions::default());
    Parsed { interner, out }
}

/// Parse input that must be error-free.
pub(super) fn parse_ok(source: &str) -> Parsed {
    let parsed = parse_src(source);
    assert!(
        !parsed.out.has_errors(),
        "unexpected errors in {source:?}: {:?}",
        parsed.out.errors
    );
    parsed
}

/// S-expression of the node structure: `(Kind:name child ...)`. Tokens are
/// left out; leaves print without parentheses.
pub(super) fn render(tree: &SyntaxTree, interner: &StringInterner, id: NodeId) -> String {
    let node = tree.node(id);
    let mut head = format!("{:?}", node.kind);
    if !node.name.is_empty() {
        head.push(':');
        head.push_str(interner.lookup(node.name));
    }
    let children: Vec<String> = tree
        .child_nodes(id)
        .map(|child| render(tree, interner, child))
        .collect();
    if children.is_empty() {
        head
    } else {
        format!("({head} {})", children.join(" "))
    }
}
