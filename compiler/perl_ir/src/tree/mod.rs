//! Syntax tree arena.
//!
//! Nodes live in one `Vec<Node>` and are addressed by [`NodeId`]. A node's
//! children are a contiguous range of the shared `children` vector, each
//! entry either another node or an index into the tree's [`TokenList`].
//! Parent links are indices as well, so the tree has no ownership cycles and
//! a finished tree can be shared between threads as-is.
//!
//! # Invariants
//!
//! - Every significant token except `Eof` is the child of exactly one node.
//! - The children of a node appear in source order and their spans do not
//!   overlap.
//! - Nodes are allocated in post-order: a node's id is greater than the ids
//!   of all of its descendants, and the root has the largest id.
//! - Each node records the [`ContextId`] (package + pragmas) in effect where
//!   it starts.

mod builder;
mod kind;

pub use builder::{Checkpoint, TreeBuilder};
pub use kind::NodeKind;

use smallvec::SmallVec;

use crate::{FeatureTable, Name, Span, Token, TokenList};

/// Index of a node in a [`SyntaxTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for "no node" (the root's parent).
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId(INVALID)")
        }
    }
}

/// Index of a [`ScopeContext`] in a [`SyntaxTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
#[repr(transparent)]
pub struct ContextId(u32);

impl ContextId {
    /// The context in effect at the top of the file.
    pub const ROOT: ContextId = ContextId(0);

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Package and pragma state for a lexical region.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScopeContext {
    /// Current package (`main` unless a `package` statement says otherwise).
    pub package: Name,
    pub features: FeatureTable,
}

/// A child slot: a node, or an index into the tree's token list.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Child {
    Node(NodeId),
    Token(u32),
}

impl Child {
    #[inline]
    pub fn as_node(self) -> Option<NodeId> {
        match self {
            Child::Node(id) => Some(id),
            Child::Token(_) => None,
        }
    }

    #[inline]
    pub fn as_token(self) -> Option<u32> {
        match self {
            Child::Token(idx) => Some(idx),
            Child::Node(_) => None,
        }
    }
}

/// A syntax node.
///
/// Layout: 32 bytes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Node {
    pub span: Span,
    pub name: Name,
    pub parent: NodeId,
    pub context: ContextId,
    first_child: u32,
    child_count: u32,
    pub kind: NodeKind,
}

/// An immutable syntax tree for one version of one file.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    children: Vec<Child>,
    contexts: Vec<ScopeContext>,
    tokens: TokenList,
    root: NodeId,
}

impl SyntaxTree {
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Look up a node that may come from another tree version.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    #[inline]
    pub fn name(&self, id: NodeId) -> Name {
        self.nodes[id.index()].name
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id.index()].parent;
        parent.is_valid().then_some(parent)
    }

    /// All child slots of a node, in source order.
    #[inline]
    pub fn children(&self, id: NodeId) -> &[Child] {
        let node = &self.nodes[id.index()];
        let start = node.first_child as usize;
        &self.children[start..start + node.child_count as usize]
    }

    /// Child nodes only.
    pub fn child_nodes(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.children(id).iter().filter_map(|c| c.as_node())
    }

    /// Child tokens only, as `(token index, token)`.
    pub fn child_tokens(&self, id: NodeId) -> impl Iterator<Item = (u32, &Token)> + '_ {
        self.children(id)
            .iter()
            .filter_map(|c| c.as_token())
            .map(|idx| (idx, &self.tokens[idx as usize]))
    }

    /// First child node of the given kind.
    pub fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.child_nodes(id).find(|&c| self.kind(c) == kind)
    }

    /// First child token of the given kind.
    pub fn token_of_kind(&self, id: NodeId, kind: crate::TokenKind) -> Option<&Token> {
        self.child_tokens(id)
            .map(|(_, t)| t)
            .find(|t| t.kind == kind)
    }

    /// First direct child token.
    pub fn first_token(&self, id: NodeId) -> Option<&Token> {
        self.child_tokens(id).next().map(|(_, t)| t)
    }

    /// Zero-based position of `child` among the child nodes of its parent.
    pub fn child_position(&self, child: NodeId) -> Option<usize> {
        let parent = self.parent(child)?;
        self.child_nodes(parent).position(|c| c == child)
    }

    #[inline]
    pub fn token(&self, idx: u32) -> &Token {
        &self.tokens[idx as usize]
    }

    #[inline]
    pub fn tokens(&self) -> &TokenList {
        &self.tokens
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Nearest ancestor (or `id` itself) of the given kind.
    pub fn enclosing(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.kind(n) == kind)
    }

    /// Deepest node whose span contains `offset`.
    pub fn node_at_offset(&self, offset: u32) -> Option<NodeId> {
        if self.nodes.is_empty() || !self.span(self.root).contains(offset) {
            return None;
        }
        let mut current = self.root;
        'descend: loop {
            for child in self.child_nodes(current) {
                let span = self.span(child);
                if span.contains(offset) && !span.is_empty() {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    #[inline]
    pub fn context(&self, id: ContextId) -> &ScopeContext {
        &self.contexts[id.index()]
    }

    /// Context of a node.
    #[inline]
    pub fn node_context(&self, id: NodeId) -> &ScopeContext {
        self.context(self.nodes[id.index()].context)
    }

    /// Context in effect at a byte offset.
    ///
    /// Falls back to the root context outside the tree.
    pub fn context_at(&self, offset: u32) -> &ScopeContext {
        match self.node_at_offset(offset) {
            Some(node) => self.node_context(node),
            None => &self.contexts[0],
        }
    }

    pub fn contexts(&self) -> &[ScopeContext] {
        &self.contexts
    }

    /// Source text of a node.
    #[inline]
    pub fn text<'s>(&self, id: NodeId, source: &'s str) -> &'s str {
        self.span(id).text(source)
    }

    /// Pre-order traversal of the subtree rooted at `root`.
    pub fn preorder(&self, root: NodeId) -> Preorder<'_> {
        let mut stack = SmallVec::new();
        stack.push(root);
        Preorder { tree: self, stack }
    }

    /// All nodes of `kind` under `root` (inclusive), in source order.
    pub fn descendants_of_kind(&self, root: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.preorder(root)
            .filter(|&n| self.kind(n) == kind)
            .collect()
    }
}

/// Iterator returned by [`SyntaxTree::preorder`].
pub struct Preorder<'t> {
    tree: &'t SyntaxTree,
    stack: SmallVec<[NodeId; 32]>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.child_nodes(id).rev());
        Some(id)
    }
}

#[cfg(test)]
mod tests;
