//! Bottom-up tree construction.
//!
//! The parser drives a `TreeBuilder` with `start_node` / `token` /
//! `finish_node` calls. Children of open nodes are buffered on a pending
//! stack and copied into the arena when their node finishes, which is what
//! makes the arena post-ordered. `checkpoint` + `start_node_at` allow wrapping
//! already-built children in a new node, for left-recursive constructs such
//! as binary expressions and postfix subscripts.

use super::{Child, ContextId, Node, NodeId, NodeKind, ScopeContext, SyntaxTree};
use crate::{Name, Span, TokenList};

/// Position in the pending child stack, see [`TreeBuilder::checkpoint`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Checkpoint(usize);

struct OpenNode {
    kind: NodeKind,
    name: Name,
    context: ContextId,
    first_pending: usize,
}

pub struct TreeBuilder {
    nodes: Vec<Node>,
    children: Vec<Child>,
    contexts: Vec<ScopeContext>,
    open: Vec<OpenNode>,
    pending: Vec<(Child, Span)>,
    current_context: ContextId,
    last_end: u32,
}

impl TreeBuilder {
    /// Start a tree whose root context is `root`.
    pub fn new(root: ScopeContext) -> Self {
        TreeBuilder {
            nodes: Vec::new(),
            children: Vec::new(),
            contexts: vec![root],
            open: Vec::new(),
            pending: Vec::new(),
            current_context: ContextId::ROOT,
            last_end: 0,
        }
    }

    pub fn start_node(&mut self, kind: NodeKind) {
        self.open.push(OpenNode {
            kind,
            name: Name::EMPTY,
            context: self.current_context,
            first_pending: self.pending.len(),
        });
    }

    /// Remember the current position so a node can later be opened around
    /// everything added after it.
    #[inline]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pending.len())
    }

    /// Open a node whose first child is the first child added after
    /// `checkpoint`.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: NodeKind) {
        let floor = self.open.last().map_or(0, |n| n.first_pending);
        debug_assert!(checkpoint.0 >= floor, "checkpoint predates the open node");
        self.open.push(OpenNode {
            kind,
            name: Name::EMPTY,
            context: self.current_context,
            first_pending: checkpoint.0.max(floor),
        });
    }

    /// Attach token `index` of the significant token list.
    pub fn token(&mut self, index: u32, span: Span) {
        self.last_end = span.end;
        self.pending.push((Child::Token(index), span));
    }

    /// Set the name of the innermost open node.
    pub fn set_name(&mut self, name: Name) {
        if let Some(node) = self.open.last_mut() {
            node.name = name;
        }
    }

    /// Change the kind of the innermost open node.
    pub fn set_kind(&mut self, kind: NodeKind) {
        if let Some(node) = self.open.last_mut() {
            node.kind = kind;
        }
    }

    /// Kind of the innermost open node.
    pub fn current_kind(&self) -> Option<NodeKind> {
        self.open.last().map(|n| n.kind)
    }

    /// Close the innermost open node and return its id.
    pub fn finish_node(&mut self) -> NodeId {
        let Some(open) = self.open.pop() else {
            return NodeId::INVALID;
        };

        #[expect(
            clippy::cast_possible_truncation,
            reason = "arena sizes are bounded by u32 source offsets"
        )]
        let id = NodeId::from_raw(self.nodes.len() as u32);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "arena sizes are bounded by u32 source offsets"
        )]
        let first_child = self.children.len() as u32;

        let drained: Vec<(Child, Span)> = self.pending.drain(open.first_pending..).collect();
        let span = match (drained.first(), drained.last()) {
            (Some((_, first)), Some((_, last))) => Span::new(first.start, last.end),
            _ => Span::point(self.last_end),
        };
        for (child, _) in &drained {
            if let Child::Node(child_id) = child {
                self.nodes[child_id.index()].parent = id;
            }
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "arena sizes are bounded by u32 source offsets"
        )]
        let child_count = drained.len() as u32;
        self.children.extend(drained.into_iter().map(|(c, _)| c));

        self.nodes.push(Node {
            span,
            name: open.name,
            parent: NodeId::INVALID,
            context: open.context,
            first_child,
            child_count,
            kind: open.kind,
        });
        self.pending.push((Child::Node(id), span));
        id
    }

    /// Register a new scope context and make it current.
    pub fn push_context(&mut self, context: ScopeContext) -> ContextId {
        if self.contexts[self.current_context.index()] == context {
            return self.current_context;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "one context per scope change, bounded by token count"
        )]
        let id = ContextId(self.contexts.len() as u32);
        self.contexts.push(context);
        self.current_context = id;
        id
    }

    /// Make a previously registered context current again (scope exit).
    pub fn restore_context(&mut self, id: ContextId) {
        self.current_context = id;
    }

    #[inline]
    pub fn current_context_id(&self) -> ContextId {
        self.current_context
    }

    #[inline]
    pub fn current_context(&self) -> &ScopeContext {
        &self.contexts[self.current_context.index()]
    }

    /// Finish building. Any nodes still open are closed first; the last
    /// finished node becomes the root.
    pub fn finish(mut self, tokens: TokenList) -> SyntaxTree {
        while !self.open.is_empty() {
            self.finish_node();
        }
        if self.nodes.is_empty() {
            self.start_node(NodeKind::File);
            self.finish_node();
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "arena sizes are bounded by u32 source offsets"
        )]
        let root = NodeId::from_raw((self.nodes.len() - 1) as u32);
        SyntaxTree {
            nodes: self.nodes,
            children: self.children,
            contexts: self.contexts,
            tokens,
            root,
        }
    }
}
