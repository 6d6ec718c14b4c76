//! Closure-driven tree traversal.
//!
//! Analyses that only care about a few node kinds walk the arena with
//! [`walk`] and a closure instead of implementing a visitor trait. The
//! closure decides per node whether to descend, skip the subtree, or stop.

use crate::tree::{NodeId, SyntaxTree};
use smallvec::SmallVec;

/// What to do after visiting a node.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum WalkControl {
    /// Visit the node's children next.
    Continue,
    /// Do not descend into this node.
    SkipChildren,
    /// Abandon the whole walk.
    Stop,
}

/// Pre-order walk of the subtree at `root`.
///
/// Returns `false` if the callback stopped the walk early.
pub fn walk<F>(tree: &SyntaxTree, root: NodeId, mut visit: F) -> bool
where
    F: FnMut(NodeId) -> WalkControl,
{
    let mut stack: SmallVec<[NodeId; 32]> = SmallVec::new();
    stack.push(root);
    while let Some(id) = stack.pop() {
        match visit(id) {
            WalkControl::Continue => stack.extend(tree.child_nodes(id).rev()),
            WalkControl::SkipChildren => {}
            WalkControl::Stop => return false,
        }
    }
    true
}

/// Post-order fold: `combine` receives a node and the folded values of its
/// child nodes, in source order.
///
/// Iterative, so arbitrarily deep trees do not grow the call stack.
pub fn fold<T, F>(tree: &SyntaxTree, root: NodeId, mut combine: F) -> T
where
    F: FnMut(NodeId, Vec<T>) -> T,
{
    let mut stack: Vec<(NodeId, bool)> = vec![(root, false)];
    let mut results: Vec<T> = Vec::new();
    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            let count = tree.child_nodes(id).count();
            let kids = results.split_off(results.len() - count);
            results.push(combine(id, kids));
        } else {
            stack.push((id, true));
            stack.extend(tree.child_nodes(id).rev().map(|c| (c, false)));
        }
    }
    match results.pop() {
        Some(value) => value,
        None => combine(root, Vec::new()),
    }
}
