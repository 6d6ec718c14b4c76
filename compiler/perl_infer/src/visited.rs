//! Per-query inference state.

use perl_ir::NodeId;
use perl_types::Value;
use rustc_hash::FxHashMap;

/// Inferences running on the current query, and results already known.
///
/// A node met again while its own inference is still running closes a cycle
/// and infers to `Unknown`. Results are remembered for the rest of the
/// query unless a cycle was cut while they were computed, since such a
/// result depends on where the query entered the cycle.
#[derive(Default, Debug)]
pub struct Visited {
    /// In-progress nodes, with the cut count when each was entered.
    in_progress: FxHashMap<NodeId, u32>,
    cuts: u32,
    finished: FxHashMap<NodeId, Value>,
}

impl Visited {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start inferring `node`. Returns `false`, and records a cut, when
    /// `node` is already in progress.
    pub fn enter(&mut self, node: NodeId) -> bool {
        if self.in_progress.contains_key(&node) {
            self.cuts += 1;
            return false;
        }
        self.in_progress.insert(node, self.cuts);
        true
    }

    /// Finish inferring `node` with `value`.
    pub fn exit(&mut self, node: NodeId, value: &Value) {
        if let Some(cuts_at_entry) = self.in_progress.remove(&node) {
            if cuts_at_entry == self.cuts {
                self.finished.insert(node, value.clone());
            }
        }
    }

    /// Result of an earlier inference of `node` on this query.
    #[inline]
    pub fn finished(&self, node: NodeId) -> Option<&Value> {
        self.finished.get(&node)
    }

    #[inline]
    pub fn is_in_progress(&self, node: NodeId) -> bool {
        self.in_progress.contains_key(&node)
    }

    /// Number of inferences currently running.
    #[inline]
    pub fn depth(&self) -> usize {
        self.in_progress.len()
    }

    /// Number of cycles cut so far.
    #[inline]
    pub fn cycles(&self) -> u32 {
        self.cuts
    }
}
