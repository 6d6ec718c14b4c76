//! Compute-once cache of sub summaries.
//!
//! A summary is the merged return value of one sub (or anonymous sub),
//! keyed by its declaration node and the pragmas in effect there. One cache
//! belongs to one file snapshot; a new snapshot starts with a new cache, so
//! entries never outlive the subtree they describe.
//!
//! # Concurrency
//!
//! The first thread to ask for a key computes it; others asking for the
//! same key block until the result is stored. Two situations would make a
//! waiter wait forever, and both get `Unknown` instead:
//!
//! - the owner of the in-flight key is the asking thread itself (a
//!   recursive sub)
//! - the owner is, through a chain of waits, waiting on the asking thread
//!   (mutually recursive subs computed on different threads)
//!
//! Waits are recorded in a [`WaitGraph`]. Caches of different files must
//! share one graph for the second check to see waits that cross files.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use perl_ir::{FeatureTable, NodeId};
use perl_types::Value;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Declaration identity plus the pragmas it was compiled under.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SummaryKey {
    pub node: NodeId,
    pub features: FeatureTable,
}

impl SummaryKey {
    pub fn new(node: NodeId, features: FeatureTable) -> Self {
        SummaryKey { node, features }
    }
}

enum Slot {
    Running(ThreadId),
    Done(Value),
}

/// Which thread waits on which, across all caches sharing the graph.
#[derive(Default, Debug)]
pub struct WaitGraph {
    edges: Mutex<FxHashMap<ThreadId, ThreadId>>,
}

impl WaitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `waiter` waits on `owner`. Refused (returns `false`)
    /// when `owner` already waits, directly or not, on `waiter`.
    fn start_waiting(&self, waiter: ThreadId, owner: ThreadId) -> bool {
        let mut edges = self.edges.lock();
        let mut current = owner;
        loop {
            if current == waiter {
                return false;
            }
            match edges.get(&current) {
                Some(&next) => current = next,
                None => break,
            }
        }
        edges.insert(waiter, owner);
        true
    }

    fn stop_waiting(&self, waiter: ThreadId) {
        self.edges.lock().remove(&waiter);
    }
}

/// Sub summaries of one file snapshot.
pub struct SummaryCache {
    slots: Mutex<FxHashMap<SummaryKey, Slot>>,
    ready: Condvar,
    waits: Arc<WaitGraph>,
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SummaryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryCache")
            .field("entries", &self.slots.lock().len())
            .finish_non_exhaustive()
    }
}

impl SummaryCache {
    /// A cache with a private wait graph.
    pub fn new() -> Self {
        Self::with_wait_graph(Arc::default())
    }

    pub fn with_wait_graph(waits: Arc<WaitGraph>) -> Self {
        SummaryCache {
            slots: Mutex::new(FxHashMap::default()),
            ready: Condvar::new(),
            waits,
        }
    }

    /// Stored summary, if one is finished.
    pub fn get(&self, key: SummaryKey) -> Option<Value> {
        match self.slots.lock().get(&key) {
            Some(Slot::Done(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Number of finished summaries.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Done(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget the finished summaries of `node`.
    pub fn invalidate(&self, node: NodeId) {
        self.slots
            .lock()
            .retain(|key, slot| key.node != node || matches!(slot, Slot::Running(_)));
    }

    /// Forget every finished summary. In-flight ones finish normally.
    pub fn clear(&self) {
        self.slots
            .lock()
            .retain(|_, slot| matches!(slot, Slot::Running(_)));
    }

    /// The summary for `key`, computing it with `compute` if nobody has.
    ///
    /// `compute` returns `None` when it was cancelled; nothing is stored
    /// then, and the caller gets `Unknown`.
    pub fn get_or_compute<F>(&self, key: SummaryKey, compute: F) -> Value
    where
        F: FnOnce() -> Option<Value>,
    {
        let me = thread::current().id();
        let mut slots = self.slots.lock();
        loop {
            match slots.get(&key) {
                Some(Slot::Done(value)) => return value.clone(),
                Some(&Slot::Running(owner)) => {
                    if owner == me || !self.waits.start_waiting(me, owner) {
                        trace!(node = ?key.node, "summary cycle cut");
                        return Value::Unknown;
                    }
                    self.ready.wait(&mut slots);
                    self.waits.stop_waiting(me);
                }
                None => break,
            }
        }
        slots.insert(key, Slot::Running(me));
        drop(slots);

        let running = Running {
            cache: self,
            key,
            settled: false,
        };
        let result = compute();
        running.settle(result)
    }
}

/// An in-flight slot owned by the current thread. Dropping it unsettled
/// (the computation panicked) frees the slot for the waiters.
struct Running<'c> {
    cache: &'c SummaryCache,
    key: SummaryKey,
    settled: bool,
}

impl Running<'_> {
    fn settle(mut self, result: Option<Value>) -> Value {
        self.settled = true;
        let mut slots = self.cache.slots.lock();
        let value = match result {
            Some(value) => {
                slots.insert(self.key, Slot::Done(value.clone()));
                value
            }
            None => {
                debug!(node = ?self.key.node, "summary abandoned");
                slots.remove(&self.key);
                Value::Unknown
            }
        };
        drop(slots);
        self.cache.ready.notify_all();
        value
    }
}

impl Drop for Running<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.cache.slots.lock().remove(&self.key);
            self.cache.ready.notify_all();
        }
    }
}
