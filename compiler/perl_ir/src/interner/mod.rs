//! Sharded string interner for identifier storage.
//!
//! Parsing runs on worker threads while queries read earlier snapshots, so
//! the interner is shared and locked per shard.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Per-shard storage for interned strings.
struct InternShard {
    /// Map from string content to local index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

impl InternShard {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        }
    }

    fn with_empty() -> Self {
        let mut shard = Self::new();
        let empty: &'static str = "";
        shard.map.insert(empty, 0);
        shard.strings.push(empty);
        shard
    }
}

/// Sharded string interner for concurrent access.
///
/// # Thread Safety
/// Uses `RwLock` per shard. Wrap in [`SharedInterner`] to share across threads.
pub struct StringInterner {
    shards: [RwLock<InternShard>; Name::NUM_SHARDS],
    total_count: AtomicUsize,
}

impl StringInterner {
    /// Create a new interner with the common Perl names pre-interned.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(InternShard::with_empty())
            } else {
                RwLock::new(InternShard::new())
            }
        });

        let interner = Self {
            shards,
            total_count: AtomicUsize::new(1),
        };
        interner.pre_intern_common();
        interner
    }

    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hash = 0u32;
        for byte in s.bytes().take(8) {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        (hash as usize) % Name::NUM_SHARDS
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if a shard exceeds its local index space (2^28 strings).
    pub fn intern(&self, s: &str) -> Name {
        let shard_idx = Self::shard_for(s);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (16)"
        )]
        let shard_idx_u32 = shard_idx as u32;
        let shard = &self.shards[shard_idx];

        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(s) {
                return Name::new(shard_idx_u32, local);
            }
        }

        let mut guard = shard.write();
        if let Some(&local) = guard.map.get(s) {
            return Name::new(shard_idx_u32, local);
        }

        let local = match u32::try_from(guard.strings.len()) {
            Ok(local) if local <= Name::MAX_LOCAL => local,
            _ => panic!(
                "interner shard {shard_idx} exceeded capacity ({} strings)",
                guard.strings.len()
            ),
        };
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, local);
        self.total_count.fetch_add(1, Ordering::Relaxed);

        Name::new(shard_idx_u32, local)
    }

    /// Look up an already interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<Name> {
        let shard_idx = Self::shard_for(s);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (16)"
        )]
        let shard_idx_u32 = shard_idx as u32;
        let guard = self.shards[shard_idx].read();
        guard
            .map
            .get(s)
            .map(|&local| Name::new(shard_idx_u32, local))
    }

    /// Look up the string for a Name.
    ///
    /// Interned strings are leaked, so the returned reference is `'static`.
    /// A `Name` from a different interner resolves to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.shards[name.shard()].read();
        guard.strings.get(name.local()).copied().unwrap_or("")
    }

    fn pre_intern_common(&self) {
        const COMMON: &[&str] = &[
            "main",
            "UNIVERSAL",
            "CORE",
            "SUPER",
            "self",
            "new",
            "ISA",
            "EXPORT",
            "EXPORT_OK",
            "parent",
            "base",
            "strict",
            "warnings",
            "feature",
            "utf8",
            "Exporter",
            "import",
            "__PACKAGE__",
        ];

        for name in COMMON {
            self.intern(name);
        }
    }

    /// Number of interned strings (O(1)).
    pub fn len(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Check if the interner only holds the empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared interner handle.
///
/// The driver owns one `SharedInterner` per workspace; every file snapshot
/// and every worker thread clones it.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests;
