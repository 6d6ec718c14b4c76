//! Source content hashing for the stub cache.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Hash of a file's text. Equal text, equal hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(u64);

impl ContentHash {
    #[must_use]
    pub fn of(source: &str) -> Self {
        let mut hasher = FxHasher::default();
        source.hash(&mut hasher);
        ContentHash(hasher.finish())
    }

    #[must_use]
    pub const fn new(value: u64) -> Self {
        ContentHash(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
