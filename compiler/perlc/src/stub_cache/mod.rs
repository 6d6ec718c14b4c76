//! On-disk cache of per-file registry stubs.
//!
//! A stub is what other files need to know about a file without parsing
//! it: its packages, subs, parents and export lists. Stubs are keyed by
//! the [`ContentHash`] of the file text.
//!
//! # Layout
//!
//! ```text
//! <cache_dir>/stubs/
//! ├── <content_hash>.bin    # bincode envelope around the tagged registry payload
//! └── ...
//! ```
//!
//! The envelope records the stub format, the content hash and the Perl
//! version floor the file was parsed under. A mismatch on any of them is
//! a miss, not an error.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use perl_ir::{PerlVersion, StringInterner};
use perl_types::Registry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CacheError, ContentHash};

/// Bumped whenever the envelope or the payload changes shape.
const STUB_FORMAT: u32 = 1;

/// Distinguishes the temporary files of concurrent writers.
static NEXT_TEMP: AtomicU64 = AtomicU64::new(0);

#[derive(Serialize, Deserialize)]
struct StubEnvelope {
    format: u32,
    hash: u64,
    perl_version: PerlVersion,
    /// File the stub was built from, for inspection only.
    path: String,
    /// `Registry::to_bytes` output.
    registry: Vec<u8>,
}

/// Registry stubs persisted under one directory.
#[derive(Debug)]
pub struct StubCache {
    dir: PathBuf,
}

impl StubCache {
    /// Open the cache under `cache_dir`, creating it when missing.
    pub fn new(cache_dir: &Path) -> Result<Self, CacheError> {
        let dir = cache_dir.join("stubs");
        std::fs::create_dir_all(&dir)?;
        Ok(StubCache { dir })
    }

    /// The stub for a file with content hash `hash`, parsed under
    /// `perl_version`. `Ok(None)` on a miss or a stale entry.
    pub fn get(
        &self,
        hash: ContentHash,
        perl_version: PerlVersion,
        interner: &StringInterner,
    ) -> Result<Option<Registry>, CacheError> {
        match self.current_envelope(hash, perl_version)? {
            Some(envelope) => Ok(Some(Registry::from_bytes(&envelope.registry, interner)?)),
            None => Ok(None),
        }
    }

    /// Store the stub of `path`.
    ///
    /// Written to a temporary file first and renamed into place, so a
    /// concurrent reader sees either the old entry or the new one. The
    /// temporary file is removed when the write fails.
    pub fn put(
        &self,
        hash: ContentHash,
        perl_version: PerlVersion,
        path: &Path,
        registry: &Registry,
        interner: &StringInterner,
    ) -> Result<(), CacheError> {
        let envelope = StubEnvelope {
            format: STUB_FORMAT,
            hash: hash.value(),
            perl_version,
            path: path.display().to_string(),
            registry: registry.to_bytes(interner),
        };
        let bytes = bincode::serialize(&envelope)?;
        let target = self.stub_path(hash);
        let temp = target.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            NEXT_TEMP.fetch_add(1, Ordering::Relaxed)
        ));
        let written = std::fs::write(&temp, bytes).and_then(|()| std::fs::rename(&temp, &target));
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&temp) {
                debug!(temp = %temp.display(), "temporary stub not removed: {cleanup}");
            }
            return Err(e.into());
        }
        debug!(%hash, path = %path.display(), "stub stored");
        Ok(())
    }

    /// Whether `get` would hit. Only the envelope is read.
    #[must_use]
    pub fn has(&self, hash: ContentHash, perl_version: PerlVersion) -> bool {
        matches!(self.current_envelope(hash, perl_version), Ok(Some(_)))
    }

    /// Remove every stored stub.
    pub fn clear(&self) -> Result<(), CacheError> {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir)?;
        }
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    fn current_envelope(
        &self,
        hash: ContentHash,
        perl_version: PerlVersion,
    ) -> Result<Option<StubEnvelope>, CacheError> {
        let bytes = match std::fs::read(self.stub_path(hash)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let envelope: StubEnvelope = bincode::deserialize(&bytes)?;
        if envelope.format != STUB_FORMAT
            || envelope.hash != hash.value()
            || envelope.perl_version != perl_version
        {
            debug!(%hash, format = envelope.format, "stale stub");
            return Ok(None);
        }
        Ok(Some(envelope))
    }

    fn stub_path(&self, hash: ContentHash) -> PathBuf {
        self.dir.join(format!("{hash}.bin"))
    }
}
