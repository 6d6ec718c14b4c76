//! A set of files analysed together.
//!
//! The [`Workspace`] keeps the latest [`FileSnapshot`] of every open file
//! and the registry stubs of library files that are only looked up. Each
//! update builds a complete new snapshot off to the side and swaps it in,
//! so readers always see a finished snapshot. Updates to the same file are
//! serialised; updates to different files run in parallel.
//!
//! Cross-file queries go through a [`WorkspaceView`]: a frozen set of
//! snapshots that implements [`ExternalLookup`] for the inference engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use perl_infer::{Cancellation, ExternalLookup, InferOptions, WaitGraph};
use perl_ir::{Name, SharedInterner};
use perl_lexer::lex;
use perl_parse::parse;
use perl_types::{PackageEntry, PackageLookup, Registry, SubEntry, Value};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::snapshot::{ImportCandidates, PackageIndex, Symbol};
use crate::{AnalysisConfig, ContentHash, FileSnapshot, StubCache};

/// Open files, library stubs and the settings they are analysed with.
pub struct Workspace {
    config: AnalysisConfig,
    interner: SharedInterner,
    waits: Arc<WaitGraph>,
    files: RwLock<FxHashMap<PathBuf, Arc<FileSnapshot>>>,
    libraries: RwLock<FxHashMap<PathBuf, Arc<Registry>>>,
    /// One lock per file path; held while a new snapshot is built.
    writers: Mutex<FxHashMap<PathBuf, Arc<Mutex<()>>>>,
    stubs: Option<StubCache>,
}

impl Workspace {
    /// An empty workspace. A cache directory that cannot be opened is
    /// reported and analysis continues without a stub cache.
    pub fn new(config: AnalysisConfig) -> Self {
        let stubs = config
            .cache_dir
            .as_deref()
            .and_then(|dir| match StubCache::new(dir) {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!(dir = %dir.display(), "stub cache disabled: {e}");
                    None
                }
            });
        Workspace {
            config,
            interner: SharedInterner::new(),
            waits: Arc::new(WaitGraph::new()),
            files: RwLock::new(FxHashMap::default()),
            libraries: RwLock::new(FxHashMap::default()),
            writers: Mutex::new(FxHashMap::default()),
            stubs,
        }
    }

    #[inline]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Latest snapshot of an open file.
    pub fn snapshot(&self, path: &Path) -> Option<Arc<FileSnapshot>> {
        self.files.read().get(path).cloned()
    }

    /// Paths of the open files, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn writer(&self, path: &Path) -> Arc<Mutex<()>> {
        Arc::clone(self.writers.lock().entry(path.to_path_buf()).or_default())
    }

    /// Analyse a new version of `path` and make it current.
    ///
    /// An already open file is re-lexed from its first changed line.
    pub fn update(&self, path: impl Into<PathBuf>, source: String) -> Arc<FileSnapshot> {
        let path = path.into();
        let writer = self.writer(&path);
        let _guard = writer.lock();

        let snapshot = match self.snapshot(&path) {
            Some(previous) if previous.source() == source => return previous,
            Some(previous) => previous.edited(source, &self.config, Arc::clone(&self.waits)),
            None => FileSnapshot::build(
                path.clone(),
                source,
                self.interner.clone(),
                &self.config,
                Arc::clone(&self.waits),
            ),
        };
        let snapshot = Arc::new(snapshot);
        self.store_stub(&snapshot);
        let mut files = self.files.write();
        files.insert(path, Arc::clone(&snapshot));
        // Summaries of other files may have looked into the old version.
        for other in files.values() {
            if !Arc::ptr_eq(other, &snapshot) {
                other.forget_summaries();
            }
        }
        drop(files);
        snapshot
    }

    /// Analyse many files in parallel. Results are in input order.
    pub fn analyze_all(&self, files: Vec<(PathBuf, String)>) -> Vec<Arc<FileSnapshot>> {
        let analyze = || {
            files
                .into_par_iter()
                .map(|(path, source)| self.update(path, source))
                .collect::<Vec<_>>()
        };
        match self.config.threads {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(analyze),
                Err(e) => {
                    warn!("failed to create thread pool ({e}), using the global pool");
                    analyze()
                }
            },
            None => analyze(),
        }
    }

    /// Close a file.
    pub fn remove(&self, path: &Path) -> Option<Arc<FileSnapshot>> {
        let writer = self.writer(path);
        let _guard = writer.lock();
        self.files.write().remove(path)
    }

    /// Register a library file whose packages other files may use but
    /// that is never queried itself. Only its registry is kept, taken from
    /// the stub cache when the text is unchanged.
    pub fn load_library(&self, path: impl Into<PathBuf>, source: &str) -> Arc<Registry> {
        let path = path.into();
        let hash = ContentHash::of(source);
        let cached = self.stubs.as_ref().and_then(|stubs| {
            stubs
                .get(hash, self.config.perl_version, &self.interner)
                .unwrap_or_else(|e| {
                    warn!(path = %path.display(), "ignoring stub: {e}");
                    None
                })
        });
        let registry = match cached {
            Some(registry) => {
                debug!(path = %path.display(), %hash, "stub cache hit");
                registry
            }
            None => {
                let lexed = lex(source);
                let options = self.config.parse_options();
                let registry = parse(&lexed, source, &self.interner, options).registry;
                self.put_stub(hash, &path, &registry);
                registry
            }
        };
        let registry = Arc::new(registry);
        self.libraries.write().insert(path, Arc::clone(&registry));
        registry
    }

    fn store_stub(&self, snapshot: &FileSnapshot) {
        let version = self.config.perl_version;
        let current = self
            .stubs
            .as_ref()
            .is_some_and(|stubs| stubs.has(snapshot.hash(), version));
        if !current {
            self.put_stub(snapshot.hash(), snapshot.path(), snapshot.registry());
        }
    }

    fn put_stub(&self, hash: ContentHash, path: &Path, registry: &Registry) {
        if let Some(stubs) = &self.stubs {
            let version = self.config.perl_version;
            if let Err(e) = stubs.put(hash, version, path, registry, &self.interner) {
                warn!(path = %path.display(), "failed to store stub: {e}");
            }
        }
    }

    /// The current files and libraries, frozen.
    pub fn view(&self) -> WorkspaceView {
        let mut files: Vec<(PathBuf, Arc<FileSnapshot>)> = self
            .files
            .read()
            .iter()
            .map(|(path, snapshot)| (path.clone(), Arc::clone(snapshot)))
            .collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));
        let mut libraries: Vec<(PathBuf, Arc<Registry>)> = self
            .libraries
            .read()
            .iter()
            .map(|(path, registry)| (path.clone(), Arc::clone(registry)))
            .collect();
        libraries.sort_by(|a, b| a.0.cmp(&b.0));
        WorkspaceView::new(
            files.into_iter().map(|(_, s)| s).collect(),
            libraries.into_iter().map(|(_, r)| r).collect(),
            self.config.infer_options(),
        )
    }

    // === Cross-file queries ===

    /// Value at `offset` in `path`, seeing every file of the workspace.
    pub fn value_at(&self, path: &Path, offset: u32, cancel: &Cancellation) -> Option<Value> {
        let snapshot = self.snapshot(path)?;
        let view = self.view();
        let engine = snapshot
            .engine()
            .with_external(&view)
            .with_cancellation(cancel.clone());
        Some(snapshot.value_with(&engine, offset))
    }

    pub fn documentation_at(
        &self,
        path: &Path,
        offset: u32,
        cancel: &Cancellation,
    ) -> Option<String> {
        let snapshot = self.snapshot(path)?;
        let view = self.view();
        let engine = snapshot
            .engine()
            .with_external(&view)
            .with_cancellation(cancel.clone());
        snapshot.documentation_with(&engine, offset)
    }

    pub fn visible_symbols(&self, path: &Path, offset: u32) -> Option<Vec<Symbol>> {
        let snapshot = self.snapshot(path)?;
        Some(snapshot.visible_symbols_with(offset, &self.view()))
    }

    /// What `use module` can import, from whichever file declares it.
    pub fn import_candidates(&self, path: &Path, module: &str) -> ImportCandidates {
        match self.snapshot(path) {
            Some(snapshot) => snapshot.import_candidates(module, &self.view()),
            None => ImportCandidates::default(),
        }
    }
}

/// Where a package is declared.
#[derive(Copy, Clone, Debug)]
enum Owner {
    File(usize),
    Library(usize),
}

/// Frozen snapshots of a workspace.
///
/// A package declared in several files resolves to the first of them by
/// path, open files before libraries.
pub struct WorkspaceView {
    files: Vec<Arc<FileSnapshot>>,
    libraries: Vec<Arc<Registry>>,
    index: FxHashMap<Name, Owner>,
    options: InferOptions,
}

impl WorkspaceView {
    fn new(
        files: Vec<Arc<FileSnapshot>>,
        libraries: Vec<Arc<Registry>>,
        options: InferOptions,
    ) -> Self {
        let mut index = FxHashMap::default();
        let owners = files
            .iter()
            .enumerate()
            .map(|(i, file)| (Owner::File(i), file.registry()))
            .chain(
                libraries
                    .iter()
                    .enumerate()
                    .map(|(i, registry)| (Owner::Library(i), &**registry)),
            );
        for (owner, registry) in owners {
            for package in registry.packages() {
                index.entry(package.name).or_insert(owner);
            }
        }
        WorkspaceView {
            files,
            libraries,
            index,
            options,
        }
    }

    fn registry(&self, owner: Owner) -> &Registry {
        match owner {
            Owner::File(i) => self.files[i].registry(),
            Owner::Library(i) => &*self.libraries[i],
        }
    }
}

impl PackageLookup for WorkspaceView {
    fn package(&self, name: Name) -> Option<&PackageEntry> {
        let owner = *self.index.get(&name)?;
        self.registry(owner).package(name)
    }
}

impl PackageIndex for WorkspaceView {
    fn package_names(&self) -> Vec<Name> {
        self.index.keys().copied().collect()
    }
}

impl ExternalLookup for WorkspaceView {
    fn package(&self, name: Name) -> Option<&PackageEntry> {
        PackageLookup::package(self, name)
    }

    fn sub_returns(&self, sub: &SubEntry, cancel: &Cancellation) -> Option<Value> {
        let Some(&Owner::File(i)) = self.index.get(&sub.package) else {
            return None;
        };
        let snapshot = &self.files[i];
        let declared = snapshot
            .registry()
            .sub(sub.package, sub.name)
            .is_some_and(|own| own.node == sub.node);
        if !declared {
            return None;
        }
        let engine = snapshot
            .engine()
            .with_external(self)
            .with_options(self.options)
            .with_cancellation(cancel.clone());
        Some(engine.summary(sub.node))
    }
}

#[cfg(test)]
mod tests;
