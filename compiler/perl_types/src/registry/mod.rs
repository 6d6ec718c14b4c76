//! Package and export registry.
//!
//! One [`Registry`] per file version. The parser fills a [`RegistryBuilder`]
//! while it walks the file; after [`RegistryBuilder::finish`] the registry
//! is a read-only snapshot.
//!
//! # Design
//!
//! - Packages are stored in declaration order with a `Name -> index` map
//! - Subs inside a package likewise keep declaration order plus an index
//! - Cross-file lookups go through [`PackageLookup`], so method resolution
//!   works the same over one registry or a workspace-wide index
//!
//! # Method resolution
//!
//! [`resolve_method`] searches the invocant's package, then its parents
//! depth-first, left to right, in declaration order, and finally
//! `UNIVERSAL`. The first declared sub wins. There is no C3 linearisation.

mod encode;

use bitflags::bitflags;
use perl_ir::{FeatureTable, Name, NodeId, PerlVersion, Span, StringInterner};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;

use crate::Value;

bitflags! {
    /// Facts about a sub taken from its declaration and annotations.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct SubFlags: u8 {
        /// `#@method`, or the sub reads its invocant.
        const METHOD = 1 << 0;
        const OVERRIDE = 1 << 1;
        const ABSTRACT = 1 << 2;
        const DEPRECATED = 1 << 3;
        /// `sub name;` with no body.
        const FORWARD = 1 << 4;
        /// Created by `use constant`.
        const CONSTANT = 1 << 5;
    }
}

/// A declared sub.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubEntry {
    /// Unqualified name.
    pub name: Name,
    /// Package the sub belongs to.
    pub package: Name,
    pub span: Span,
    /// The `SubDecl` node in the declaring file's tree. Only meaningful for
    /// the file version the registry was built from.
    pub node: NodeId,
    /// Declared return value (`#@returns`).
    pub returns: Option<Value>,
    pub flags: SubFlags,
}

/// `use` or `no`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UseKind {
    Use,
    No,
}

/// A `use MODULE LIST` / `no MODULE LIST` statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UseEntry {
    pub module: Name,
    pub kind: UseKind,
    /// Explicit import list. `None` means the module's default exports;
    /// `Some(empty)` is `use Module ()`.
    pub imports: Option<Vec<Name>>,
    pub span: Span,
}

impl UseEntry {
    /// Whether this statement imports `symbol` from a module whose default
    /// export list is `default_exports`.
    pub fn imports_symbol(&self, symbol: Name, default_exports: &[Name]) -> bool {
        if self.kind == UseKind::No {
            return false;
        }
        match &self.imports {
            Some(list) => list.contains(&symbol),
            None => default_exports.contains(&symbol),
        }
    }
}

/// Everything a file declares about one package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageEntry {
    pub name: Name,
    /// The first `package` statement (empty for an implicit `main`).
    pub span: Span,
    /// `package NAME VERSION`.
    pub version: Option<PerlVersion>,
    /// Parents in declaration order.
    pub parents: SmallVec<[Name; 2]>,
    /// `@EXPORT`.
    pub export: Vec<Name>,
    /// `@EXPORT_OK`.
    pub export_ok: Vec<Name>,
    pub uses: Vec<UseEntry>,
    /// Pragmas in effect at the end of the package's last region.
    pub features: FeatureTable,
    subs: Vec<SubEntry>,
    sub_index: FxHashMap<Name, usize>,
}

impl PackageEntry {
    pub fn new(name: Name, span: Span) -> Self {
        PackageEntry {
            name,
            span,
            version: None,
            parents: SmallVec::new(),
            export: Vec::new(),
            export_ok: Vec::new(),
            uses: Vec::new(),
            features: FeatureTable::default(),
            subs: Vec::new(),
            sub_index: FxHashMap::default(),
        }
    }

    /// Subs in declaration order.
    #[inline]
    pub fn subs(&self) -> &[SubEntry] {
        &self.subs
    }

    pub fn sub(&self, name: Name) -> Option<&SubEntry> {
        self.sub_index.get(&name).map(|&i| &self.subs[i])
    }

    /// Add a sub. A second declaration of the same name replaces a forward
    /// declaration and is otherwise ignored.
    pub fn add_sub(&mut self, sub: SubEntry) {
        match self.sub_index.get(&sub.name) {
            Some(&i) if self.subs[i].flags.contains(SubFlags::FORWARD) => self.subs[i] = sub,
            Some(_) => {}
            None => {
                self.sub_index.insert(sub.name, self.subs.len());
                self.subs.push(sub);
            }
        }
    }

    /// Whether `name` is in `@EXPORT` or `@EXPORT_OK`.
    pub fn is_exportable(&self, name: Name) -> bool {
        self.export.contains(&name) || self.export_ok.contains(&name)
    }
}

/// Default and optional export lists of a package.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Exports<'a> {
    pub default: &'a [Name],
    pub optional: &'a [Name],
}

impl Exports<'static> {
    pub const EMPTY: Self = Exports {
        default: &[],
        optional: &[],
    };
}

/// Anything that can find a package by name.
pub trait PackageLookup {
    fn package(&self, name: Name) -> Option<&PackageEntry>;
}

/// Result of [`resolve_method`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MethodResolution<'a> {
    Found {
        /// Package the sub was found in (the invocant's or an ancestor).
        package: Name,
        sub: &'a SubEntry,
    },
    NotFound,
}

impl<'a> MethodResolution<'a> {
    #[inline]
    pub fn sub(self) -> Option<&'a SubEntry> {
        match self {
            MethodResolution::Found { sub, .. } => Some(sub),
            MethodResolution::NotFound => None,
        }
    }

    #[inline]
    pub fn is_found(self) -> bool {
        matches!(self, MethodResolution::Found { .. })
    }
}

/// Find `method` for an invocant of class `package`.
///
/// Depth-first, left to right over declared parents, then `universal`.
/// Inheritance cycles are walked once.
pub fn resolve_method<'a, L: PackageLookup + ?Sized>(
    lookup: &'a L,
    package: Name,
    method: Name,
    universal: Name,
) -> MethodResolution<'a> {
    let mut seen: FxHashSet<Name> = FxHashSet::default();
    let mut stack: SmallVec<[Name; 8]> = SmallVec::new();
    stack.push(package);
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        let Some(entry) = lookup.package(current) else {
            continue;
        };
        if let Some(sub) = entry.sub(method) {
            return MethodResolution::Found {
                package: current,
                sub,
            };
        }
        stack.extend(entry.parents.iter().rev().copied());
    }
    if seen.contains(&universal) {
        return MethodResolution::NotFound;
    }
    match lookup.package(universal).and_then(|e| e.sub(method)) {
        Some(sub) => MethodResolution::Found {
            package: universal,
            sub,
        },
        None => MethodResolution::NotFound,
    }
}

/// Linearised ancestors of `package` (itself first), in resolution order.
pub fn ancestors<L: PackageLookup + ?Sized>(lookup: &L, package: Name) -> Vec<Name> {
    let mut order = Vec::new();
    let mut seen: FxHashSet<Name> = FxHashSet::default();
    let mut stack: SmallVec<[Name; 8]> = SmallVec::new();
    stack.push(package);
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        order.push(current);
        if let Some(entry) = lookup.package(current) {
            stack.extend(entry.parents.iter().rev().copied());
        }
    }
    order
}

/// Read-only package registry of one file version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registry {
    packages: Vec<PackageEntry>,
    index: FxHashMap<Name, usize>,
    main: Name,
    universal: Name,
}

impl Registry {
    /// Packages in order of first declaration.
    #[inline]
    pub fn packages(&self) -> &[PackageEntry] {
        &self.packages
    }

    #[inline]
    pub fn main(&self) -> Name {
        self.main
    }

    #[inline]
    pub fn universal(&self) -> Name {
        self.universal
    }

    /// `@EXPORT` and `@EXPORT_OK` of `package`; empty when unknown.
    pub fn exports(&self, package: Name) -> Exports<'_> {
        self.package(package).map_or(Exports::EMPTY, |p| Exports {
            default: &p.export,
            optional: &p.export_ok,
        })
    }

    /// Declared parents of `package`, in order.
    pub fn parents(&self, package: Name) -> &[Name] {
        self.package(package).map_or(&[][..], |p| p.parents.as_slice())
    }

    pub fn resolve_method(&self, package: Name, method: Name) -> MethodResolution<'_> {
        resolve_method(self, package, method, self.universal)
    }

    /// Sub declared directly in `package`.
    pub fn sub(&self, package: Name, name: Name) -> Option<&SubEntry> {
        self.package(package)?.sub(name)
    }

    /// All subs of the file, package by package.
    pub fn all_subs(&self) -> impl Iterator<Item = &SubEntry> {
        self.packages.iter().flat_map(|p| p.subs.iter())
    }
}

impl PackageLookup for Registry {
    fn package(&self, name: Name) -> Option<&PackageEntry> {
        self.index.get(&name).map(|&i| &self.packages[i])
    }
}

/// Mutable registry under construction. Owned by one parse.
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub fn new(interner: &StringInterner) -> Self {
        RegistryBuilder {
            registry: Registry {
                packages: Vec::new(),
                index: FxHashMap::default(),
                main: interner.intern("main"),
                universal: interner.intern("UNIVERSAL"),
            },
        }
    }

    #[inline]
    pub fn main(&self) -> Name {
        self.registry.main
    }

    /// Entry for `name`, created on first mention.
    pub fn package_mut(&mut self, name: Name) -> &mut PackageEntry {
        let idx = match self.registry.index.get(&name) {
            Some(&idx) => idx,
            None => {
                let idx = self.registry.packages.len();
                self.registry.packages.push(PackageEntry::new(name, Span::DUMMY));
                self.registry.index.insert(name, idx);
                idx
            }
        };
        &mut self.registry.packages[idx]
    }

    /// `package NAME [VERSION]`. Re-opening a package keeps its first span.
    pub fn register_package(&mut self, name: Name, span: Span, version: Option<PerlVersion>) {
        let entry = self.package_mut(name);
        if entry.span == Span::DUMMY {
            entry.span = span;
        }
        if version.is_some() {
            entry.version = version;
        }
    }

    pub fn register_sub(&mut self, sub: SubEntry) {
        self.package_mut(sub.package).add_sub(sub);
    }

    pub fn register_use(&mut self, package: Name, entry: UseEntry) {
        self.package_mut(package).uses.push(entry);
    }

    /// `use parent` / `use base`: append parents, skipping duplicates.
    pub fn add_parents(&mut self, package: Name, parents: &[Name]) {
        let entry = self.package_mut(package);
        for &parent in parents {
            if parent != package && !entry.parents.contains(&parent) {
                entry.parents.push(parent);
            }
        }
    }

    /// `our @ISA = (...)`: replace the parent list.
    pub fn set_parents(&mut self, package: Name, parents: &[Name]) {
        self.package_mut(package).parents.clear();
        self.add_parents(package, parents);
    }

    /// `@EXPORT` (`optional == false`) or `@EXPORT_OK` additions.
    pub fn add_exports(&mut self, package: Name, names: &[Name], optional: bool) {
        let entry = self.package_mut(package);
        let list = if optional {
            &mut entry.export_ok
        } else {
            &mut entry.export
        };
        for &name in names {
            if !list.contains(&name) {
                list.push(name);
            }
        }
    }

    pub fn set_features(&mut self, package: Name, features: FeatureTable) {
        self.package_mut(package).features = features;
    }

    pub fn finish(self) -> Registry {
        debug!(
            packages = self.registry.packages.len(),
            subs = self.registry.all_subs().count(),
            "registry built"
        );
        self.registry
    }
}
