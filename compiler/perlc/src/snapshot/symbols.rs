//! Names visible at a position.

use perl_ir::{Name, NodeId, NodeKind, SyntaxTree, TokenKind};
use perl_types::{PackageEntry, PackageLookup, Registry, UseKind};
use rustc_hash::FxHashSet;

use super::FileSnapshot;

/// A package lookup that can also list the packages it knows.
pub trait PackageIndex: PackageLookup {
    fn package_names(&self) -> Vec<Name>;
}

impl PackageIndex for Registry {
    fn package_names(&self) -> Vec<Name> {
        self.packages().iter().map(|p| p.name).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A `my`/`our`/`state` variable or a signature parameter.
    Lexical,
    /// A sub of the current package.
    Sub,
    /// A name imported by a `use` of `module`.
    Import { module: &'static str },
    Package,
}

/// One visible name. Variables carry their sigil.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

impl Symbol {
    fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Symbol {
            name: name.into(),
            kind,
        }
    }
}

impl FileSnapshot {
    /// Names visible at `offset`, resolving imported modules in this file.
    pub fn visible_symbols(&self, offset: u32) -> Vec<Symbol> {
        self.visible_symbols_with(offset, self.registry())
    }

    /// Names visible at `offset`: lexicals declared before it, subs of the
    /// current package, names imported into it and every known package.
    ///
    /// Modules not declared in this file are looked up in `index`.
    pub fn visible_symbols_with(&self, offset: u32, index: &dyn PackageIndex) -> Vec<Symbol> {
        let mut symbols = self.lexicals_at(offset);
        let package = self.tree().context_at(offset).package;

        if let Some(entry) = self.registry().package(package) {
            symbols.extend(
                entry
                    .subs()
                    .iter()
                    .map(|sub| Symbol::new(self.interner.lookup(sub.name), SymbolKind::Sub)),
            );
            symbols.extend(self.imports(entry, index));
        }

        let mut packages: Vec<&'static str> = self
            .registry()
            .package_names()
            .into_iter()
            .chain(index.package_names())
            .map(|name| self.interner.lookup(name))
            .collect();
        packages.sort_unstable();
        packages.dedup();
        symbols.extend(
            packages
                .into_iter()
                .map(|name| Symbol::new(name, SymbolKind::Package)),
        );

        let mut seen = FxHashSet::default();
        symbols.retain(|symbol| seen.insert(symbol.clone()));
        symbols
    }

    /// A package declared here, else in `index`.
    pub(crate) fn find_package<'a>(
        &'a self,
        index: &'a dyn PackageIndex,
        name: Name,
    ) -> Option<&'a PackageEntry> {
        self.registry()
            .package(name)
            .or_else(|| index.package(name))
    }

    fn imports(&self, entry: &PackageEntry, index: &dyn PackageIndex) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        for use_entry in &entry.uses {
            let module = self.interner.lookup(use_entry.module);
            // Pragmas are lower case and import nothing callable.
            if use_entry.kind == UseKind::No
                || module.starts_with(|c: char| c.is_ascii_lowercase())
            {
                continue;
            }
            let names: Vec<Name> = match &use_entry.imports {
                Some(list) => list.clone(),
                None => self
                    .find_package(index, use_entry.module)
                    .map(|m| m.export.clone())
                    .unwrap_or_default(),
            };
            symbols.extend(
                names
                    .into_iter()
                    .map(|name| self.interner.lookup(name))
                    .filter(|name| !name.starts_with([':', '-']))
                    .map(|name| Symbol::new(name, SymbolKind::Import { module })),
            );
        }
        symbols
    }

    /// Lexical variables in scope at `offset`, declared before it. A
    /// redeclared name appears once.
    fn lexicals_at(&self, offset: u32) -> Vec<Symbol> {
        let tree = self.tree();
        let mut symbols: Vec<Symbol> = Vec::new();
        for node in tree.preorder(tree.root()) {
            if !matches!(
                tree.kind(node),
                NodeKind::ScalarVar | NodeKind::ArrayVar | NodeKind::HashVar
            ) || tree.span(node).end > offset
            {
                continue;
            }
            let visible = declarator(tree, node)
                .and_then(|decl| decl_scope(tree, decl))
                .is_some_and(|scope| tree.span(scope).contains(offset));
            if visible {
                let name = tree.text(node, &self.source);
                if !symbols.iter().any(|s| s.name == name) {
                    symbols.push(Symbol::new(name, SymbolKind::Lexical));
                }
            }
        }
        symbols
    }

    /// Labels of the statements enclosing `offset`, innermost first.
    pub fn labels_at(&self, offset: u32) -> Vec<&'static str> {
        let tree = self.tree();
        let mut labels: Vec<(u32, &'static str)> = tree
            .descendants_of_kind(tree.root(), NodeKind::Label)
            .into_iter()
            .filter_map(|label| {
                let parent = tree.parent(label)?;
                let statement = tree
                    .child_nodes(parent)
                    .skip_while(|&c| c != label)
                    .nth(1)?;
                let span = tree.span(statement);
                span.contains(offset)
                    .then(|| (span.start, self.interner.lookup(tree.name(label))))
            })
            .collect();
        labels.sort_by(|a, b| b.0.cmp(&a.0));
        labels.into_iter().map(|(_, name)| name).collect()
    }
}

/// The `VarDecl` or `Signature` that declares `var`, if any. `local` does
/// not declare.
fn declarator(tree: &SyntaxTree, var: NodeId) -> Option<NodeId> {
    let mut current = var;
    loop {
        let parent = tree.parent(current)?;
        match tree.kind(parent) {
            NodeKind::ParenList | NodeKind::ListExpr => current = parent,
            NodeKind::AssignExpr if tree.child_nodes(parent).next() == Some(current) => {
                current = parent;
            }
            NodeKind::VarDecl => {
                let keyword = tree.first_token(parent).map(|t| t.kind);
                return (keyword != Some(TokenKind::KwLocal)).then_some(parent);
            }
            NodeKind::Signature => return Some(parent),
            _ => return None,
        }
    }
}

/// Region a declaration is visible in.
fn decl_scope(tree: &SyntaxTree, declarator: NodeId) -> Option<NodeId> {
    if tree.kind(declarator) == NodeKind::Signature {
        return tree.parent(declarator);
    }
    tree.ancestors(declarator).find(|&a| {
        matches!(
            tree.kind(a),
            NodeKind::Block
                | NodeKind::File
                | NodeKind::ForStmt
                | NodeKind::WhileStmt
                | NodeKind::IfStmt
                | NodeKind::ForeachStmt
        )
    })
}
