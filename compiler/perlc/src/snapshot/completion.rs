//! Data for completion lists.
//!
//! Everything here is computed on request from the snapshot; nothing is
//! pushed to the caller.

use perl_ir::{Name, NodeId, NodeKind, TokenKind};
use perl_lexer::AnnotationKind;
use perl_types::{PackageLookup, SubFlags};

use super::{FileSnapshot, PackageIndex};

/// Strings `ref` returns for unblessed references.
pub const REFERENCE_TYPES: &[&str] = &[
    "ARRAY", "CODE", "FORMAT", "GLOB", "HASH", "IO", "LVALUE", "REF", "Regexp", "SCALAR",
    "VSTRING",
];

/// Names that may follow `#@`.
pub fn annotation_names() -> [&'static str; AnnotationKind::ALL.len()] {
    AnnotationKind::ALL.map(AnnotationKind::name)
}

/// What `use MODULE` can import.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportCandidates {
    /// `@EXPORT`: imported without a list.
    pub default: Vec<&'static str>,
    /// `@EXPORT_OK`: imported on request.
    pub optional: Vec<&'static str>,
}

impl FileSnapshot {
    /// Literal keys used in hash subscripts and anonymous hashes of this
    /// file, sorted.
    pub fn hash_keys(&self) -> Vec<String> {
        let tree = self.tree();
        let mut keys = Vec::new();
        for node in tree.preorder(tree.root()) {
            match tree.kind(node) {
                NodeKind::HashElement | NodeKind::DerefHashElement => {
                    if let Some(key) = tree.child_nodes(node).next_back() {
                        keys.extend(self.literal_key(key));
                    }
                }
                NodeKind::AnonHash => {
                    let items = self.pair_items(node);
                    keys.extend(
                        items
                            .iter()
                            .step_by(2)
                            .filter_map(|&key| self.literal_key(key)),
                    );
                }
                _ => {}
            }
        }
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Items of an anonymous hash, nested lists flattened.
    fn pair_items(&self, node: NodeId) -> Vec<NodeId> {
        let tree = self.tree();
        let mut items = Vec::new();
        let mut stack: Vec<NodeId> = tree.child_nodes(node).rev().collect();
        while let Some(current) = stack.pop() {
            match tree.kind(current) {
                NodeKind::ParenList | NodeKind::ListExpr => {
                    stack.extend(tree.child_nodes(current).rev());
                }
                _ => items.push(current),
            }
        }
        items
    }

    /// Text of a bareword or non-interpolating string used as a key.
    fn literal_key(&self, node: NodeId) -> Option<String> {
        let tree = self.tree();
        match tree.kind(node) {
            NodeKind::Bareword => Some(tree.text(node, &self.source).to_owned()),
            NodeKind::StringLit if tree.child_nodes(node).next().is_none() => {
                let key: String = tree
                    .child_tokens(node)
                    .filter(|(_, token)| token.kind == TokenKind::StringContent)
                    .map(|(_, token)| token.text(&self.source))
                    .collect();
                (!key.is_empty()).then_some(key)
            }
            _ => None,
        }
    }

    /// Terminator names of the heredocs in this file, sorted.
    pub fn heredoc_openers(&self) -> Vec<&str> {
        let mut markers: Vec<&str> = self
            .lex
            .tokens
            .iter()
            .filter(|token| token.kind == TokenKind::HeredocOpener)
            .map(|token| {
                token
                    .text(&self.source)
                    .trim_start_matches('<')
                    .trim_start_matches('~')
                    .trim_start()
                    .trim_start_matches('\\')
                    .trim_matches(|c| c == '"' || c == '\'')
            })
            .filter(|marker| !marker.is_empty())
            .collect();
        markers.sort_unstable();
        markers.dedup();
        markers
    }

    /// Subs of the package at `offset` that can go in its `@EXPORT` or
    /// `@EXPORT_OK`: public, with a body or constant.
    pub fn exportable_at(&self, offset: u32) -> Vec<&'static str> {
        let package = self.tree().context_at(offset).package;
        let Some(entry) = self.registry().package(package) else {
            return Vec::new();
        };
        let mut names: Vec<&'static str> = entry
            .subs()
            .iter()
            .filter(|sub| !sub.flags.contains(SubFlags::FORWARD))
            .map(|sub| self.interner.lookup(sub.name))
            .filter(|name| !name.starts_with('_'))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// What `use module` can import, looking the module up here first and
    /// then in `index`.
    pub fn import_candidates(&self, module: &str, index: &dyn PackageIndex) -> ImportCandidates {
        let Some(name) = self.interner.get(module) else {
            return ImportCandidates::default();
        };
        let Some(entry) = self.find_package(index, name) else {
            return ImportCandidates::default();
        };
        let lookup = |names: &[Name]| -> Vec<&'static str> {
            names.iter().map(|&n| self.interner.lookup(n)).collect()
        };
        ImportCandidates {
            default: lookup(&entry.export),
            optional: lookup(&entry.export_ok),
        }
    }
}
