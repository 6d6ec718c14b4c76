//! Variables: which declaration a use refers to, and which assignments
//! reach it.
//!
//! Lexicals (`my`, `state`, signature parameters, loop variables) are
//! resolved flow-sensitively: starting from the last unconditional
//! assignment before the use, the values of all later assignments that
//! precede it are merged. Package variables have no such order and merge
//! every assignment in the file.

use perl_ir::{Name, NodeId, NodeKind, SyntaxTree, TokenKind};
use perl_types::{ScalarKind, SubFlags, Value};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

use super::constructors::flatten;
use super::Engine;
use crate::Visited;

/// A variable as the occurrence index groups them: `$x[0]` and `@x` share
/// `(ArrayVar, x)`.
pub(super) type VarKey = (NodeKind, Name);

/// Functions that bind `$_` for their block argument.
const TOPIC_BLOCK_CALLS: &[&str] = &["map", "grep", "sort", "first", "any", "all", "none"];

/// Every variable occurrence of a file, grouped by variable, in source order.
#[derive(Debug, Default)]
pub(super) struct VarIndex {
    occurrences: FxHashMap<VarKey, Vec<NodeId>>,
}

impl VarIndex {
    fn build(tree: &SyntaxTree) -> Self {
        let mut occurrences: FxHashMap<VarKey, Vec<NodeId>> = FxHashMap::default();
        for node in tree.preorder(tree.root()) {
            if let Some(key) = var_key(tree, node) {
                occurrences.entry(key).or_default().push(node);
            }
        }
        VarIndex { occurrences }
    }

    fn get(&self, key: VarKey) -> &[NodeId] {
        self.occurrences.get(&key).map_or(&[][..], Vec::as_slice)
    }
}

fn var_key(tree: &SyntaxTree, node: NodeId) -> Option<VarKey> {
    let name = tree.name(node);
    let kind = match tree.kind(node) {
        NodeKind::ScalarVar => NodeKind::ScalarVar,
        NodeKind::ArrayVar | NodeKind::ArrayElement | NodeKind::ArrayLastIndex => {
            NodeKind::ArrayVar
        }
        NodeKind::HashVar | NodeKind::HashElement => NodeKind::HashVar,
        NodeKind::ArraySlice if !name.is_empty() => NodeKind::ArrayVar,
        NodeKind::HashSlice if !name.is_empty() => NodeKind::HashVar,
        _ => return None,
    };
    Some((kind, name))
}

/// How an occurrence gives its variable a value.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Definition {
    /// Target of `=` or a compound assignment.
    Assign(NodeId),
    /// `$a[0] = ...` / `$h{k} = ...`: adds to the container.
    Element(NodeId),
    /// `my $x;` without initializer.
    Declare(NodeId),
    /// First argument of `bless`.
    Bless(NodeId),
    /// First argument of `push`/`unshift`: adds to the array.
    Push(NodeId),
    /// `foreach my $x (LIST)`.
    Loop(NodeId),
    /// Signature parameter without default.
    Param(NodeId),
}

impl Definition {
    /// Whether the definition replaces everything assigned before it.
    fn kills(self) -> bool {
        !matches!(self, Definition::Element(_) | Definition::Push(_))
    }
}

/// The declaration a use binds to.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct Binding {
    /// The declared occurrence.
    occurrence: NodeId,
    /// `VarDecl`, `Signature` or `ForeachStmt`.
    declarator: NodeId,
}

impl Engine<'_> {
    fn vars(&self) -> &VarIndex {
        self.vars.get_or_init(|| VarIndex::build(self.tree()))
    }

    /// A variable node: its own definition if it is assigned here,
    /// otherwise whatever reaches it.
    pub(super) fn variable(&self, node: NodeId, v: &mut Visited) -> Value {
        let tree = self.tree();
        let key = (tree.kind(node), tree.name(node));
        match self.definition(node) {
            Some(Definition::Bless(_) | Definition::Push(_)) | None => self.resolve(node, key, v),
            Some(definition) => {
                if let Some(declared) = self
                    .declaration(node, key)
                    .and_then(|b| self.parse.declared_type(b.declarator))
                {
                    return declared.clone();
                }
                self.define(definition, node, v)
            }
        }
    }

    /// The value `key` holds at `site`.
    pub(super) fn resolve(&self, site: NodeId, key: VarKey, v: &mut Visited) -> Value {
        let name = self.interner.lookup(key.1);
        if let Some(binding) = self.declaration(site, key) {
            if !self.is_our(binding.declarator) {
                return self.lexical(site, key, binding, v);
            }
        }
        match key {
            (NodeKind::ScalarVar, _) => {
                if let Some(topic) = self.topic(site, name, v) {
                    return topic;
                }
            }
            (NodeKind::ArrayVar, _) if name == "_" => return Value::Array(None),
            _ => {}
        }
        if let Some(special) = special_variable(key.0, name) {
            return special;
        }
        self.global(site, key, v)
    }

    // === Declarations ===

    /// `VarDecl`, `Signature` or `ForeachStmt` that declares the variable
    /// at `var`, if `var` is a declared occurrence.
    fn declarator(&self, var: NodeId) -> Option<NodeId> {
        let tree = self.tree();
        let mut current = var;
        loop {
            let parent = tree.parent(current)?;
            match tree.kind(parent) {
                NodeKind::ParenList | NodeKind::ListExpr => current = parent,
                NodeKind::AssignExpr
                    if tree.child_nodes(parent).next() == Some(current)
                        && self.in_signature(parent) =>
                {
                    current = parent;
                }
                NodeKind::VarDecl => {
                    let keyword = tree.first_token(parent).map(|t| t.kind);
                    return (keyword != Some(TokenKind::KwLocal)).then_some(parent);
                }
                NodeKind::Signature => return Some(parent),
                NodeKind::ForeachStmt => {
                    let children: SmallVec<[NodeId; 3]> = tree.child_nodes(parent).collect();
                    return (children.len() == 3 && children[0] == current).then_some(parent);
                }
                _ => return None,
            }
        }
    }

    fn in_signature(&self, node: NodeId) -> bool {
        let tree = self.tree();
        tree.ancestors(node)
            .find(|&a| !matches!(tree.kind(a), NodeKind::ListExpr | NodeKind::ParenList))
            .is_some_and(|a| tree.kind(a) == NodeKind::Signature)
    }

    fn is_our(&self, declarator: NodeId) -> bool {
        let tree = self.tree();
        tree.kind(declarator) == NodeKind::VarDecl
            && tree.first_token(declarator).map(|t| t.kind) == Some(TokenKind::KwOur)
    }

    /// Region a declaration is visible in.
    fn decl_scope(&self, declarator: NodeId) -> Option<NodeId> {
        let tree = self.tree();
        match tree.kind(declarator) {
            NodeKind::ForeachStmt => Some(declarator),
            NodeKind::Signature => tree.parent(declarator),
            _ => tree.ancestors(declarator).find(|&a| {
                matches!(
                    tree.kind(a),
                    NodeKind::Block
                        | NodeKind::File
                        | NodeKind::ForStmt
                        | NodeKind::WhileStmt
                        | NodeKind::IfStmt
                        | NodeKind::ForeachStmt
                )
            }),
        }
    }

    /// The declaration `site` refers to: the latest declared occurrence
    /// before it whose scope contains it.
    fn declaration(&self, site: NodeId, key: VarKey) -> Option<Binding> {
        let tree = self.tree();
        let site_span = tree.span(site);
        for &occurrence in self.vars().get(key).iter().rev() {
            if tree.span(occurrence).start > site_span.start {
                continue;
            }
            let Some(declarator) = self.declarator(occurrence) else {
                continue;
            };
            let Some(scope) = self.decl_scope(declarator) else {
                continue;
            };
            if !tree.span(scope).contains_span(site_span) {
                continue;
            }
            // `my $x = $x;`: the right side still sees the outer `$x`.
            if let Some(assign) = tree.parent(declarator) {
                if tree.kind(assign) == NodeKind::AssignExpr
                    && tree.span(assign).contains_span(site_span)
                    && !tree.span(declarator).contains_span(site_span)
                {
                    continue;
                }
            }
            return Some(Binding {
                occurrence,
                declarator,
            });
        }
        None
    }

    // === Definitions ===

    /// The `AssignExpr` whose left side `node` is part of.
    pub(super) fn assignment_target(&self, node: NodeId) -> Option<NodeId> {
        let tree = self.tree();
        let mut current = node;
        loop {
            let parent = tree.parent(current)?;
            match tree.kind(parent) {
                NodeKind::VarDecl | NodeKind::ParenList | NodeKind::ListExpr => current = parent,
                NodeKind::AssignExpr => {
                    return (tree.child_nodes(parent).next() == Some(current)).then_some(parent);
                }
                _ => return None,
            }
        }
    }

    fn definition(&self, occurrence: NodeId) -> Option<Definition> {
        let tree = self.tree();
        let kind = tree.kind(occurrence);
        if let Some(assign) = self.assignment_target(occurrence) {
            return Some(match kind {
                NodeKind::ArrayElement | NodeKind::HashElement => Definition::Element(assign),
                _ => Definition::Assign(assign),
            });
        }
        if !matches!(kind, NodeKind::ScalarVar | NodeKind::ArrayVar | NodeKind::HashVar) {
            return None;
        }
        if let Some(declarator) = self.declarator(occurrence) {
            return match tree.kind(declarator) {
                NodeKind::Signature => Some(Definition::Param(declarator)),
                NodeKind::ForeachStmt => Some(Definition::Loop(declarator)),
                _ => match tree.parent(declarator).map(|p| tree.kind(p)) {
                    Some(NodeKind::ForeachStmt) => tree.parent(declarator).map(Definition::Loop),
                    _ => Some(Definition::Declare(declarator)),
                },
            };
        }
        let (call, position) = self.call_argument(occurrence)?;
        match (self.name_of(call), position, kind) {
            ("bless", 0, _) => Some(Definition::Bless(call)),
            ("push" | "unshift", 0, NodeKind::ArrayVar) => Some(Definition::Push(call)),
            _ => None,
        }
    }

    /// The call `node` is a direct argument of, with its position.
    fn call_argument(&self, node: NodeId) -> Option<(NodeId, usize)> {
        let tree = self.tree();
        let parent = tree.parent(node)?;
        let (args, position) = match tree.kind(parent) {
            NodeKind::ListExpr => (tree.parent(parent)?, tree.child_position(node)?),
            NodeKind::Args => (parent, tree.child_position(node)?),
            _ => return None,
        };
        let call = tree.parent(args)?;
        (tree.kind(args) == NodeKind::Args && tree.kind(call) == NodeKind::Call)
            .then_some((call, position))
    }

    /// Where a definition happens, for ordering against uses.
    fn def_site(&self, definition: Definition, occurrence: NodeId) -> NodeId {
        match definition {
            Definition::Assign(site)
            | Definition::Element(site)
            | Definition::Declare(site)
            | Definition::Bless(site)
            | Definition::Push(site) => site,
            Definition::Loop(_) | Definition::Param(_) => occurrence,
        }
    }

    /// The value a definition gives its variable, computed directly.
    fn define(&self, definition: Definition, occurrence: NodeId, v: &mut Visited) -> Value {
        let tree = self.tree();
        match definition {
            Definition::Assign(assign) => self.assigned_to(assign, occurrence, v),
            Definition::Element(assign) => self.assigned_to(assign, occurrence, v),
            Definition::Declare(_) => match tree.kind(occurrence) {
                NodeKind::ArrayVar => Value::Array(None),
                NodeKind::HashVar => Value::Hash(None),
                _ => Value::Undef,
            },
            Definition::Bless(call) => self.infer_value(call, v),
            Definition::Push(call) => {
                let (_, items) = self.call_args(call);
                Value::array_of(self.elements(items.get(1..).unwrap_or_default(), v))
            }
            Definition::Loop(foreach) => match tree.child_nodes(foreach).nth(1) {
                Some(list) => flatten(&self.infer_value(list, v)),
                None => Value::Unknown,
            },
            Definition::Param(signature) => {
                let items = self.content_items(signature);
                match items.iter().position(|&item| item == occurrence) {
                    Some(position) => self.argument(signature, position),
                    None => Value::Unknown,
                }
            }
        }
    }

    /// The value a definition contributes at a use elsewhere. Goes through
    /// the visited set so that definitions depending on each other stop.
    fn contribution(&self, definition: Definition, occurrence: NodeId, v: &mut Visited) -> Value {
        match definition {
            Definition::Assign(_) | Definition::Loop(_) | Definition::Param(_) => {
                self.infer_value(occurrence, v)
            }
            Definition::Element(_) => {
                let value = self.infer_value(occurrence, v);
                match self.tree().kind(occurrence) {
                    NodeKind::ArrayElement => Value::array_of(value),
                    _ => Value::hash_of(value),
                }
            }
            Definition::Declare(_) | Definition::Bless(_) | Definition::Push(_) => {
                self.define(definition, occurrence, v)
            }
        }
    }

    // === Resolution ===

    /// Reaching definitions of a lexical.
    fn lexical(&self, site: NodeId, key: VarKey, binding: Binding, v: &mut Visited) -> Value {
        if let Some(declared) = self.parse.declared_type(binding.declarator) {
            return declared.clone();
        }
        let tree = self.tree();
        let site_start = tree.span(site).start;
        let defs: Vec<(Definition, NodeId)> = self
            .vars()
            .get(key)
            .iter()
            .filter(|&&o| tree.span(o).start >= tree.span(binding.occurrence).start)
            .filter_map(|&o| self.definition(o).map(|d| (d, o)))
            .filter(|&(d, o)| tree.span(self.def_site(d, o)).end <= site_start)
            .filter(|&(_, o)| {
                self.declaration(o, key).map(|b| b.occurrence) == Some(binding.occurrence)
            })
            .collect();
        let start = defs
            .iter()
            .rposition(|&(d, o)| d.kills() && self.unconditional(self.def_site(d, o), site))
            .unwrap_or(0);
        let values: Vec<Value> = defs[start..]
            .iter()
            .map(|&(d, o)| self.contribution(d, o, v))
            .collect();
        normalize(Value::merge_all(values))
    }

    /// Every definition of a package variable, wherever it is.
    fn global(&self, site: NodeId, key: VarKey, v: &mut Visited) -> Value {
        let tree = self.tree();
        let site_span = tree.span(site);
        let defs: Vec<(Definition, NodeId)> = self
            .vars()
            .get(key)
            .iter()
            .filter_map(|&o| self.definition(o).map(|d| (d, o)))
            .filter(|&(d, _)| !matches!(d, Definition::Declare(_)))
            .filter(|&(d, o)| !tree.span(self.def_site(d, o)).contains_span(site_span))
            .filter(|&(_, o)| {
                self.declaration(o, key)
                    .map_or(true, |b| self.is_our(b.declarator))
            })
            .collect();
        if defs.is_empty() {
            trace!(name = self.interner.lookup(key.1), "no definitions");
        }
        let values: Vec<Value> = defs
            .iter()
            .map(|&(d, o)| self.contribution(d, o, v))
            .collect();
        normalize(Value::merge_all(values))
    }

    /// Whether `def_site` runs on every path to `site`: its statement has
    /// no modifier and sits in a block that also contains `site`.
    fn unconditional(&self, def_site: NodeId, site: NodeId) -> bool {
        let tree = self.tree();
        let Some(statement) = std::iter::once(def_site)
            .chain(tree.ancestors(def_site))
            .find(|&n| tree.kind(n).is_statement())
        else {
            return false;
        };
        if tree.child_of_kind(statement, NodeKind::StatementModifier).is_some() {
            return false;
        }
        tree.parent(statement)
            .is_some_and(|container| tree.span(container).contains_span(tree.span(site)))
    }

    // === Arguments and topics ===

    /// The `index`-th argument of the sub around `site`. Only the invocant
    /// of a method is known.
    pub(super) fn argument(&self, site: NodeId, index: usize) -> Value {
        let tree = self.tree();
        let Some(sub) = tree
            .ancestors(site)
            .find(|&a| matches!(tree.kind(a), NodeKind::SubDecl | NodeKind::AnonSub))
        else {
            return Value::Unknown;
        };
        if index != 0 || tree.kind(sub) != NodeKind::SubDecl {
            return Value::Unknown;
        }
        match self.registry().all_subs().find(|s| s.node == sub) {
            Some(entry) if entry.flags.contains(SubFlags::METHOD) => {
                Value::object(self.interner.lookup(entry.package))
            }
            _ => Value::Unknown,
        }
    }

    /// `$_` (and `$a`/`$b` in a sort block) bound by an enclosing loop or
    /// list function.
    fn topic(&self, site: NodeId, name: &str, v: &mut Visited) -> Option<Value> {
        if !matches!(name, "_" | "a" | "b") {
            return None;
        }
        let tree = self.tree();
        let site_span = tree.span(site);
        let mut child = site;
        for ancestor in tree.ancestors(site) {
            match tree.kind(ancestor) {
                NodeKind::SubDecl | NodeKind::AnonSub => return None,
                NodeKind::ForeachStmt if name == "_" => {
                    let children: SmallVec<[NodeId; 3]> = tree.child_nodes(ancestor).collect();
                    if children.len() == 2 && children[0] != child {
                        return Some(flatten(&self.infer_value(children[0], v)));
                    }
                }
                NodeKind::WhileStmt if name == "_" => {
                    let condition = tree.child_nodes(ancestor).next();
                    if condition.is_some_and(|c| c != child && tree.kind(c) == NodeKind::ReadLine) {
                        return Some(Value::Scalar(ScalarKind::String));
                    }
                }
                NodeKind::Block => {
                    if let Some(call) = self.block_call(ancestor) {
                        let callee = self.name_of(call);
                        let binds = if name == "_" {
                            TOPIC_BLOCK_CALLS.contains(&callee)
                        } else {
                            callee == "sort"
                        };
                        if binds {
                            let (_, items) = self.call_args(call);
                            return Some(self.elements(&items, v));
                        }
                    }
                }
                NodeKind::ExprStmt if name == "_" => {
                    if let Some(modifier) =
                        tree.child_of_kind(ancestor, NodeKind::StatementModifier)
                    {
                        let keyword = tree.first_token(modifier).map(|t| t.kind);
                        if matches!(keyword, Some(TokenKind::KwFor | TokenKind::KwForeach))
                            && !tree.span(modifier).contains_span(site_span)
                        {
                            let list = tree.child_nodes(modifier).next();
                            return Some(list.map_or(Value::Unknown, |l| {
                                flatten(&self.infer_value(l, v))
                            }));
                        }
                    }
                }
                _ => {}
            }
            child = ancestor;
        }
        None
    }

    /// The call whose leading block argument is `block`.
    fn block_call(&self, block: NodeId) -> Option<NodeId> {
        let tree = self.tree();
        let args = tree.parent(block)?;
        if tree.kind(args) != NodeKind::Args || tree.child_nodes(args).next() != Some(block) {
            return None;
        }
        tree.parent(args).filter(|&c| tree.kind(c) == NodeKind::Call)
    }
}

/// Merged containers of one kind collapse to one container of the merged
/// contents.
fn normalize(value: Value) -> Value {
    let shapes = value.shapes();
    if shapes.len() < 2 {
        return value;
    }
    if shapes.iter().all(|s| matches!(s, Value::Array(_))) {
        Value::array_of(value.element())
    } else if shapes.iter().all(|s| matches!(s, Value::Hash(_))) {
        Value::hash_of(value.hash_value())
    } else {
        value
    }
}

/// Variables perl sets up itself.
fn special_variable(kind: NodeKind, name: &str) -> Option<Value> {
    let string = || Value::Scalar(ScalarKind::String);
    Some(match (kind, name) {
        (NodeKind::HashVar, "ENV" | "INC") => Value::hash_of(string()),
        (NodeKind::ArrayVar, "ARGV" | "INC") => Value::array_of(string()),
        (NodeKind::ScalarVar, "0") => string(),
        (NodeKind::ScalarVar, "@" | "!") => Value::SCALAR,
        (NodeKind::ScalarVar, "$") => Value::Scalar(ScalarKind::Number),
        _ => return None,
    })
}
