//! Calls: builtins, named subs, methods, code references and the sub
//! summaries behind them.

use perl_ir::visitor::{walk, WalkControl};
use perl_ir::{NodeId, NodeKind};
use perl_types::{resolve_method, PackageLookup, ScalarKind, SubEntry, SubFlags, Value};
use tracing::{debug, trace};

use super::constructors::flatten;
use super::Engine;
use crate::builtins::{builtin, Builtin, BuiltinReturn};
use crate::{SummaryKey, Visited};

impl Engine<'_> {
    /// Leading block argument and flattened list arguments of a call.
    pub(super) fn call_args(&self, call: NodeId) -> (Option<NodeId>, Vec<NodeId>) {
        let tree = self.tree();
        let Some(args) = tree.child_of_kind(call, NodeKind::Args) else {
            return (None, Vec::new());
        };
        let mut children = tree.child_nodes(args).peekable();
        let block = children.next_if(|&c| tree.kind(c) == NodeKind::Block);
        let items = children.flat_map(|c| self.list_items(c)).collect();
        (block, items)
    }

    pub(super) fn call(&self, node: NodeId, v: &mut Visited) -> Value {
        let name = self.name_of(node);
        let core = name
            .strip_prefix("CORE::GLOBAL::")
            .or_else(|| name.strip_prefix("CORE::"));
        if core.is_some() || !name.contains("::") {
            if let Some(builtin) = builtin(core.unwrap_or(name)) {
                return self.builtin_call(node, builtin, v);
            }
        }
        match self.resolve_function(node, name) {
            Some(sub) => self.sub_value(sub),
            None => {
                trace!(name, "unresolved call");
                Value::Unknown
            }
        }
    }

    fn builtin_call(&self, node: NodeId, builtin: &Builtin, v: &mut Visited) -> Value {
        let tree = self.tree();
        let (block, items) = self.call_args(node);
        match builtin.returns {
            BuiltinReturn::Scalar(kind) => Value::Scalar(kind),
            BuiltinReturn::List(kind) => Value::array_of(Value::Scalar(kind)),
            BuiltinReturn::Element => match items.first() {
                Some(&array)
                    if !(tree.kind(array) == NodeKind::ArrayVar && self.name_of(array) == "_") =>
                {
                    self.infer_value(array, v).element()
                }
                _ => self.implicit_shift(node, builtin.name),
            },
            BuiltinReturn::Elements => {
                let list = match (builtin.name, block) {
                    ("splice", _) => {
                        return match items.first() {
                            Some(&array) => Value::array_of(self.infer_value(array, v).element()),
                            None => Value::Array(None),
                        };
                    }
                    // `grep EXPR, LIST`
                    ("grep", None) => items.get(1..).unwrap_or_default(),
                    _ => &items[..],
                };
                Value::array_of(self.elements(list, v))
            }
            BuiltinReturn::HashValues => match items.first() {
                Some(&hash) => Value::array_of(self.infer_value(hash, v).hash_value()),
                None => Value::Array(None),
            },
            BuiltinReturn::BlockResults => {
                let result = match (block, items.first()) {
                    (Some(block), _) => self.block_value(block, v),
                    (None, Some(&expr)) => self.infer_value(expr, v),
                    (None, None) => Value::Unknown,
                };
                Value::array_of(flatten(&result))
            }
            BuiltinReturn::Bless => self.bless(node, &items, v),
            BuiltinReturn::Undef => Value::Undef,
            BuiltinReturn::Unknown => Value::Unknown,
        }
    }

    /// `shift`/`pop` without an array: `@_` inside a sub, `@ARGV` outside.
    fn implicit_shift(&self, node: NodeId, name: &str) -> Value {
        let tree = self.tree();
        let Some(sub) = self.enclosing_sub(node) else {
            return Value::Scalar(ScalarKind::String);
        };
        if name != "shift" {
            return Value::Unknown;
        }
        let start = tree.span(node).start;
        let index = tree
            .descendants_of_kind(sub, NodeKind::Call)
            .into_iter()
            .filter(|&c| tree.span(c).start < start && self.name_of(c) == "shift")
            .filter(|&c| self.enclosing_sub(c) == Some(sub))
            .filter(|&c| {
                let (_, items) = self.call_args(c);
                match items.as_slice() {
                    [] => true,
                    [only] => tree.kind(*only) == NodeKind::ArrayVar && self.name_of(*only) == "_",
                    _ => false,
                }
            })
            .count();
        self.argument(node, index)
    }

    fn enclosing_sub(&self, node: NodeId) -> Option<NodeId> {
        let tree = self.tree();
        tree.ancestors(node)
            .find(|&a| matches!(tree.kind(a), NodeKind::SubDecl | NodeKind::AnonSub))
    }

    /// `bless REF, CLASS`.
    fn bless(&self, node: NodeId, items: &[NodeId], v: &mut Visited) -> Value {
        let Some(&target) = items.first() else {
            return Value::Unknown;
        };
        let value = self.infer_value(target, v);
        let class = match items.get(1) {
            Some(&class) => self.class_name(class, v),
            None => self.interner.lookup(self.current_package(node)).to_owned(),
        };
        if value.is_unknown() {
            Value::object(&class)
        } else {
            value.blessed_copy(&class)
        }
    }

    /// Class a class-name expression stands for: a literal, the class of
    /// an object, or the current package.
    fn class_name(&self, node: NodeId, v: &mut Visited) -> String {
        if let Some(class) = self.literal_class(node) {
            return class;
        }
        let value = self.infer_value(node, v);
        match value.packages().first() {
            Some(package) => (*package).to_owned(),
            None => self.interner.lookup(self.current_package(node)).to_owned(),
        }
    }

    fn literal_class(&self, node: NodeId) -> Option<String> {
        match self.tree().kind(node) {
            NodeKind::Bareword | NodeKind::CurrentPackage => {
                Some(self.name_of(node).trim_end_matches("::").to_owned())
            }
            NodeKind::StringLit => self.string_literal(node),
            _ => None,
        }
    }

    // === Named subs ===

    /// The sub a function call names: qualified names look in that package
    /// only, others in the current package and then in what it imports.
    fn resolve_function(&self, node: NodeId, name: &str) -> Option<&SubEntry> {
        if let Some((package, short)) = name.rsplit_once("::") {
            let package = if package.is_empty() { "main" } else { package };
            let entry = self.scope.package(self.interner.get(package)?)?;
            return entry.sub(self.interner.get(short)?);
        }
        let short = self.interner.get(name)?;
        let entry = self.scope.package(self.current_package(node))?;
        if let Some(sub) = entry.sub(short) {
            return Some(sub);
        }
        entry.uses.iter().find_map(|import| {
            let module = self.scope.package(import.module)?;
            if import.imports_symbol(short, &module.export) {
                module.sub(short)
            } else {
                None
            }
        })
    }

    /// What calling `sub` returns.
    fn sub_value(&self, sub: &SubEntry) -> Value {
        if let Some(returns) = &sub.returns {
            return returns.clone();
        }
        if sub.flags.contains(SubFlags::CONSTANT) {
            return Value::SCALAR;
        }
        let local = self
            .registry()
            .package(sub.package)
            .and_then(|p| p.sub(sub.name))
            .is_some_and(|s| std::ptr::eq(s, sub));
        if local {
            if sub.flags.contains(SubFlags::FORWARD) {
                return Value::Unknown;
            }
            return self.summary(sub.node);
        }
        self.scope
            .external
            .and_then(|ext| ext.sub_returns(sub, &self.cancel))
            .unwrap_or_default()
    }

    /// Merged return value of the sub or anonymous sub declared at `decl`,
    /// computed once per snapshot.
    pub fn summary(&self, decl: NodeId) -> Value {
        let tree = self.tree();
        if tree.get(decl).is_none() {
            return Value::Unknown;
        }
        let key = SummaryKey::new(decl, tree.node_context(decl).features);
        self.cache.get_or_compute(key, || self.compute_summary(decl))
    }

    #[tracing::instrument(level = "debug", skip(self), fields(sub = self.name_of(decl)))]
    fn compute_summary(&self, decl: NodeId) -> Option<Value> {
        let tree = self.tree();
        let Some(body) = tree.child_of_kind(decl, NodeKind::Block) else {
            return Some(Value::Unknown);
        };
        let mut returns = Vec::new();
        walk(tree, body, |node| match tree.kind(node) {
            NodeKind::SubDecl | NodeKind::AnonSub => WalkControl::SkipChildren,
            NodeKind::Return => {
                returns.push(node);
                WalkControl::Continue
            }
            _ => WalkControl::Continue,
        });

        let mut visited = Visited::new();
        let mut values: Vec<Value> = returns
            .iter()
            .map(|&ret| match tree.child_nodes(ret).next() {
                Some(expr) => self.infer_value(expr, &mut visited),
                None => Value::Undef,
            })
            .collect();
        // The last statement's value is returned implicitly.
        if let Some(last) = tree.child_nodes(body).next_back() {
            if tree.kind(last) == NodeKind::ExprStmt
                && tree.child_of_kind(last, NodeKind::StatementModifier).is_none()
            {
                if let Some(expr) = tree.child_nodes(last).next() {
                    if tree.kind(expr) != NodeKind::Return {
                        values.push(self.infer_value(expr, &mut visited));
                    }
                }
            }
        }
        if self.cancel.is_cancelled() {
            return None;
        }
        debug!(returns = returns.len(), cycles = visited.cycles(), "summary computed");
        Some(Value::merge_all(values).truncated(self.options.max_depth))
    }

    pub(super) fn sub_decl(&self, node: NodeId) -> Value {
        let qualified = self
            .registry()
            .all_subs()
            .find(|s| s.node == node)
            .map(|s| self.qualified(s));
        Value::code(qualified.as_deref(), self.summary(node))
    }

    pub(super) fn anon_sub(&self, node: NodeId) -> Value {
        Value::code(None, self.summary(node))
    }

    /// `\&name` / `&name`.
    pub(super) fn code_var(&self, node: NodeId) -> Value {
        let name = self.name_of(node);
        match self.resolve_function(node, name) {
            Some(sub) => Value::code(Some(&self.qualified(sub)), self.sub_value(sub)),
            None => Value::code(Some(name), Value::Unknown),
        }
    }

    fn qualified(&self, sub: &SubEntry) -> String {
        format!(
            "{}::{}",
            self.interner.lookup(sub.package),
            self.interner.lookup(sub.name)
        )
    }

    // === Methods ===

    pub(super) fn method_call(&self, node: NodeId, v: &mut Visited) -> Value {
        let tree = self.tree();
        let method = self.name_of(node);
        if method.is_empty() {
            // `$obj->$method()`
            return Value::Unknown;
        }
        let Some(invocant) = tree.child_nodes(node).next() else {
            return Value::Unknown;
        };
        let (is_super, method) = match method.strip_prefix("SUPER::") {
            Some(rest) => (true, rest),
            None => (false, method),
        };
        let Some(method_name) = self.interner.get(method) else {
            return Value::Unknown;
        };
        let mut classes = self.invocant_classes(invocant, v);
        let current = self.current_package(node);
        if classes.is_empty() && is_super {
            classes.push(self.interner.lookup(current).to_owned());
        }
        let universal = self.registry().universal();

        let mut values = Vec::with_capacity(classes.len());
        for class in &classes {
            let found = if is_super {
                self.scope
                    .package(current)
                    .into_iter()
                    .flat_map(|p| p.parents.iter())
                    .find_map(|&parent| {
                        resolve_method(&self.scope, parent, method_name, universal).sub()
                    })
            } else {
                self.interner
                    .get(class)
                    .and_then(|package| {
                        resolve_method(&self.scope, package, method_name, universal).sub()
                    })
            };
            match found {
                Some(sub) => {
                    let owner = self.interner.lookup(sub.package);
                    values.push(reblessed(&self.sub_value(sub), owner, class));
                }
                None => trace!(class = class.as_str(), method, "method not found"),
            }
        }
        Value::merge_all(values)
    }

    /// Classes the invocant of a method call may belong to.
    fn invocant_classes(&self, invocant: NodeId, v: &mut Visited) -> Vec<String> {
        if let Some(class) = self.literal_class(invocant) {
            return vec![class];
        }
        self.infer_value(invocant, v)
            .packages()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

/// An inherited method called on `class`: what it blesses into its own
/// package is blessed into `class` instead.
fn reblessed(value: &Value, owner: &str, class: &str) -> Value {
    if owner == class {
        return value.clone();
    }
    value.map_shapes(|shape| match shape.package() {
        Some(package) if package == owner => shape.blessed_copy(class),
        _ => shape.clone(),
    })
}
