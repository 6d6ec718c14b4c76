//! Lists, anonymous containers, subscripts and casts.

use perl_ir::{NodeId, NodeKind, TokenKind};
use perl_types::{ScalarKind, Value};

use super::Engine;
use crate::Visited;

/// Element shape a value contributes to a flattened list: an array
/// contributes its elements, a hash its keys and values.
pub(super) fn flatten(value: &Value) -> Value {
    value.map_shapes(|shape| match shape {
        Value::Array(_) => shape.element(),
        Value::Hash(_) => Value::Scalar(ScalarKind::String).merge(&shape.hash_value()),
        other => other.clone(),
    })
}

/// A value read in scalar context: containers count their elements.
pub(super) fn scalar_context(value: &Value) -> Value {
    value.map_shapes(|shape| match shape {
        Value::Array(_) | Value::Hash(_) => Value::Scalar(ScalarKind::Number),
        other => other.clone(),
    })
}

/// A value assigned to an array.
pub(super) fn to_array(value: &Value) -> Value {
    Value::array_of(flatten(value))
}

/// The hash shapes of a value assigned to a hash; `Hash` when there are
/// none.
pub(super) fn hash_shapes(value: &Value) -> Value {
    let hashes: Vec<Value> = value
        .shapes()
        .iter()
        .filter(|shape| matches!(shape, Value::Hash(_)))
        .cloned()
        .collect();
    if hashes.is_empty() {
        Value::Hash(None)
    } else {
        Value::merge_all(hashes)
    }
}

/// Nodes that can stand in a key position of a literal pair list.
fn is_key(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Bareword
            | NodeKind::StringLit
            | NodeKind::NumberLit
            | NodeKind::ScalarVar
            | NodeKind::ArrayElement
            | NodeKind::HashElement
            | NodeKind::DerefArrayElement
            | NodeKind::DerefHashElement
            | NodeKind::UnaryExpr
            | NodeKind::CurrentPackage
    )
}

impl Engine<'_> {
    /// Items of a list expression with nested parentheses flattened, in
    /// source order. Anything else is a one-item list.
    pub(super) fn list_items(&self, node: NodeId) -> Vec<NodeId> {
        let tree = self.tree();
        let mut items = Vec::new();
        let mut stack = vec![node];
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

    /// Flattened items of all child nodes of `node`.
    pub(super) fn content_items(&self, node: NodeId) -> Vec<NodeId> {
        self.tree()
            .child_nodes(node)
            .flat_map(|child| self.list_items(child))
            .collect()
    }

    /// Merged element shape of a flattened list.
    pub(super) fn elements(&self, items: &[NodeId], v: &mut Visited) -> Value {
        let values: Vec<Value> = items
            .iter()
            .map(|&item| flatten(&self.infer_value(item, v)))
            .collect();
        Value::merge_all(values)
    }

    /// `(EXPR)` is the expression; any other list is an array of its
    /// elements.
    pub(super) fn list_value(&self, node: NodeId, v: &mut Visited) -> Value {
        let tree = self.tree();
        if tree.kind(node) == NodeKind::ParenList {
            let mut children = tree.child_nodes(node);
            if let (Some(only), None) = (children.next(), children.next()) {
                if tree.kind(only) != NodeKind::ListExpr {
                    return self.infer_value(only, v);
                }
            }
        }
        let items = self.list_items(node);
        Value::array_of(self.elements(&items, v))
    }

    /// Value shape of a literal `key => value` list. `None` when the list
    /// does not pair up.
    fn pair_values(&self, items: &[NodeId], v: &mut Visited) -> Option<Value> {
        let tree = self.tree();
        if items.len() % 2 != 0 || !items.iter().step_by(2).all(|&k| is_key(tree.kind(k))) {
            return None;
        }
        let values: Vec<Value> = items
            .iter()
            .skip(1)
            .step_by(2)
            .map(|&item| self.infer_value(item, v))
            .collect();
        Some(Value::merge_all(values))
    }

    /// The value `%h = RHS` gives `%h`.
    pub(super) fn to_hash(&self, rhs: NodeId, v: &mut Visited) -> Value {
        if matches!(self.tree().kind(rhs), NodeKind::ParenList | NodeKind::ListExpr) {
            let items = self.list_items(rhs);
            return match self.pair_values(&items, v) {
                Some(values) => Value::hash_of(values),
                None => Value::Hash(None),
            };
        }
        hash_shapes(&self.infer_value(rhs, v))
    }

    pub(super) fn anon_array(&self, node: NodeId, v: &mut Visited) -> Value {
        let items = self.content_items(node);
        Value::array_ref_of(self.elements(&items, v))
    }

    pub(super) fn anon_hash(&self, node: NodeId, v: &mut Visited) -> Value {
        let items = self.content_items(node);
        match self.pair_values(&items, v) {
            Some(values) => Value::hash_ref_of(values),
            None => Value::HashRef(None),
        }
    }

    // === Subscripts ===

    /// `$a[N]`. `$_[N]` with a literal index is the N-th argument.
    pub(super) fn array_element(&self, node: NodeId, v: &mut Visited) -> Value {
        if let Some(assign) = self.assignment_target(node) {
            return self.assigned_to(assign, node, v);
        }
        let tree = self.tree();
        if self.name_of(node) == "_" {
            let index = tree
                .child_nodes(node)
                .next()
                .filter(|&i| tree.kind(i) == NodeKind::NumberLit)
                .and_then(|i| tree.text(i, self.source).parse::<usize>().ok());
            if let Some(index) = index {
                return self.argument(node, index);
            }
        }
        self.resolve(node, (NodeKind::ArrayVar, tree.name(node)), v)
            .element()
    }

    /// `$h{k}`.
    pub(super) fn hash_element(&self, node: NodeId, v: &mut Visited) -> Value {
        if let Some(assign) = self.assignment_target(node) {
            return self.assigned_to(assign, node, v);
        }
        self.resolve(node, (NodeKind::HashVar, self.tree().name(node)), v)
            .hash_value()
    }

    /// `$r->[0]`, `$$r[0]`, `$a[0][1]`.
    pub(super) fn deref_element(&self, node: NodeId, v: &mut Visited) -> Value {
        if let Some(assign) = self.assignment_target(node) {
            return self.assigned_to(assign, node, v);
        }
        self.first_value(node, v).element()
    }

    /// `$r->{k}`, `$$r{k}`, `$h{a}{b}`.
    pub(super) fn deref_hash_element(&self, node: NodeId, v: &mut Visited) -> Value {
        if let Some(assign) = self.assignment_target(node) {
            return self.assigned_to(assign, node, v);
        }
        self.first_value(node, v).hash_value()
    }

    /// `@a[..]`, `@$r[..]`, `(LIST)[..]`.
    pub(super) fn array_slice(&self, node: NodeId, v: &mut Visited) -> Value {
        let tree = self.tree();
        let name = tree.name(node);
        if !name.is_empty() {
            let array = self.resolve(node, (NodeKind::ArrayVar, name), v);
            return Value::array_of(array.element());
        }
        let base = self.first_value(node, v);
        Value::array_of(base.map_shapes(|shape| match shape {
            Value::ArrayRef(_) | Value::Blessed { .. } => shape.element(),
            other => flatten(other),
        }))
    }

    /// `@h{..}`, `@$r{..}`.
    pub(super) fn hash_slice(&self, node: NodeId, v: &mut Visited) -> Value {
        let tree = self.tree();
        let name = tree.name(node);
        let base = if name.is_empty() {
            self.first_value(node, v)
        } else {
            self.resolve(node, (NodeKind::HashVar, name), v)
        };
        Value::array_of(base.hash_value())
    }

    /// A sigil applied to an expression.
    pub(super) fn cast(&self, node: NodeId, v: &mut Visited) -> Value {
        let Some(sigil) = self.tree().first_token(node).map(|t| t.kind) else {
            return Value::Unknown;
        };
        match sigil {
            TokenKind::CastArray | TokenKind::CastHash => self.first_value(node, v).dereference(),
            TokenKind::CastCode => self.first_value(node, v).call_result(),
            TokenKind::CastGlob => Value::Glob,
            TokenKind::CastLastIndex => Value::Scalar(ScalarKind::Number),
            _ => Value::Unknown,
        }
    }

    // === Blocks and strings ===

    /// Value of the last statement of a block, when it is an expression.
    pub(super) fn block_value(&self, block: NodeId, v: &mut Visited) -> Value {
        let tree = self.tree();
        let Some(last) = tree.child_nodes(block).next_back() else {
            return Value::Unknown;
        };
        if tree.kind(last) != NodeKind::ExprStmt
            || tree.child_of_kind(last, NodeKind::StatementModifier).is_some()
        {
            return Value::Unknown;
        }
        self.first_value(last, v)
    }

    /// Contents of a string literal without interpolation.
    pub(super) fn string_literal(&self, node: NodeId) -> Option<String> {
        let tree = self.tree();
        if tree.kind(node) != NodeKind::StringLit || tree.child_nodes(node).next().is_some() {
            return None;
        }
        Some(
            tree.child_tokens(node)
                .filter(|(_, token)| token.kind == TokenKind::StringContent)
                .map(|(_, token)| token.span.text(self.source))
                .collect(),
        )
    }
}
