//! Operators and assignment.

use perl_ir::{NodeId, NodeKind, TokenKind};
use perl_types::{ScalarKind, Value};

use super::constructors::{flatten, hash_shapes, scalar_context, to_array};
use super::Engine;
use crate::Visited;

const NUM: Value = Value::Scalar(ScalarKind::Number);
const STR: Value = Value::Scalar(ScalarKind::String);

impl Engine<'_> {
    /// Operator token of an operator node: its first child token.
    fn operator(&self, node: NodeId) -> Option<(TokenKind, &str)> {
        self.tree()
            .first_token(node)
            .map(|token| (token.kind, token.span.text(self.source)))
    }

    fn operands(&self, node: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let mut children = self.tree().child_nodes(node);
        (children.next(), children.next())
    }

    fn operand_value(&self, node: Option<NodeId>, v: &mut Visited) -> Value {
        node.map_or(Value::Unknown, |n| self.infer_value(n, v))
    }

    pub(super) fn binary(&self, node: NodeId, v: &mut Visited) -> Value {
        let Some((op, _)) = self.operator(node) else {
            return Value::Unknown;
        };
        let (lhs, rhs) = self.operands(node);
        match op {
            TokenKind::Dot | TokenKind::KwX => STR,
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::StarStar
            | TokenKind::Shl
            | TokenKind::Shr
            | TokenKind::Amp
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::Spaceship
            | TokenKind::KwCmp => NUM,
            TokenKind::LAngle
            | TokenKind::RAngle
            | TokenKind::LtEq
            | TokenKind::GtEq
            | TokenKind::NumEq
            | TokenKind::NumNe
            | TokenKind::KwLt
            | TokenKind::KwGt
            | TokenKind::KwLe
            | TokenKind::KwGe
            | TokenKind::KwEq
            | TokenKind::KwNe
            | TokenKind::SmartMatch
            | TokenKind::Match
            | TokenKind::NotMatch
            | TokenKind::KwXor => Value::SCALAR,
            TokenKind::AndAnd
            | TokenKind::OrOr
            | TokenKind::DefinedOr
            | TokenKind::KwAnd
            | TokenKind::KwOr => {
                let left = self.operand_value(lhs, v);
                left.merge(&self.operand_value(rhs, v))
            }
            TokenKind::Range => {
                let left = self.operand_value(lhs, v);
                Value::array_of(left.merge(&self.operand_value(rhs, v)))
            }
            _ => Value::Unknown,
        }
    }

    pub(super) fn unary(&self, node: NodeId, v: &mut Visited) -> Value {
        let Some((op, _)) = self.operator(node) else {
            return Value::Unknown;
        };
        let (operand, _) = self.operands(node);
        match op {
            TokenKind::Bang | TokenKind::KwNot | TokenKind::FileTest => Value::SCALAR,
            // `-bareword` is the string "-bareword".
            TokenKind::Minus
                if operand.is_some_and(|o| self.tree().kind(o) == NodeKind::Bareword) =>
            {
                STR
            }
            TokenKind::Minus
            | TokenKind::Tilde
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => NUM,
            TokenKind::Plus => self.operand_value(operand, v),
            _ => Value::Unknown,
        }
    }

    pub(super) fn ternary(&self, node: NodeId, v: &mut Visited) -> Value {
        let mut children = self.tree().child_nodes(node).skip(1);
        let (then, otherwise) = (children.next(), children.next());
        let then = self.operand_value(then, v);
        then.merge(&self.operand_value(otherwise, v))
    }

    /// An assignment used as an expression.
    pub(super) fn assignment(&self, node: NodeId, v: &mut Visited) -> Value {
        let (lhs, rhs) = self.operands(node);
        let Some(lhs) = lhs else {
            return Value::Unknown;
        };
        let target = self.strip_decl(lhs);
        match self.tree().kind(target) {
            NodeKind::ParenList | NodeKind::ListExpr => self.operand_value(rhs, v),
            _ => self.assigned_to(node, target, v),
        }
    }

    /// `my $x` is `$x` as far as assignment goes.
    pub(super) fn strip_decl(&self, mut node: NodeId) -> NodeId {
        let tree = self.tree();
        while tree.kind(node) == NodeKind::VarDecl {
            match tree.child_nodes(node).next_back() {
                Some(inner) => node = inner,
                None => break,
            }
        }
        node
    }

    /// The value `assign` stores in `target`, one of the terms on its left
    /// side.
    pub(super) fn assigned_to(&self, assign: NodeId, target: NodeId, v: &mut Visited) -> Value {
        let (lhs, rhs) = self.operands(assign);
        let Some(rhs) = rhs else {
            return Value::Unknown;
        };
        if let Some((TokenKind::OpAssign, op)) = self.operator(assign) {
            return self.compound(op, target, rhs, v);
        }
        let kind = self.tree().kind(target);
        let lhs = lhs.map(|l| self.strip_decl(l));
        match lhs {
            Some(list)
                if list != target
                    && matches!(self.tree().kind(list), NodeKind::ParenList | NodeKind::ListExpr) =>
            {
                let items: Vec<NodeId> = self
                    .list_items(list)
                    .into_iter()
                    .map(|item| self.strip_decl(item))
                    .collect();
                match items.iter().position(|&item| item == target) {
                    Some(position) => self.destructure(rhs, position, kind, v),
                    None => Value::Unknown,
                }
            }
            _ => self.coerce(kind, rhs, v),
        }
    }

    /// `$x .= ...`, `$x ||= ...`, `$n += ...`.
    fn compound(&self, op: &str, target: NodeId, rhs: NodeId, v: &mut Visited) -> Value {
        match op {
            ".=" | "x=" => STR,
            "||=" | "//=" | "&&=" => {
                let before = self.value_before(target, v);
                before.merge(&self.scalar_value(rhs, v))
            }
            _ => NUM,
        }
    }

    /// Value of `target` just before it is assigned to.
    fn value_before(&self, target: NodeId, v: &mut Visited) -> Value {
        let tree = self.tree();
        match tree.kind(target) {
            NodeKind::ScalarVar | NodeKind::ArrayVar | NodeKind::HashVar => {
                self.resolve(target, (tree.kind(target), tree.name(target)), v)
            }
            NodeKind::ArrayElement => self
                .resolve(target, (NodeKind::ArrayVar, tree.name(target)), v)
                .element(),
            NodeKind::HashElement => self
                .resolve(target, (NodeKind::HashVar, tree.name(target)), v)
                .hash_value(),
            NodeKind::DerefArrayElement => self.first_value(target, v).element(),
            NodeKind::DerefHashElement => self.first_value(target, v).hash_value(),
            _ => Value::Unknown,
        }
    }

    /// `RHS` stored into a term of kind `kind`.
    fn coerce(&self, kind: NodeKind, rhs: NodeId, v: &mut Visited) -> Value {
        match kind {
            NodeKind::ArrayVar => to_array(&self.infer_value(rhs, v)),
            NodeKind::HashVar => self.to_hash(rhs, v),
            _ => self.scalar_value(rhs, v),
        }
    }

    /// `RHS` read in scalar context. A literal list is its last item.
    pub(super) fn scalar_value(&self, rhs: NodeId, v: &mut Visited) -> Value {
        let tree = self.tree();
        match tree.kind(rhs) {
            NodeKind::ParenList | NodeKind::ListExpr => match self.list_items(rhs).last() {
                Some(&last) => scalar_context(&self.infer_value(last, v)),
                None => Value::Undef,
            },
            NodeKind::ArraySlice | NodeKind::HashSlice => self.infer_value(rhs, v).element(),
            _ => scalar_context(&self.infer_value(rhs, v)),
        }
    }

    /// The value a list assignment gives its `position`-th target.
    fn destructure(&self, rhs: NodeId, position: usize, kind: NodeKind, v: &mut Visited) -> Value {
        let tree = self.tree();
        match tree.kind(rhs) {
            NodeKind::ParenList | NodeKind::ListExpr => {
                let items = self.list_items(rhs);
                let rest = items.get(position..).unwrap_or_default();
                match kind {
                    NodeKind::ArrayVar => Value::array_of(self.elements(rest, v)),
                    NodeKind::HashVar => match rest {
                        [] => Value::Hash(None),
                        _ => {
                            // A pair list: values sit at odd offsets.
                            let values: Vec<Value> = rest
                                .iter()
                                .skip(1)
                                .step_by(2)
                                .map(|&item| self.infer_value(item, v))
                                .collect();
                            Value::hash_of(Value::merge_all(values))
                        }
                    },
                    _ => match rest.first() {
                        Some(&item) => flatten(&self.infer_value(item, v)),
                        None => Value::Undef,
                    },
                }
            }
            NodeKind::ArrayVar if self.name_of(rhs) == "_" => match kind {
                NodeKind::ArrayVar => Value::Array(None),
                NodeKind::HashVar => Value::Hash(None),
                _ => self.argument(rhs, position),
            },
            _ => {
                let value = self.infer_value(rhs, v);
                match kind {
                    NodeKind::ArrayVar => to_array(&value),
                    NodeKind::HashVar => hash_shapes(&value),
                    _ => flatten(&value),
                }
            }
        }
    }
}
