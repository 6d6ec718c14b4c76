//! The value lattice.
//!
//! A [`Value`] describes what an expression may evaluate to at runtime:
//! a scalar, a container, a code reference, a blessed object, `undef`, a
//! union of those, or nothing known at all.
//!
//! # Lattice
//!
//! Values are sets of shapes. [`Value::Unknown`] is the empty set and the
//! identity of [`Value::merge`]; a [`Value::OneOf`] is a set of two or more
//! shapes; every other variant is a single shape. Merging is set union, so it
//! is commutative and associative. Scalars of different kinds stay
//! separate members: `Str` merged with `Num` is `OneOf[Str, Num]`.
//!
//! # Invariant
//!
//! A `OneOf` is sorted, deduplicated, flat (no member is a `OneOf` or
//! `Unknown`) and has at least two members. [`Union`] has no public
//! constructor, so the only way to build one is through `merge`.

mod encode;
mod parse;

use std::fmt;
use std::sync::Arc;

/// What is known about a plain scalar.
///
/// Declaration order is display order for unions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Default)]
pub enum ScalarKind {
    #[default]
    Any,
    String,
    Number,
}

/// Contract of a code reference: which sub it points to, and what it returns.
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Default)]
pub struct CodeContract {
    /// Fully qualified sub name, when the reference is `\&name` or a
    /// declared sub.
    pub sub: Option<Arc<str>>,
    pub returns: Option<Arc<Value>>,
}

/// Canonical member set of a [`Value::OneOf`].
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct Union(Arc<[Value]>);

impl Union {
    #[inline]
    pub fn members(&self) -> &[Value] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An inferred value shape.
///
/// Variant order is the canonical order of union members, which puts
/// `undef` last in displayed unions (`OneOf[Scalar, undef]`).
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Default)]
pub enum Value {
    Scalar(ScalarKind),
    /// `@array`, with its element shape when known.
    Array(Option<Arc<Value>>),
    /// `%hash`, with its value shape when known.
    Hash(Option<Arc<Value>>),
    ArrayRef(Option<Arc<Value>>),
    HashRef(Option<Arc<Value>>),
    Code(CodeContract),
    Glob,
    /// An object: `inner` blessed into `package`.
    Blessed {
        inner: Arc<Value>,
        package: Arc<str>,
    },
    OneOf(Union),
    Undef,
    /// Nothing could be inferred.
    #[default]
    Unknown,
}

impl Value {
    /// `Scalar` with no further knowledge.
    pub const SCALAR: Value = Value::Scalar(ScalarKind::Any);

    // === Constructors ===

    pub fn array_of(element: Value) -> Value {
        Value::Array(known(element))
    }

    pub fn hash_of(value: Value) -> Value {
        Value::Hash(known(value))
    }

    pub fn array_ref_of(element: Value) -> Value {
        Value::ArrayRef(known(element))
    }

    pub fn hash_ref_of(value: Value) -> Value {
        Value::HashRef(known(value))
    }

    /// A code reference, optionally pointing at a named sub.
    pub fn code(sub: Option<&str>, returns: Value) -> Value {
        Value::Code(CodeContract {
            sub: sub.map(Arc::from),
            returns: known(returns),
        })
    }

    /// An instance of `package` whose representation is not known.
    pub fn object(package: &str) -> Value {
        Value::Blessed {
            inner: Arc::new(Value::Unknown),
            package: Arc::from(package),
        }
    }

    // === Lattice operations ===

    /// Least upper bound of `self` and `other`.
    #[must_use]
    pub fn merge(&self, other: &Value) -> Value {
        Value::merge_all([self.clone(), other.clone()])
    }

    /// Least upper bound of any number of values. `Unknown` for none.
    pub fn merge_all<I: IntoIterator<Item = Value>>(values: I) -> Value {
        let mut members = Vec::new();
        for value in values {
            match value {
                Value::Unknown => {}
                Value::OneOf(union) => members.extend(union.members().iter().cloned()),
                shape => members.push(shape),
            }
        }
        canonicalize(members)
    }

    /// `bless`: the value with its shapes blessed into `package`.
    ///
    /// `Undef` and `Unknown` are returned unchanged. Blessing an object
    /// re-blesses it, so the operation is idempotent.
    #[must_use]
    pub fn blessed_copy(&self, package: &str) -> Value {
        match self {
            Value::Undef | Value::Unknown => self.clone(),
            Value::Blessed { package: old, .. } if &**old == package => self.clone(),
            Value::Blessed { inner, .. } => Value::Blessed {
                inner: Arc::clone(inner),
                package: Arc::from(package),
            },
            Value::OneOf(union) => {
                Value::merge_all(union.members().iter().map(|m| m.blessed_copy(package)))
            }
            shape => Value::Blessed {
                inner: Arc::new(shape.clone()),
                package: Arc::from(package),
            },
        }
    }

    /// Apply `f` to every shape and merge the results.
    #[must_use]
    pub fn map_shapes(&self, mut f: impl FnMut(&Value) -> Value) -> Value {
        match self {
            Value::OneOf(union) => Value::merge_all(union.members().iter().map(f)),
            Value::Unknown => Value::Unknown,
            shape => f(shape),
        }
    }

    /// The shapes of this value: members of a union, nothing for
    /// `Unknown`, or the value itself.
    pub fn shapes(&self) -> &[Value] {
        match self {
            Value::OneOf(union) => union.members(),
            Value::Unknown => &[],
            shape => std::slice::from_ref(shape),
        }
    }

    // === Queries ===

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Package of a blessed value.
    pub fn package(&self) -> Option<&str> {
        match self {
            Value::Blessed { package, .. } => Some(&**package),
            _ => None,
        }
    }

    /// Packages of all blessed shapes, in canonical order.
    pub fn packages(&self) -> Vec<&str> {
        self.shapes().iter().filter_map(Value::package).collect()
    }

    /// Element shape of `@a` / `$aref`, seen through a blessing.
    #[must_use]
    pub fn element(&self) -> Value {
        self.map_shapes(|shape| match shape {
            Value::Array(elem) | Value::ArrayRef(elem) => unwrap_known(elem.as_ref()),
            Value::Blessed { inner, .. } => match &**inner {
                Value::ArrayRef(elem) => unwrap_known(elem.as_ref()),
                _ => Value::Unknown,
            },
            _ => Value::Unknown,
        })
    }

    /// Value shape of `%h` / `$href`, seen through a blessing.
    #[must_use]
    pub fn hash_value(&self) -> Value {
        self.map_shapes(|shape| match shape {
            Value::Hash(value) | Value::HashRef(value) => unwrap_known(value.as_ref()),
            Value::Blessed { inner, .. } => match &**inner {
                Value::HashRef(value) => unwrap_known(value.as_ref()),
                _ => Value::Unknown,
            },
            _ => Value::Unknown,
        })
    }

    /// `\EXPR`.
    #[must_use]
    pub fn reference(&self) -> Value {
        self.map_shapes(|shape| match shape {
            Value::Array(elem) => Value::ArrayRef(elem.clone()),
            Value::Hash(value) => Value::HashRef(value.clone()),
            Value::Code(_) => shape.clone(),
            _ => Value::SCALAR,
        })
    }

    /// `@$x` / `%$x`: the container behind a reference.
    #[must_use]
    pub fn dereference(&self) -> Value {
        self.map_shapes(|shape| match shape {
            Value::ArrayRef(elem) => Value::Array(elem.clone()),
            Value::HashRef(value) => Value::Hash(value.clone()),
            Value::Blessed { inner, .. } => inner.dereference(),
            _ => Value::Unknown,
        })
    }

    /// Return shape of a code reference.
    #[must_use]
    pub fn call_result(&self) -> Value {
        self.map_shapes(|shape| match shape {
            Value::Code(contract) => unwrap_known(contract.returns.as_ref()),
            _ => Value::Unknown,
        })
    }

    /// Nesting depth; 1 for leaves.
    pub fn depth(&self) -> u32 {
        let child = |v: Option<&Arc<Value>>| v.map_or(0, |v| v.depth());
        1 + match self {
            Value::Array(v) | Value::Hash(v) | Value::ArrayRef(v) | Value::HashRef(v) => {
                child(v.as_ref())
            }
            Value::Code(contract) => child(contract.returns.as_ref()),
            Value::Blessed { inner, .. } => inner.depth(),
            Value::OneOf(union) => union.members().iter().map(Value::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// The value with everything nested below `max_depth` forgotten.
    #[must_use]
    pub fn truncated(&self, max_depth: u32) -> Value {
        if max_depth == 0 {
            return Value::Unknown;
        }
        let below = |v: &Option<Arc<Value>>| -> Option<Arc<Value>> {
            v.as_ref().and_then(|v| known(v.truncated(max_depth - 1)))
        };
        match self {
            Value::Array(v) => Value::Array(below(v)),
            Value::Hash(v) => Value::Hash(below(v)),
            Value::ArrayRef(v) => Value::ArrayRef(below(v)),
            Value::HashRef(v) => Value::HashRef(below(v)),
            Value::Code(contract) => Value::Code(CodeContract {
                sub: contract.sub.clone(),
                returns: below(&contract.returns),
            }),
            Value::Blessed { inner, package } => Value::Blessed {
                inner: Arc::new(inner.truncated(max_depth - 1)),
                package: Arc::clone(package),
            },
            Value::OneOf(_) => self.map_shapes(|m| m.truncated(max_depth)),
            leaf => leaf.clone(),
        }
    }
}

/// `Some` unless the value is `Unknown`, so that "no element shape" has a
/// single representation.
fn known(value: Value) -> Option<Arc<Value>> {
    (!value.is_unknown()).then(|| Arc::new(value))
}

fn unwrap_known(value: Option<&Arc<Value>>) -> Value {
    value.map_or(Value::Unknown, |v| (**v).clone())
}

/// Build the canonical value for a flat list of shapes.
fn canonicalize(mut members: Vec<Value>) -> Value {
    members.sort();
    members.dedup();
    match members.len() {
        0 => Value::Unknown,
        1 => members.pop().unwrap_or_default(),
        _ => Value::OneOf(Union(members.into())),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn container(
            f: &mut fmt::Formatter<'_>,
            name: &str,
            inner: Option<&Arc<Value>>,
        ) -> fmt::Result {
            match inner {
                Some(inner) => write!(f, "{name}[{inner}]"),
                None => f.write_str(name),
            }
        }

        match self {
            Value::Scalar(ScalarKind::Any) => f.write_str("Scalar"),
            Value::Scalar(ScalarKind::String) => f.write_str("Str"),
            Value::Scalar(ScalarKind::Number) => f.write_str("Num"),
            Value::Array(v) => container(f, "Array", v.as_ref()),
            Value::Hash(v) => container(f, "Hash", v.as_ref()),
            Value::ArrayRef(v) => container(f, "ArrayRef", v.as_ref()),
            Value::HashRef(v) => container(f, "HashRef", v.as_ref()),
            Value::Code(contract) => container(f, "CodeRef", contract.returns.as_ref()),
            Value::Glob => f.write_str("Glob"),
            Value::Blessed { inner, package } if inner.is_unknown() => f.write_str(package),
            Value::Blessed { inner, package } => write!(f, "{package} ({inner})"),
            Value::OneOf(union) => {
                f.write_str("OneOf[")?;
                for (i, member) in union.members().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("]")
            }
            Value::Undef => f.write_str("undef"),
            Value::Unknown => f.write_str("unknown"),
        }
    }
}

#[cfg(test)]
mod tests;
