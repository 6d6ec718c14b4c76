#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::codec::MAX_DEPTH;
use crate::{DecodeError, Tag};

fn scalar_str() -> Value {
    Value::Scalar(ScalarKind::String)
}

fn scalar_num() -> Value {
    Value::Scalar(ScalarKind::Number)
}

// === Merge ===

#[test]
fn merge_identical_is_identity() {
    let v = Value::hash_ref_of(Value::SCALAR);
    assert_eq!(v.merge(&v), v);
}

#[test]
fn merge_distinct_builds_union() {
    let merged = Value::SCALAR.merge(&Value::Undef);
    assert_eq!(merged.shapes(), &[Value::SCALAR, Value::Undef]);
    assert_eq!(merged.to_string(), "OneOf[Scalar, undef]");
}

#[test]
fn merge_flattens_unions() {
    let a = Value::SCALAR.merge(&Value::Undef);
    let b = Value::Glob.merge(&Value::Undef);
    let merged = a.merge(&b);
    assert_eq!(merged.shapes(), &[Value::SCALAR, Value::Glob, Value::Undef]);
    assert!(merged.shapes().iter().all(|m| !matches!(m, Value::OneOf(_))));
}

#[test]
fn unknown_is_the_merge_identity() {
    assert_eq!(Value::Unknown.merge(&Value::Glob), Value::Glob);
    assert_eq!(Value::Glob.merge(&Value::Unknown), Value::Glob);
    assert_eq!(Value::merge_all([]), Value::Unknown);
}

#[test]
fn scalar_kinds_stay_distinct() {
    assert_eq!(scalar_str().merge(&scalar_str()), scalar_str());
    let mixed = scalar_str().merge(&scalar_num());
    assert_eq!(mixed.shapes(), &[scalar_str(), scalar_num()]);
    assert_eq!(mixed.to_string(), "OneOf[Str, Num]");
    assert_eq!(scalar_num().merge(&scalar_str()), mixed);

    let with_undef = Value::merge_all([scalar_str(), Value::Undef, scalar_num()]);
    assert_eq!(
        with_undef.shapes(),
        &[scalar_str(), scalar_num(), Value::Undef]
    );

    let any = Value::SCALAR.merge(&scalar_num());
    assert_eq!(any.shapes(), &[Value::SCALAR, scalar_num()]);
}

// === Bless ===

#[test]
fn bless_wraps_without_mutating() {
    let original = Value::hash_ref_of(Value::SCALAR);
    let blessed = original.blessed_copy("Foo::Bar");
    assert_eq!(original, Value::hash_ref_of(Value::SCALAR));
    assert_eq!(
        blessed,
        Value::Blessed {
            inner: Arc::new(original.clone()),
            package: Arc::from("Foo::Bar"),
        }
    );
    assert_eq!(blessed.to_string(), "Foo::Bar (HashRef[Scalar])");
}

#[test]
fn undef_and_unknown_cannot_be_blessed() {
    assert_eq!(Value::Undef.blessed_copy("Foo"), Value::Undef);
    assert_eq!(Value::Unknown.blessed_copy("Foo"), Value::Unknown);
}

#[test]
fn rebless_replaces_package() {
    let object = Value::HashRef(None).blessed_copy("Base");
    let child = object.blessed_copy("Child");
    assert_eq!(child.package(), Some("Child"));
    assert_eq!(child, Value::HashRef(None).blessed_copy("Child"));
}

#[test]
fn bless_union_blesses_each_shape() {
    let union = Value::HashRef(None).merge(&Value::Undef);
    let blessed = union.blessed_copy("Foo");
    assert_eq!(blessed.packages(), vec!["Foo"]);
    assert!(blessed.shapes().contains(&Value::Undef));
}

// === Accessors ===

#[test]
fn element_and_hash_value() {
    let array = Value::array_of(Value::SCALAR);
    assert_eq!(array.element(), Value::SCALAR);
    assert_eq!(Value::Array(None).element(), Value::Unknown);
    let object = Value::hash_ref_of(scalar_num()).blessed_copy("Point");
    assert_eq!(object.hash_value(), scalar_num());
    assert_eq!(Value::SCALAR.hash_value(), Value::Unknown);
}

#[test]
fn reference_and_dereference() {
    let array = Value::array_of(Value::SCALAR);
    assert_eq!(array.reference(), Value::array_ref_of(Value::SCALAR));
    assert_eq!(array.reference().dereference(), array);
    assert_eq!(Value::Hash(None).reference(), Value::HashRef(None));
}

#[test]
fn code_call_result() {
    let code = Value::code(Some("main::f"), Value::object("Foo"));
    assert_eq!(code.call_result(), Value::object("Foo"));
    assert_eq!(code.to_string(), "CodeRef[Foo]");
}

#[test]
fn depth_and_truncation() {
    let nested = Value::array_ref_of(Value::array_ref_of(Value::array_ref_of(Value::SCALAR)));
    assert_eq!(nested.depth(), 4);
    assert_eq!(
        nested.truncated(2),
        Value::array_ref_of(Value::ArrayRef(None))
    );
    assert_eq!(nested.truncated(0), Value::Unknown);
}

#[test]
fn display_forms() {
    assert_eq!(Value::object("Foo::Bar").to_string(), "Foo::Bar");
    assert_eq!(Value::hash_of(scalar_str()).to_string(), "Hash[Str]");
    assert_eq!(Value::Array(None).to_string(), "Array");
    assert_eq!(Value::Unknown.to_string(), "unknown");
}

// === Annotation types ===

#[test]
fn annotation_types() {
    assert_eq!(
        Value::from_annotation("Foo::Bar"),
        Some(Value::object("Foo::Bar"))
    );
    assert_eq!(
        Value::from_annotation(" ArrayRef[ Foo ] "),
        Some(Value::array_ref_of(Value::object("Foo")))
    );
    assert_eq!(
        Value::from_annotation("HashRef[Str]|Undef"),
        Some(Value::hash_ref_of(scalar_str()).merge(&Value::Undef))
    );
    assert_eq!(
        Value::from_annotation("CodeRef"),
        Some(Value::code(None, Value::Unknown))
    );
    assert_eq!(Value::from_annotation("Array"), Some(Value::Array(None)));
}

#[test]
fn malformed_annotation_types() {
    for text in ["", "ArrayRef[Foo", "Foo Bar", "Foo[Scalar]", "|", "::"] {
        assert_eq!(Value::from_annotation(text), None, "{text:?}");
    }
}

// === Codec ===

#[test]
fn every_variant_round_trips() {
    let values = [
        Value::Unknown,
        Value::Undef,
        Value::SCALAR,
        scalar_num(),
        Value::Array(None),
        Value::hash_of(Value::Glob),
        Value::array_ref_of(scalar_str()),
        Value::HashRef(None),
        Value::code(Some("Foo::bar"), Value::SCALAR),
        Value::code(None, Value::Unknown),
        Value::Glob,
        Value::HashRef(None).blessed_copy("Foo"),
        Value::object("Bar"),
        Value::SCALAR.merge(&Value::Undef),
    ];
    for value in values {
        let bytes = value.to_bytes();
        assert_eq!(bytes[0], value.tag().as_u8());
        assert_eq!(Value::from_bytes(&bytes), Ok(value));
    }
}

#[test]
fn tags_are_stable() {
    assert_eq!(Value::Unknown.to_bytes(), vec![0]);
    assert_eq!(Value::Undef.to_bytes(), vec![1]);
    assert_eq!(scalar_str().to_bytes(), vec![2, 1]);
    assert_eq!(Value::ArrayRef(None).to_bytes(), vec![5, 0]);
    assert_eq!(Value::object("A").to_bytes(), vec![9, 1, b'A', 0]);
}

#[test]
fn decoding_rejects_malformed_input() {
    assert_eq!(
        Value::from_bytes(&[2, 9]),
        Err(DecodeError::InvalidPayload("scalar kind out of range"))
    );
    assert_eq!(
        Value::from_bytes(&[10, 1, 0]),
        Err(DecodeError::InvalidPayload("union with fewer than two members"))
    );
    assert_eq!(
        Value::from_bytes(&[32]),
        Err(DecodeError::UnexpectedTag {
            expected: "value",
            found: Tag::Package,
            offset: 0,
        })
    );
    assert_eq!(
        Value::from_bytes(&[5]),
        Err(DecodeError::Truncated { offset: 1 })
    );
}

#[test]
fn decoding_deep_nesting_fails_cleanly() {
    let mut bytes = Vec::new();
    for _ in 0..200 {
        bytes.extend_from_slice(&[5, 1]);
    }
    bytes.push(0);
    assert_eq!(Value::from_bytes(&bytes), Err(DecodeError::TooDeep));
}

#[test]
fn values_at_the_depth_cap_decode() {
    let mut deepest = Value::SCALAR.merge(&Value::Undef);
    while deepest.depth() < MAX_DEPTH {
        deepest = Value::array_ref_of(deepest.merge(&Value::Glob));
    }
    assert_eq!(deepest.depth(), MAX_DEPTH);
    assert_eq!(Value::from_bytes(&deepest.to_bytes()), Ok(deepest.clone()));
    let over = Value::array_ref_of(deepest);
    assert_eq!(
        Value::from_bytes(&over.to_bytes()),
        Err(DecodeError::TooDeep)
    );
}

#[test]
fn nested_unions_are_rejected() {
    // OneOf[OneOf[Undef, Scalar], Glob]
    let bytes = [10, 2, 10, 2, 1, 2, 0, 8];
    assert_eq!(
        Value::from_bytes(&bytes),
        Err(DecodeError::InvalidPayload("nested union"))
    );
}

#[test]
fn union_members_are_recanonicalised() {
    // Undef before Scalar: not canonical order on the wire.
    let bytes = [10, 2, 1, 2, 0];
    assert_eq!(
        Value::from_bytes(&bytes),
        Ok(Value::SCALAR.merge(&Value::Undef))
    );
}

// === Properties ===

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Unknown),
        Just(Value::Undef),
        Just(Value::SCALAR),
        Just(Value::Scalar(ScalarKind::String)),
        Just(Value::Scalar(ScalarKind::Number)),
        Just(Value::Glob),
        Just(Value::Array(None)),
        Just(Value::HashRef(None)),
    ];
    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Value::array_of),
            inner.clone().prop_map(Value::hash_of),
            inner.clone().prop_map(Value::array_ref_of),
            inner.clone().prop_map(Value::hash_ref_of),
            inner.clone().prop_map(|v| Value::code(None, v)),
            (inner.clone(), "[A-C](::[a-c])?").prop_map(|(v, p)| v.blessed_copy(&p)),
            "[A-C]".prop_map(|p| Value::object(&p)),
            prop::collection::vec(inner, 2..4).prop_map(Value::merge_all),
        ]
    })
}

proptest! {
    #[test]
    fn merge_is_commutative(a in arb_value(), b in arb_value()) {
        prop_assert_eq!(a.merge(&b), b.merge(&a));
    }

    #[test]
    fn merge_is_associative(a in arb_value(), b in arb_value(), c in arb_value()) {
        prop_assert_eq!(a.merge(&b).merge(&c), a.merge(&b.merge(&c)));
    }

    #[test]
    fn merge_is_idempotent(a in arb_value()) {
        prop_assert_eq!(a.merge(&a), a);
    }

    #[test]
    fn bless_is_idempotent_and_pure(v in arb_value(), p in "[A-C]") {
        let before = v.clone();
        let once = v.blessed_copy(&p);
        prop_assert_eq!(&v, &before);
        prop_assert_eq!(once.blessed_copy(&p), once);
    }

    #[test]
    fn codec_round_trips(v in arb_value()) {
        prop_assert_eq!(Value::from_bytes(&v.to_bytes()), Ok(v));
    }

    #[test]
    fn unions_stay_canonical(a in arb_value(), b in arb_value()) {
        if let Value::OneOf(union) = a.merge(&b) {
            let members = union.members();
            prop_assert!(members.len() >= 2);
            prop_assert!(members.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(members.iter().all(|m| !matches!(m, Value::OneOf(_) | Value::Unknown)));
        }
    }
}
