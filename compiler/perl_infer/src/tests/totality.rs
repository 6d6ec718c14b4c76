use perl_ir::{NodeKind, StringInterner};
use perl_parse::{parse, ParseOptions};
use perl_types::{ScalarKind, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::{analyze, Analyzed};
use crate::{Cancellation, InferOptions, SummaryCache};

const NUM: Value = Value::Scalar(ScalarKind::Number);
const STR: Value = Value::Scalar(ScalarKind::String);

// === Cycles ===

#[test]
fn circular_globals_terminate() {
    let a = analyze("$x = $y;\n$y = $x;\n$x;\n");
    assert_eq!(a.value_of("$x"), Value::Unknown);
}

#[test]
fn circular_globals_keep_the_known_part() {
    let a = analyze("$x = 1;\n$y = $x;\n$x = $y;\n$x;\n");
    assert_eq!(a.value_of("$x"), NUM);
}

#[test]
fn self_referencing_update() {
    let a = analyze("my @l = (1);\n@l = (@l, 'a');\n@l;\n");
    assert_eq!(a.value_of("@l"), Value::array_of(NUM.merge(&STR)));
}

#[test]
fn increment_in_place() {
    let a = analyze("my $x = 1;\n$x = $x + 1;\n$x;\n");
    assert_eq!(a.value_of("$x"), NUM);
}

// === Cancellation ===

#[test]
fn cancelled_query_is_unknown() {
    let a = analyze("my $x = 1;\n$x;\n");
    let cancel = Cancellation::new();
    let engine = a.engine().with_cancellation(cancel.clone());
    cancel.cancel();
    assert_eq!(engine.infer(a.node("$x")), Value::Unknown);
    assert_eq!(a.value_of("$x"), NUM);
}

#[test]
fn cancelled_summary_is_not_cached() {
    let a = analyze("sub f { return 1; }\n");
    let tree = &a.out.tree;
    let decl = tree.descendants_of_kind(tree.root(), NodeKind::SubDecl)[0];
    let cancel = Cancellation::new();
    cancel.cancel();
    assert_eq!(
        a.engine().with_cancellation(cancel).summary(decl),
        Value::Unknown
    );
    assert!(a.cache.is_empty());
    assert_eq!(a.engine().summary(decl), NUM);
    assert_eq!(a.cache.len(), 1);
}

// === Depth ===

#[test]
fn deep_values_are_truncated() {
    let a = analyze("my $r = [[[[1]]]];\n$r;\n");
    let engine = a.engine().with_options(InferOptions { max_depth: 2 });
    assert_eq!(
        engine.infer(a.node("$r")),
        Value::array_ref_of(Value::ArrayRef(None))
    );
}

// === Arbitrary input ===

const FRAGMENTS: &[&str] = &[
    "my $x = 1;",
    "$x = $y;",
    "$y = [$x];",
    "my @a = ($x, @a);",
    "my %h = (k => $x);",
    "$h{k} = $h{k} . 'a';",
    "push @a, $a[0];",
    "sub f { return g(); }",
    "sub g { return f() || 1; }",
    "my $r = f();",
    "package Foo;",
    "package main;",
    "our @ISA = ('Foo');",
    "sub new { my $c = shift; bless {}, $c }",
    "my $o = Foo->new;",
    "$o->new->new;",
    "foreach (@a) { print $_; }",
    "map { $_ } @a;",
    "{",
    "}",
    "(",
    ")",
    "\"$x $y\";",
    "my $cb = sub { $cb->() };",
];

fn source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..16).prop_map(|parts| parts.join("\n"))
}

/// Analyze input that may contain syntax errors.
fn analyze_any(source: &str) -> Analyzed {
    let interner = StringInterner::new();
    let lex = perl_lexer::lex(source);
    let out = parse(&lex, source, &interner, ParseOptions::default());
    Analyzed {
        interner,
        source: source.to_owned(),
        out,
        cache: SummaryCache::new(),
    }
}

proptest! {
    #[test]
    fn every_node_infers_deterministically(src in source()) {
        let a = analyze_any(&src);
        let tree = &a.out.tree;
        for node in tree.preorder(tree.root()) {
            let first = a.engine().infer(node);
            let second = a.engine().infer(node);
            prop_assert_eq!(first, second, "node {:?} in {:?}", node, src);
        }
    }
}
