use perl_types::{ScalarKind, Value};
use pretty_assertions::assert_eq;

use super::analyze;

const NUM: Value = Value::Scalar(ScalarKind::Number);
const STR: Value = Value::Scalar(ScalarKind::String);

// === Lexical flow ===

#[test]
fn copies_follow_the_source() {
    let a = analyze("my $x = 5;\nmy $y = $x;\n$y;\n");
    assert_eq!(a.value_of("$y"), NUM);
}

#[test]
fn unconditional_assignment_replaces_earlier_ones() {
    let a = analyze("my $x = 5;\n$x = 'a';\n$x;\n");
    assert_eq!(a.value_of("$x"), STR);
}

#[test]
fn conditional_assignments_merge() {
    let a = analyze("my $x = 5;\n$x = 'a' if $ENV{X};\n$x;\n");
    assert_eq!(a.value_of("$x"), NUM.merge(&STR));

    let a = analyze("my $x = 5;\nif ($ENV{X}) { $x = 'a'; }\n$x;\n");
    assert_eq!(a.value_of("$x"), NUM.merge(&STR));
}

#[test]
fn later_assignments_do_not_reach_back() {
    let a = analyze("my $x = 1;\nmy $y = $x;\n$x = 'a';\n$y;\n");
    assert_eq!(a.value_of("$y"), NUM);
}

#[test]
fn inner_declaration_shadows_only_its_block() {
    let a = analyze("my $x = 1;\n{ my $x = 'a'; }\n$x;\n");
    assert_eq!(a.value_of("$x"), NUM);
}

#[test]
fn declaration_without_value_is_undef() {
    let a = analyze("my $x;\n$x;\n");
    assert_eq!(a.value_of("$x"), Value::Undef);
}

#[test]
fn push_adds_to_an_array() {
    let a = analyze("my @l;\npush @l, 'a';\n@l;\n");
    assert_eq!(a.value_of("@l"), Value::array_of(STR));
}

#[test]
fn mixed_elements_keep_both_kinds() {
    let a = analyze("my @a = (1, 'x');\nmy $e = $a[1];\n$e;\n");
    assert_eq!(a.value_of("$e"), NUM.merge(&STR));
    assert_eq!(a.value_of("$e").to_string(), "OneOf[Str, Num]");
}

#[test]
fn list_assignment_destructures() {
    let a = analyze("my ($n, $s) = (1, 'a');\n$n; $s;\n");
    assert_eq!(a.value_of("$n"), NUM);
    assert_eq!(a.value_of("$s"), STR);
}

// === Declared types ===

#[test]
fn type_annotation_wins() {
    let a = analyze("#@type Foo\nmy $x = 1;\n$x;\n");
    assert_eq!(a.value_of("$x"), Value::object("Foo"));
}

#[test]
fn typed_declaration() {
    let a = analyze("my Foo::Bar $y;\n$y;\n");
    assert_eq!(a.value_of("$y"), Value::object("Foo::Bar"));
}

// === Package variables ===

#[test]
fn our_variable_seen_from_a_sub() {
    let a = analyze("our $name = 'x';\nsub show { return $name; }\n");
    assert_eq!(a.value_of("$name"), STR);
}

#[test]
fn undeclared_globals_merge_every_assignment() {
    let a = analyze("$count = 0;\nsub bump { $count = $count + 1; }\n$count;\n");
    assert_eq!(a.value_of("$count"), NUM);
}

#[test]
fn special_variables() {
    let a = analyze("my $home = $ENV{HOME};\nmy @args = @ARGV;\n$home; @args;\n");
    assert_eq!(a.value_of("$home"), STR);
    assert_eq!(a.value_of("@args"), Value::array_of(STR));
}

// === Parameters ===

#[test]
fn signature_invocant_is_an_object() {
    let a = analyze("use v5.36;\npackage Counter;\nsub run ($self, $n) { return $self; }\n");
    assert_eq!(a.value_of("$self"), Value::object("Counter"));
}

#[test]
fn invocant_from_argument_array() {
    let a = analyze("package Foo;\nsub name { my $self = $_[0]; return $self; }\n");
    assert_eq!(a.value_of("$self"), Value::object("Foo"));
}

#[test]
fn other_arguments_are_unknown() {
    let a = analyze("sub add { my ($x, $y) = @_; return $y; }\n");
    assert_eq!(a.value_of("$y"), Value::Unknown);
}

// === Topics ===

#[test]
fn foreach_topic() {
    let a = analyze("my @w = ('a', 'b');\nforeach (@w) { print $_; }\n");
    assert_eq!(a.value_of("$_"), STR);
}

#[test]
fn foreach_loop_variable() {
    let a = analyze("my @n = (1, 2);\nforeach my $i (@n) { print $i; }\n");
    assert_eq!(a.value_of("$i"), NUM);
}

#[test]
fn map_block_topic() {
    let a = analyze("my @w = ('a');\nmy @l = map { length $_ } @w;\n@l;\n");
    assert_eq!(a.value_of("$_"), STR);
    assert_eq!(a.value_of("@l"), Value::array_of(NUM));
}

#[test]
fn sort_block_pair() {
    let a = analyze("my @n = (3, 1);\nmy @s = sort { $a <=> $b } @n;\n@s;\n");
    assert_eq!(a.value_of("$a"), NUM);
    assert_eq!(a.value_of("@s"), Value::array_of(NUM));
}

#[test]
fn statement_modifier_topic() {
    let a = analyze("print $_ for (1, 2);\n");
    assert_eq!(a.value_of("$_"), NUM);
}

#[test]
fn readline_loop_topic() {
    let a = analyze("while (<STDIN>) { print $_; }\n");
    assert_eq!(a.value_of("$_"), STR);
}
