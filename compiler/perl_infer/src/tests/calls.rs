use perl_ir::{Name, StringInterner};
use perl_lexer::lex;
use perl_parse::{parse, ParseOptions, ParseOutput};
use perl_types::{PackageEntry, PackageLookup, ScalarKind, SubEntry, Value};
use pretty_assertions::assert_eq;

use super::{analyze, analyze_with};
use crate::{Cancellation, ExternalLookup};

const NUM: Value = Value::Scalar(ScalarKind::Number);
const STR: Value = Value::Scalar(ScalarKind::String);

// === Builtins ===

#[test]
fn builtin_return_shapes() {
    let a = analyze(
        "my %h = (a => 1);\nmy @k = keys %h;\nmy @v = values %h;\nmy $t = time;\n\
         my $j = join ',', @k;\n@k; @v; $t; $j;\n",
    );
    assert_eq!(a.value_of("@k"), Value::array_of(STR));
    assert_eq!(a.value_of("@v"), Value::array_of(NUM));
    assert_eq!(a.value_of("$t"), NUM);
    assert_eq!(a.value_of("$j"), STR);
}

#[test]
fn grep_keeps_element_shape() {
    let a = analyze("my @w = ('a', 'b');\nmy @l = grep { length $_ } @w;\n@l;\n");
    assert_eq!(a.value_of("@l"), Value::array_of(STR));
}

#[test]
fn shift_of_a_named_array() {
    let a = analyze("my @q = (1, 2);\nmy $first = shift @q;\n$first;\n");
    assert_eq!(a.value_of("$first"), NUM);
}

#[test]
fn shift_outside_a_sub_reads_arguments() {
    let a = analyze("my $file = shift;\n$file;\n");
    assert_eq!(a.value_of("$file"), STR);
}

#[test]
fn core_prefix() {
    let a = analyze("my $n = CORE::length('abc');\n$n;\n");
    assert_eq!(a.value_of("$n"), NUM);
}

#[test]
fn bless_literal_class() {
    let a = analyze("my $obj = bless {}, 'Foo';\n$obj;\n");
    assert_eq!(a.value_of("$obj"), Value::HashRef(None).blessed_copy("Foo"));
}

#[test]
fn bless_into_current_package() {
    let a = analyze("package Foo;\nmy $obj = bless [];\n$obj;\n");
    assert_eq!(
        a.value_of("$obj"),
        Value::ArrayRef(None).blessed_copy("Foo")
    );
}

// === Sub summaries ===

#[test]
fn explicit_and_implicit_returns_merge() {
    let a = analyze("sub pick { return 'x' if $ENV{A}; 42 }\nmy $v = pick();\n$v;\n");
    assert_eq!(a.value_of("$v"), STR.merge(&NUM));
}

#[test]
fn bare_return_is_undef() {
    let a = analyze("sub nothing { return; }\nmy $v = nothing();\n$v;\n");
    assert_eq!(a.value_of("$v"), Value::Undef);
}

#[test]
fn nested_subs_do_not_leak_returns() {
    let a = analyze(
        "sub outer { my $cb = sub { return 'x' }; return 1; }\nmy $v = outer();\n$v;\n",
    );
    assert_eq!(a.value_of("$v"), NUM);
}

#[test]
fn summary_is_computed_once() {
    let a = analyze("sub make { return [1]; }\nmy $x = make();\nmy $y = make();\n$x; $y;\n");
    assert_eq!(a.value_of("$x"), Value::array_ref_of(NUM));
    assert_eq!(a.value_of("$y"), Value::array_ref_of(NUM));
    assert_eq!(a.cache.len(), 1);
}

#[test]
fn self_recursion_is_unknown() {
    let a = analyze("sub f { return f(); }\nmy $x = f();\n$x;\n");
    assert_eq!(a.value_of("$x"), Value::Unknown);
}

#[test]
fn mutual_recursion_keeps_base_cases() {
    let a = analyze(
        "sub even { my $n = shift; return 1 if $n == 0; return odd($n - 1); }\n\
         sub odd { my $n = shift; return 0 if $n == 0; return even($n - 1); }\n\
         my $r = even(4);\n$r;\n",
    );
    assert_eq!(a.value_of("$r"), NUM);
}

#[test]
fn returns_annotation_wins() {
    let a = analyze("#@returns Foo::Bar\nsub make { return 1; }\nmy $m = make();\n$m;\n");
    assert_eq!(a.value_of("$m"), Value::object("Foo::Bar"));
}

#[test]
fn constants_are_scalars() {
    let a = analyze("use constant PI => 3.14;\nmy $p = PI;\n$p;\n");
    assert_eq!(a.value_of("$p"), Value::SCALAR);
}

#[test]
fn forward_declaration_is_unknown() {
    let a = analyze("sub later;\nmy $x = later();\n$x;\n");
    assert_eq!(a.value_of("$x"), Value::Unknown);
}

#[test]
fn unknown_function_is_unknown() {
    let a = analyze("my $x = nowhere();\n$x;\n");
    assert_eq!(a.value_of("$x"), Value::Unknown);
}

#[test]
fn qualified_call() {
    let a = analyze(
        "package Util;\nsub name { return 'n'; }\npackage main;\nmy $n = Util::name();\n$n;\n",
    );
    assert_eq!(a.value_of("$n"), STR);
}

// === Code references ===

#[test]
fn anonymous_sub_and_its_call() {
    let a = analyze("my $cb = sub { return 1; };\nmy $r = $cb->();\n$cb; $r;\n");
    assert_eq!(a.value_of("$cb"), Value::code(None, NUM));
    assert_eq!(a.value_of("$r"), NUM);
}

#[test]
fn reference_to_named_sub() {
    let a = analyze("sub make { return 'x'; }\nmy $f = \\&make;\n$f;\n");
    assert_eq!(a.value_of("$f"), Value::code(Some("main::make"), STR));
}

// === Methods ===

const FOO: &str = "package Foo;\n\
sub new { my $class = shift; my $self = { name => 'x' }; return bless $self, $class; }\n\
sub label { my $self = shift; return \"label: $self\"; }\n";

#[test]
fn constructor_idiom() {
    let a = analyze(&format!("{FOO}package main;\nmy $f = Foo->new;\n$f;\n"));
    assert_eq!(
        a.value_of("$f"),
        Value::hash_ref_of(STR).blessed_copy("Foo")
    );
}

#[test]
fn method_on_an_object() {
    let a = analyze(&format!(
        "{FOO}package main;\nmy $f = Foo->new;\nmy $n = $f->label;\n$n;\n"
    ));
    assert_eq!(a.value_of("$n"), STR);
}

#[test]
fn inherited_constructor_blesses_into_the_subclass() {
    let a = analyze(&format!(
        "{FOO}package Bar;\nuse parent -norequire, 'Foo';\n\
         package main;\nmy $bar = Bar->new;\n$bar;\n"
    ));
    assert_eq!(
        a.value_of("$bar"),
        Value::hash_ref_of(STR).blessed_copy("Bar")
    );
}

#[test]
fn super_call_searches_the_parents() {
    let a = analyze(&format!(
        "{FOO}package Bar;\nuse parent -norequire, 'Foo';\n\
         sub new {{ my $class = shift; my $self = $class->SUPER::new(); return $self; }}\n"
    ));
    assert_eq!(
        a.value_of("$self"),
        Value::hash_ref_of(STR).blessed_copy("Bar")
    );
}

#[test]
fn missing_method_is_unknown() {
    let a = analyze(&format!("{FOO}package main;\nmy $x = Foo->missing;\n$x;\n"));
    assert_eq!(a.value_of("$x"), Value::Unknown);
}

#[test]
fn dynamic_method_name_is_unknown() {
    let a = analyze(&format!("{FOO}package main;\nmy $m = 'new';\nmy $x = Foo->$m();\n$x;\n"));
    assert_eq!(a.value_of("$x"), Value::Unknown);
}

// === Imports ===

#[test]
fn imported_function() {
    let a = analyze(
        "package Util;\nour @EXPORT_OK = qw(pick);\nsub pick { return [1, 2]; }\n\
         package main;\nuse Util qw(pick);\nmy $p = pick();\n$p;\n",
    );
    assert_eq!(a.value_of("$p"), Value::array_ref_of(NUM));
}

#[test]
fn function_not_imported_is_unknown() {
    let a = analyze(
        "package Util;\nour @EXPORT_OK = qw(pick);\nsub pick { return [1, 2]; }\n\
         package main;\nuse Util;\nmy $p = pick();\n$p;\n",
    );
    assert_eq!(a.value_of("$p"), Value::Unknown);
}

// === Other files ===

struct Library {
    out: ParseOutput,
}

impl ExternalLookup for Library {
    fn package(&self, name: Name) -> Option<&PackageEntry> {
        self.out.registry.package(name)
    }

    fn sub_returns(&self, _sub: &SubEntry, _cancel: &Cancellation) -> Option<Value> {
        Some(NUM)
    }
}

#[test]
fn packages_from_another_file() {
    let interner = StringInterner::new();
    let lib_source = "package Lib;\nsub new { return bless {}, shift; }\nsub count { return 1; }\n";
    let library = Library {
        out: parse(
            &lex(lib_source),
            lib_source,
            &interner,
            ParseOptions::default(),
        ),
    };
    let a = analyze_with(interner, "use Lib;\nmy $n = Lib::count();\n$n;\n");
    let engine = a.engine().with_external(&library);
    assert_eq!(engine.infer(a.node("$n")), NUM);

    // Without the other file nothing is known.
    assert_eq!(a.value_of("$n"), Value::Unknown);
}
