use perl_ir::{Features, Name, NodeKind, PerlVersion};
use perl_types::{PackageLookup, SubFlags, UseKind, Value};
use pretty_assertions::assert_eq;

use super::{parse_ok, Parsed};

fn names(parsed: &Parsed, list: &[Name]) -> Vec<String> {
    list.iter()
        .map(|&n| parsed.interner.lookup(n).to_owned())
        .collect()
}

fn parents(parsed: &Parsed, package: &str) -> Vec<String> {
    let package = parsed.interner.intern(package);
    names(parsed, parsed.out.registry.parents(package))
}

fn sub_flags(parsed: &Parsed, package: &str, name: &str) -> SubFlags {
    let registry = &parsed.out.registry;
    registry
        .sub(
            parsed.interner.intern(package),
            parsed.interner.intern(name),
        )
        .unwrap_or_else(|| panic!("{package}::{name} not registered"))
        .flags
}

// === Packages and subs ===

#[test]
fn subs_register_in_the_current_package() {
    let parsed = parse_ok(
        "package Foo;\nsub new { my $class = shift; return bless {}, $class; }\nsub helper;\n1;\n",
    );
    let registry = &parsed.out.registry;
    let foo = parsed.interner.intern("Foo");
    let new = registry.sub(foo, parsed.interner.intern("new")).unwrap();
    assert_eq!(parsed.out.tree.kind(new.node), NodeKind::SubDecl);
    assert!(new.flags.contains(SubFlags::METHOD));
    assert_eq!(sub_flags(&parsed, "Foo", "helper"), SubFlags::FORWARD);
    assert!(registry.sub(registry.main(), parsed.interner.intern("new")).is_none());
}

#[test]
fn qualified_sub_names() {
    let parsed = parse_ok("sub Foo::bar { }\n");
    assert_eq!(sub_flags(&parsed, "Foo", "bar"), SubFlags::empty());
}

#[test]
fn package_version() {
    let parsed = parse_ok("package Foo 1.02;\n");
    let entry = parsed
        .out
        .registry
        .package(parsed.interner.intern("Foo"))
        .unwrap();
    assert_eq!(entry.version, PerlVersion::parse("1.02"));
}

#[test]
fn self_signature_marks_a_method() {
    let parsed = parse_ok("use v5.36;\nsub run ($self, $n) { }\nsub plain ($n) { }\n");
    assert_eq!(sub_flags(&parsed, "main", "run"), SubFlags::METHOD);
    assert_eq!(sub_flags(&parsed, "main", "plain"), SubFlags::empty());
}

#[test]
fn annotations_attach_to_the_next_sub() {
    let parsed = parse_ok("#@returns Foo::Bar\n#@deprecated\nsub make { }\nsub other { }\n");
    let registry = &parsed.out.registry;
    let make = registry
        .sub(registry.main(), parsed.interner.intern("make"))
        .unwrap();
    assert_eq!(make.returns, Some(Value::object("Foo::Bar")));
    assert_eq!(make.flags, SubFlags::DEPRECATED);
    let other = registry
        .sub(registry.main(), parsed.interner.intern("other"))
        .unwrap();
    assert_eq!(other.returns, None);
}

// === Inheritance ===

#[test]
fn use_parent_skips_options() {
    let parsed = parse_ok("package Child;\nuse parent -norequire, 'Base';\n");
    assert_eq!(parents(&parsed, "Child"), vec!["Base"]);
}

#[test]
fn use_base_with_word_list() {
    let parsed = parse_ok("package Child;\nuse base qw(A B);\n");
    assert_eq!(parents(&parsed, "Child"), vec!["A", "B"]);
}

#[test]
fn isa_assignment_and_push() {
    let parsed = parse_ok("package Child;\nour @ISA = ('A', 'B');\npush @ISA, 'C';\n");
    assert_eq!(parents(&parsed, "Child"), vec!["A", "B", "C"]);
}

#[test]
fn qualified_isa() {
    let parsed = parse_ok("@Foo::ISA = ('Base');\n");
    assert_eq!(parents(&parsed, "Foo"), vec!["Base"]);
    assert!(parents(&parsed, "main").is_empty());
}

#[test]
fn moose_extends() {
    let parsed = parse_ok("package Dog;\nuse Moose;\nextends 'Animal';\n");
    assert_eq!(parents(&parsed, "Dog"), vec!["Animal"]);
    let dog = parsed
        .out
        .registry
        .package(parsed.interner.intern("Dog"))
        .unwrap();
    assert!(dog.features.is_enabled(Features::STRICT));
}

// === Exports and imports ===

#[test]
fn export_arrays() {
    let parsed = parse_ok("package Util;\nour @EXPORT = qw(a);\nour @EXPORT_OK = qw(b c);\n");
    let exports = parsed.out.registry.exports(parsed.interner.intern("Util"));
    assert_eq!(names(&parsed, exports.default), vec!["a"]);
    assert_eq!(names(&parsed, exports.optional), vec!["b", "c"]);
}

#[test]
fn use_statements_record_imports() {
    let parsed = parse_ok(
        "use List::Util qw(first max);\nuse Carp;\nuse POSIX ();\nno warnings;\n",
    );
    let registry = &parsed.out.registry;
    let main = registry.package(registry.main()).unwrap();
    let modules: Vec<String> = main
        .uses
        .iter()
        .map(|u| parsed.interner.lookup(u.module).to_owned())
        .collect();
    assert_eq!(modules, vec!["List::Util", "Carp", "POSIX", "warnings"]);
    let imports = main.uses[0].imports.as_deref().unwrap();
    assert_eq!(names(&parsed, imports), vec!["first", "max"]);
    assert_eq!(main.uses[1].imports, None);
    assert_eq!(main.uses[2].imports, Some(Vec::new()));
    assert_eq!(main.uses[3].kind, UseKind::No);
}

// === Constants and declared types ===

#[test]
fn constants_register_and_parse_as_calls() {
    let parsed = parse_ok("use constant { A => 1, B => 2 };\nmy @x = (A, B);\n");
    assert_eq!(sub_flags(&parsed, "main", "A"), SubFlags::CONSTANT);
    assert_eq!(sub_flags(&parsed, "main", "B"), SubFlags::CONSTANT);
    assert_eq!(
        parsed.stmt(1),
        "(ExprStmt (AssignExpr (VarDecl ArrayVar:x) (ParenList (ListExpr Call:A Call:B))))"
    );
}

#[test]
fn single_constant() {
    let parsed = parse_ok("use constant PI => 3.14;\n");
    assert_eq!(sub_flags(&parsed, "main", "PI"), SubFlags::CONSTANT);
}

#[test]
fn declared_types() {
    let parsed = parse_ok("#@type Foo\nmy $x;\nmy Foo::Bar $y;\nmy $z;\n");
    let tree = parsed.tree();
    let decls = tree.descendants_of_kind(tree.root(), NodeKind::VarDecl);
    assert_eq!(decls.len(), 3);
    assert_eq!(
        parsed.out.declared_type(decls[0]),
        Some(&Value::object("Foo"))
    );
    assert_eq!(
        parsed.out.declared_type(decls[1]),
        Some(&Value::object("Foo::Bar"))
    );
    assert_eq!(parsed.out.declared_type(decls[2]), None);
}
