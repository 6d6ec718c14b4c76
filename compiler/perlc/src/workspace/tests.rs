#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use perl_infer::Cancellation;
use perl_ir::{PerlVersion, StringInterner};
use perl_parse::ParseOptions;
use perl_types::{ScalarKind, Value};
use pretty_assertions::assert_eq;

use super::*;
use crate::snapshot::SymbolKind;

const NUM: Value = Value::Scalar(ScalarKind::Number);
const STR: Value = Value::Scalar(ScalarKind::String);

const UTIL: &str = "package Util;\nour @EXPORT_OK = qw(pick);\nsub pick { return [1, 2]; }\n1;\n";
const MAIN: &str = "use Util qw(pick);\nmy $p = pick();\n$p;\n";

fn at(source: &str, needle: &str) -> u32 {
    u32::try_from(source.rfind(needle).unwrap()).unwrap() + 1
}

fn workspace() -> Workspace {
    Workspace::new(AnalysisConfig::default())
}

fn with_files(files: &[(&str, &str)]) -> Workspace {
    let ws = workspace();
    for (path, source) in files {
        ws.update(*path, (*source).to_owned());
    }
    ws
}

// === Updates ===

#[test]
fn unchanged_source_keeps_the_snapshot() {
    let ws = workspace();
    let first = ws.update("main.pl", MAIN.to_owned());
    let again = ws.update("main.pl", MAIN.to_owned());
    assert!(Arc::ptr_eq(&first, &again));

    let edited = ws.update("main.pl", format!("{MAIN}1;\n"));
    assert!(!Arc::ptr_eq(&first, &edited));
    assert!(Arc::ptr_eq(&ws.snapshot(Path::new("main.pl")).unwrap(), &edited));
}

#[test]
fn remove_closes_the_file() {
    let ws = with_files(&[("main.pl", MAIN), ("lib/Util.pm", UTIL)]);
    assert_eq!(
        ws.paths(),
        vec![PathBuf::from("lib/Util.pm"), PathBuf::from("main.pl")]
    );
    assert!(ws.remove(Path::new("main.pl")).is_some());
    assert!(ws.remove(Path::new("main.pl")).is_none());
    assert_eq!(ws.paths(), vec![PathBuf::from("lib/Util.pm")]);
    assert_eq!(
        ws.value_at(Path::new("main.pl"), 0, &Cancellation::new()),
        None
    );
}

#[test]
fn analyze_all_keeps_input_order() {
    let ws = Workspace::new(AnalysisConfig {
        threads: Some(2),
        ..AnalysisConfig::default()
    });
    let files: Vec<(PathBuf, String)> = (0..8)
        .map(|i| (PathBuf::from(format!("f{i}.pl")), format!("my $x{i} = {i};\n")))
        .collect();
    let snapshots = ws.analyze_all(files.clone());
    let paths: Vec<&Path> = snapshots.iter().map(|s| s.path()).collect();
    let expected: Vec<&Path> = files.iter().map(|(p, _)| p.as_path()).collect();
    assert_eq!(paths, expected);
    assert_eq!(ws.paths().len(), 8);
}

// === Cross-file inference ===

#[test]
fn imported_sub_is_inferred_in_its_own_file() {
    let ws = with_files(&[("lib/Util.pm", UTIL), ("main.pl", MAIN)]);
    let offset = at(MAIN, "$p;");
    let value = ws.value_at(Path::new("main.pl"), offset, &Cancellation::new());
    assert_eq!(value, Some(Value::array_ref_of(NUM)));

    // Alone the file cannot see `Util`.
    let alone = ws.snapshot(Path::new("main.pl")).unwrap();
    assert_eq!(alone.value_at(offset), Value::Unknown);
}

#[test]
fn editing_a_dependency_refreshes_summaries() {
    let main = "use Util qw(pick);\nsub wrap { return pick(); }\nmy $w = wrap();\n$w;\n";
    let ws = with_files(&[("lib/Util.pm", UTIL), ("main.pl", main)]);
    let cancel = Cancellation::new();
    let offset = at(main, "$w;");
    assert_eq!(
        ws.value_at(Path::new("main.pl"), offset, &cancel),
        Some(Value::array_ref_of(NUM))
    );

    ws.update("lib/Util.pm", UTIL.replace("[1, 2]", "'x'"));
    assert_eq!(
        ws.value_at(Path::new("main.pl"), offset, &cancel),
        Some(STR)
    );
}

#[test]
fn cyclic_imports_terminate() {
    let a = "package A;\nuse B qw(b);\nour @EXPORT_OK = qw(a);\nsub a { return b(); }\n1;\n";
    let b = "package B;\nuse A qw(a);\nour @EXPORT_OK = qw(b);\nsub b { return a(); }\n1;\n";
    let ws = with_files(&[("A.pm", a), ("B.pm", b)]);
    let value = ws.value_at(Path::new("A.pm"), at(a, "b();"), &Cancellation::new());
    assert_eq!(value, Some(Value::Unknown));
}

#[test]
fn cancelled_query_is_unknown() {
    let ws = with_files(&[("lib/Util.pm", UTIL), ("main.pl", MAIN)]);
    let cancel = Cancellation::new();
    cancel.cancel();
    let value = ws.value_at(Path::new("main.pl"), at(MAIN, "$p;"), &cancel);
    assert_eq!(value, Some(Value::Unknown));
}

#[test]
fn concurrent_queries_agree() {
    let ws = with_files(&[("lib/Util.pm", UTIL), ("main.pl", MAIN)]);
    let offset = at(MAIN, "$p;");
    let values: Vec<Option<Value>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| ws.value_at(Path::new("main.pl"), offset, &Cancellation::new()))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for value in values {
        assert_eq!(value, Some(Value::array_ref_of(NUM)));
    }
}

#[test]
fn documentation_sees_other_files() {
    let ws = with_files(&[("lib/Util.pm", UTIL), ("main.pl", MAIN)]);
    let doc = ws.documentation_at(
        Path::new("main.pl"),
        at(MAIN, "pick()"),
        &Cancellation::new(),
    );
    assert_eq!(
        doc.as_deref(),
        Some("sub main::pick\n\nreturns ArrayRef[Num]")
    );
}

// === Symbols ===

#[test]
fn symbols_and_imports_across_files() {
    let util = "package Util;\nour @EXPORT = qw(trim);\nour @EXPORT_OK = qw(squash);\n\
        sub trim { 1 }\nsub squash { 1 }\n1;\n";
    let main = "use Util;\nmy $x = 1;\n$x;\n";
    let ws = with_files(&[("lib/Util.pm", util), ("main.pl", main)]);

    let symbols = ws.visible_symbols(Path::new("main.pl"), at(main, "$x;")).unwrap();
    for (name, kind) in [
        ("$x", SymbolKind::Lexical),
        ("trim", SymbolKind::Import { module: "Util" }),
        ("Util", SymbolKind::Package),
    ] {
        assert!(
            symbols.iter().any(|s| s.name == name && s.kind == kind),
            "{name} missing from {symbols:?}"
        );
    }

    assert_eq!(
        ws.import_candidates(Path::new("main.pl"), "Util"),
        ImportCandidates {
            default: vec!["trim"],
            optional: vec!["squash"],
        }
    );
    assert_eq!(
        ws.import_candidates(Path::new("missing.pl"), "Util"),
        ImportCandidates::default()
    );
}

#[test]
fn first_file_by_path_owns_a_package() {
    let a = "package Dup;\nsub which { return 1; }\n1;\n";
    let b = "package Dup;\nsub which { return 'b'; }\n1;\n";
    let main = "my $v = Dup::which();\n$v;\n";
    let ws = with_files(&[("b.pm", b), ("a.pm", a), ("main.pl", main)]);
    let value = ws.value_at(Path::new("main.pl"), at(main, "$v;"), &Cancellation::new());
    assert_eq!(value, Some(NUM));
}

// === Libraries ===

const WIDGETS: &str =
    "package Widgets;\nour @EXPORT = qw(make);\n#@returns Widget\nsub make { }\n1;\n";

#[test]
fn library_declared_returns_are_used() {
    let ws = workspace();
    ws.load_library("lib/Widgets.pm", WIDGETS);
    let main = "my $w = Widgets::make();\n$w;\n";
    ws.update("main.pl", main.to_owned());
    let value = ws.value_at(Path::new("main.pl"), at(main, "$w;"), &Cancellation::new());
    assert_eq!(value, Some(Value::object("Widget")));
}

#[test]
fn libraries_come_from_the_stub_cache() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig {
        cache_dir: Some(dir.path().to_path_buf()),
        ..AnalysisConfig::default()
    };

    let first = Workspace::new(config.clone());
    let stored = first.load_library("lib/Widgets.pm", WIDGETS);
    let cache = StubCache::new(dir.path()).unwrap();
    assert!(cache.has(ContentHash::of(WIDGETS), PerlVersion::MINIMUM));

    // A second session reads the stub into its own interner.
    let second = Workspace::new(config);
    let loaded = second.load_library("lib/Widgets.pm", WIDGETS);
    let name = |ws: &Workspace, registry: &Registry| -> Vec<&'static str> {
        let widgets = ws.interner().get("Widgets").unwrap();
        registry
            .package(widgets)
            .unwrap()
            .export
            .iter()
            .map(|&n| ws.interner().lookup(n))
            .collect()
    };
    assert_eq!(name(&first, &stored), vec!["make"]);
    assert_eq!(name(&second, &loaded), vec!["make"]);
}

#[test]
fn open_files_are_stubbed_too() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(AnalysisConfig {
        cache_dir: Some(dir.path().to_path_buf()),
        ..AnalysisConfig::default()
    });
    ws.update("lib/Util.pm", UTIL.to_owned());
    let cache = StubCache::new(dir.path()).unwrap();
    assert!(cache.has(ContentHash::of(UTIL), PerlVersion::MINIMUM));
}

#[test]
fn stub_from_another_perl_version_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let hash = ContentHash::of(UTIL);
    let newer = PerlVersion::new(5, 36, 0);
    let cache = StubCache::new(dir.path()).unwrap();
    let interner = StringInterner::new();
    let registry = parse(&lex(UTIL), UTIL, &interner, ParseOptions::default()).registry;
    cache
        .put(hash, newer, Path::new("lib/Util.pm"), &registry, &interner)
        .unwrap();
    assert!(!cache.has(hash, PerlVersion::MINIMUM));

    let ws = Workspace::new(AnalysisConfig {
        cache_dir: Some(dir.path().to_path_buf()),
        ..AnalysisConfig::default()
    });
    ws.update("lib/Util.pm", UTIL.to_owned());
    assert!(cache.has(hash, PerlVersion::MINIMUM));
    let reader = StringInterner::new();
    assert!(cache.get(hash, PerlVersion::MINIMUM, &reader).unwrap().is_some());
}

#[test]
fn unusable_cache_dir_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("not-a-dir");
    std::fs::write(&file, "x").unwrap();
    let ws = Workspace::new(AnalysisConfig {
        cache_dir: Some(file),
        ..AnalysisConfig::default()
    });
    let registry = ws.load_library("lib/Widgets.pm", WIDGETS);
    let widgets = ws.interner().get("Widgets").unwrap();
    assert!(registry.package(widgets).is_some());
}
