#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

// === PerlVersion parsing ===

#[test]
fn test_parse_vstring_forms() {
    assert_eq!(
        PerlVersion::parse("v5.12.1"),
        Some(PerlVersion::new(5, 12, 1))
    );
    assert_eq!(
        PerlVersion::parse("v5.36"),
        Some(PerlVersion::new(5, 36, 0))
    );
    assert_eq!(PerlVersion::parse("v5"), Some(PerlVersion::new(5, 0, 0)));
    assert_eq!(
        PerlVersion::parse("5.12.1"),
        Some(PerlVersion::new(5, 12, 1))
    );
}

#[test]
fn test_parse_decimal_forms() {
    assert_eq!(
        PerlVersion::parse("5.012001"),
        Some(PerlVersion::new(5, 12, 1))
    );
    assert_eq!(
        PerlVersion::parse("5.012"),
        Some(PerlVersion::new(5, 12, 0))
    );
    assert_eq!(
        PerlVersion::parse("5.010_001"),
        Some(PerlVersion::new(5, 10, 1))
    );
    // Decimal fractions are read in groups of three digits.
    assert_eq!(
        PerlVersion::parse("5.12"),
        Some(PerlVersion::new(5, 120, 0))
    );
    assert_eq!(PerlVersion::parse("5"), Some(PerlVersion::new(5, 0, 0)));
}

#[test]
fn test_parse_rejects_garbage() {
    assert_eq!(PerlVersion::parse("strict"), None);
    assert_eq!(PerlVersion::parse("5.x"), None);
    assert_eq!(PerlVersion::parse(""), None);
}

#[test]
fn test_version_display_and_order() {
    assert_eq!(PerlVersion::new(5, 12, 1).to_string(), "v5.12.1");
    assert!(PerlVersion::new(5, 10, 1) < PerlVersion::new(5, 12, 0));
}

// === FeatureTable ===

#[test]
fn test_default_table() {
    let table = FeatureTable::default();
    assert!(!table.is_enabled(Features::STRICT));
    assert!(table.is_enabled(Features::INDIRECT));
    assert_eq!(table.min_version(), PerlVersion::MINIMUM);
}

#[test]
fn test_use_strict_and_no_strict_refs() {
    let table = FeatureTable::default().with_pragma("strict", &[], true);
    assert!(table.is_enabled(Features::STRICT));

    let relaxed = table.with_pragma("strict", &["refs"], false);
    assert!(!relaxed.is_enabled(Features::STRICT_REFS));
    assert!(relaxed.is_enabled(Features::STRICT_VARS));
    // The original is untouched.
    assert!(table.is_enabled(Features::STRICT_REFS));
}

#[test]
fn test_use_version_bundles() {
    let table = FeatureTable::default().with_version(PerlVersion::new(5, 12, 0));
    assert!(table.is_enabled(Features::STRICT));
    assert!(table.is_enabled(Features::SAY));
    assert!(table.is_enabled(Features::UNICODE_STRINGS));
    assert!(!table.is_enabled(Features::WARNINGS));
    assert_eq!(table.min_version(), PerlVersion::new(5, 12, 0));

    let modern = FeatureTable::default().with_version(PerlVersion::new(5, 36, 0));
    assert!(modern.is_enabled(Features::SIGNATURES));
    assert!(modern.is_enabled(Features::WARNINGS));
    assert!(!modern.is_enabled(Features::INDIRECT));
    assert!(!modern.is_enabled(Features::SWITCH));
}

#[test]
fn test_old_version_has_no_bundle() {
    let table = FeatureTable::default().with_version(PerlVersion::new(5, 8, 1));
    assert!(!table.is_enabled(Features::SAY));
    assert!(!table.is_enabled(Features::STRICT));
}

#[test]
fn test_version_floor_never_lowers() {
    let table = FeatureTable::default()
        .with_version(PerlVersion::new(5, 20, 0))
        .with_version(PerlVersion::new(5, 10, 0));
    assert_eq!(table.min_version(), PerlVersion::new(5, 20, 0));
}

#[test]
fn test_use_feature_names_and_bundles() {
    let table = FeatureTable::default().with_pragma("feature", &["say", "state"], true);
    assert_eq!(
        table.enabled_feature_names(),
        vec!["say", "state", "indirect", "multidimensional", "bareword_filehandles"]
    );

    let bundled = FeatureTable::default().with_pragma("feature", &[":5.10"], true);
    assert!(bundled.is_enabled(Features::SWITCH));

    let off = bundled.with_pragma("feature", &["switch"], false);
    assert!(!off.is_enabled(Features::SWITCH));
}

#[test]
fn test_unknown_pragma_is_ignored() {
    let table = FeatureTable::default();
    assert_eq!(table.with_pragma("Some::Module", &["foo"], true), table);
    assert_eq!(
        table.with_pragma("feature", &["no_such_feature"], true),
        table
    );
}

#[test]
fn test_strict_modules() {
    let table = FeatureTable::default().with_pragma("Moose", &[], true);
    assert!(table.is_enabled(Features::STRICT | Features::WARNINGS));
    assert_eq!(table.enabled_pragma_names()[..2], ["strict", "warnings"]);
}
