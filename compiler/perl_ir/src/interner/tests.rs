#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn test_intern_and_lookup() {
    let interner = StringInterner::new();

    let foo = interner.intern("Foo::Bar");
    let baz = interner.intern("baz");
    let foo2 = interner.intern("Foo::Bar");

    assert_eq!(foo, foo2);
    assert_ne!(foo, baz);
    assert_eq!(interner.lookup(foo), "Foo::Bar");
    assert_eq!(interner.lookup(baz), "baz");
}

#[test]
fn test_empty_string() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn test_get_does_not_insert() {
    let interner = StringInterner::new();
    let before = interner.len();
    assert_eq!(interner.get("never_seen"), None);
    assert_eq!(interner.len(), before);

    let name = interner.intern("never_seen");
    assert_eq!(interner.get("never_seen"), Some(name));
}

#[test]
fn test_common_names_pre_interned() {
    let interner = StringInterner::new();
    assert!(interner.get("main").is_some());
    assert!(interner.get("UNIVERSAL").is_some());
    assert!(!interner.is_empty());
}

#[test]
fn test_shared_interner_across_threads() {
    let interner = SharedInterner::new();
    let other = interner.clone();

    let handle = std::thread::spawn(move || other.intern("Shared::Pkg"));
    let from_thread = handle.join().unwrap();

    assert_eq!(interner.intern("Shared::Pkg"), from_thread);
}

#[test]
fn test_lookup_unknown_name_is_empty() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::new(3, 100_000)), "");
}
