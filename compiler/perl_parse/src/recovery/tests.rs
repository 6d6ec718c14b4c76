use perl_ir::TokenKind;

use super::*;

#[test]
fn test_token_set_membership() {
    let set = TokenSet::new().with(TokenKind::Semicolon).with(TokenKind::RBrace);
    assert_eq!(set.count(), 2);
    assert!(set.contains(TokenKind::Semicolon));
    assert!(set.contains(TokenKind::RBrace));
    assert!(!set.contains(TokenKind::LBrace));
    assert!(TokenSet::new().is_empty());
}

#[test]
fn test_token_set_union() {
    let a = TokenSet::new().with(TokenKind::Comma);
    let b = TokenSet::new().with(TokenKind::Comma).with(TokenKind::FatComma);
    assert_eq!(a.union(b), b);
    assert_eq!(a.union(b).count(), 2);
}

#[test]
fn test_highest_discriminant_fits() {
    let set = TokenSet::new().with(TokenKind::Eof);
    assert!(set.contains(TokenKind::Eof));
    assert!(!set.contains(TokenKind::Error));
    assert!(STMT_END.contains(TokenKind::Eof));
}

#[test]
fn test_term_start_covers_list_arguments() {
    assert_eq!(TERM_START.union(LIST_ARG_START), TERM_START);
    // Ambiguous with infix operators, so not a list argument.
    for kind in [TokenKind::Minus, TokenKind::Plus, TokenKind::LParen, TokenKind::Tilde] {
        assert!(TERM_START.contains(kind), "{kind:?}");
        assert!(!LIST_ARG_START.contains(kind), "{kind:?}");
    }
}

#[test]
fn test_declarators() {
    for kind in [TokenKind::KwMy, TokenKind::KwOur, TokenKind::KwLocal, TokenKind::KwState] {
        assert!(DECLARATORS.contains(kind), "{kind:?}");
    }
    assert_eq!(DECLARATORS.count(), 4);
    assert!(!DECLARATORS.contains(TokenKind::ScalarVar));
    assert_eq!(LIST_ARG_START.union(DECLARATORS), LIST_ARG_START);
}
