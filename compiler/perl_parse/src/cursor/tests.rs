#![allow(clippy::unwrap_used, clippy::expect_used)]

use perl_ir::TokenKind;
use perl_lexer::lex;
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_walks_code_tokens() {
    let out = lex("my $x = 1;");
    let mut cursor = Cursor::new(&out.tokens);
    let mut kinds = vec![cursor.current_kind()];
    while !cursor.is_at_end() {
        assert!(cursor.advance().is_empty());
        kinds.push(cursor.current_kind());
    }
    assert_eq!(
        kinds,
        vec![
            TokenKind::KwMy,
            TokenKind::ScalarVar,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
    // Stays put at the end.
    assert!(cursor.advance().is_empty());
    assert!(cursor.is_at_end());
}

#[test]
fn test_peek_clamps_to_eof() {
    let out = lex("foo");
    let cursor = Cursor::new(&out.tokens);
    assert_eq!(cursor.peek_kind(0), TokenKind::Ident);
    assert_eq!(cursor.peek_kind(1), TokenKind::Eof);
    assert_eq!(cursor.peek_kind(50), TokenKind::Eof);
    assert_eq!(cursor.previous_kind(), TokenKind::Eof);
}

#[test]
fn test_heredoc_body_is_skipped_and_reported() {
    let source = "print <<END;\nhello\nEND\nfoo();\n";
    let out = lex(source);
    let mut cursor = Cursor::new(&out.tokens);
    let mut skipped = Vec::new();
    while !cursor.is_at_end() {
        assert_ne!(cursor.current().mode, perl_ir::LexMode::HeredocBody);
        let body = cursor.advance();
        skipped.extend(body.map(|i| out.tokens.kind(i as usize)));
    }
    assert!(skipped.contains(&TokenKind::HeredocTerminator));
    assert!(cursor.trailing_bodies().is_empty());
}
