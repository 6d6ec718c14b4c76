use super::*;

#[test]
fn test_keywords_sorted() {
    // `TokenKind::keyword` binary-searches the table.
    for word in ["my", "our", "sub", "package", "x", "xor", "__PACKAGE__", "foreach"] {
        assert!(
            TokenKind::keyword(word).is_some(),
            "{word} should be a keyword"
        );
    }
    assert_eq!(TokenKind::keyword("elsif"), Some(TokenKind::KwElsif));
    assert_eq!(TokenKind::keyword("require"), Some(TokenKind::KwRequire));
    assert_eq!(TokenKind::keyword("return"), Some(TokenKind::KwReturn));
    assert_eq!(TokenKind::keyword("print"), None);
    assert_eq!(TokenKind::keyword("My"), None);
}

#[test]
fn test_trivia_classification() {
    assert!(TokenKind::Comment.is_trivia());
    assert!(TokenKind::Pod.is_trivia());
    assert!(TokenKind::DataSection.is_trivia());
    assert!(!TokenKind::StringContent.is_trivia());
    assert!(!TokenKind::Eof.is_trivia());
}

#[test]
fn test_keyword_range() {
    assert!(TokenKind::KwMy.is_keyword());
    assert!(TokenKind::KwCurrentPackage.is_keyword());
    assert!(!TokenKind::Semicolon.is_keyword());
    assert!(!TokenKind::ReadLine.is_keyword());
}

#[test]
fn test_token_list_kind_past_end() {
    let mut list = TokenList::new();
    list.push(Token::new(TokenKind::Ident, Span::new(0, 3), LexMode::Code));
    assert_eq!(list.kind(0), TokenKind::Ident);
    assert_eq!(list.kind(5), TokenKind::Eof);
    assert_eq!(list.span(5), Span::point(3));
}

#[test]
fn test_token_list_index_at_offset() {
    let list: TokenList = [
        Token::new(TokenKind::KwMy, Span::new(0, 2), LexMode::Code),
        Token::new(TokenKind::ScalarVar, Span::new(3, 5), LexMode::Code),
        Token::new(TokenKind::Semicolon, Span::new(5, 6), LexMode::Code),
    ]
    .into_iter()
    .collect();
    assert_eq!(list.index_at_offset(0), 0);
    assert_eq!(list.index_at_offset(4), 1);
    assert_eq!(list.index_at_offset(5), 1);
    assert_eq!(list.index_at_offset(6), 2);
}

#[test]
fn test_token_text() {
    let source = "my $x;";
    let token = Token::new(TokenKind::ScalarVar, Span::new(3, 5), LexMode::Code);
    assert_eq!(token.text(source), "$x");
}
