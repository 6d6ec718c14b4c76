#![allow(clippy::unwrap_used, clippy::expect_used)]

use perl_ir::{LexMode, TokenKind};
use perl_lexer_core::SourceBuffer;
use pretty_assertions::assert_eq;

use super::{unindent_heredoc, Lexer};
use crate::lex;

use TokenKind::*;

/// Significant tokens as `(kind, text)`, without the trailing `Eof`.
fn significant(src: &str) -> Vec<(TokenKind, &str)> {
    lex(src)
        .tokens
        .iter()
        .filter(|t| t.kind != Eof)
        .map(|t| (t.kind, t.text(src)))
        .collect()
}

fn kinds(src: &str) -> Vec<TokenKind> {
    significant(src).into_iter().map(|(k, _)| k).collect()
}

/// Every token the iterator yields, trivia included.
fn stream(src: &str) -> Vec<TokenKind> {
    let buffer = SourceBuffer::new(src);
    Lexer::new(&buffer).map(|t| t.kind).collect()
}

// === Heredocs ===

#[test]
fn heredoc_body_is_spliced_after_the_line() {
    let src = "my $x = <<END\nBODY\nEND\n;";
    assert_eq!(
        stream(src),
        vec![
            KwMy,
            Whitespace,
            ScalarVar,
            Whitespace,
            Assign,
            Whitespace,
            HeredocOpener,
            Newline,
            StringContent,
            HeredocTerminator,
            Newline,
            Semicolon,
            Eof,
        ]
    );
    assert_eq!(
        significant(src),
        vec![
            (KwMy, "my"),
            (ScalarVar, "$x"),
            (Assign, "="),
            (HeredocOpener, "<<END"),
            (StringContent, "BODY\n"),
            (HeredocTerminator, "END"),
            (Semicolon, ";"),
        ]
    );
}

#[test]
fn heredoc_body_tokens_carry_heredoc_mode() {
    let out = lex("print <<END;\nhi\nEND\n");
    let body = out.tokens.iter().find(|t| t.kind == StringContent).unwrap();
    assert_eq!(body.mode, LexMode::HeredocBody);
}

#[test]
fn heredocs_on_one_line_resolve_in_open_order() {
    let src = "print <<A, <<'B';\na $x\nA\nb $y\nB\n";
    assert_eq!(
        significant(src),
        vec![
            (Ident, "print"),
            (HeredocOpener, "<<A"),
            (Comma, ","),
            (HeredocOpener, "<<'B'"),
            (Semicolon, ";"),
            (StringContent, "a "),
            (ScalarVar, "$x"),
            (StringContent, "\n"),
            (HeredocTerminator, "A"),
            (StringContent, "b $y\n"),
            (HeredocTerminator, "B"),
        ]
    );
}

#[test]
fn indented_heredoc_terminator() {
    let src = "my $t = <<~EOT;\n    hi\n    EOT\n";
    let tokens = significant(src);
    assert_eq!(
        &tokens[3..],
        &[
            (HeredocOpener, "<<~EOT"),
            (Semicolon, ";"),
            (StringContent, "    hi\n"),
            (HeredocTerminator, "    EOT"),
        ]
    );
    assert_eq!(
        unindent_heredoc("    hi\n      more\n", "    EOT"),
        "hi\n  more\n"
    );
}

#[test]
fn unterminated_heredoc_consumes_to_end() {
    let src = "print <<END;\nbody\n";
    assert_eq!(
        significant(src),
        vec![
            (Ident, "print"),
            (HeredocOpener, "<<END"),
            (Semicolon, ";"),
            (StringContent, "body\n"),
            (UnterminatedHeredoc, ""),
        ]
    );
}

#[test]
fn blanks_before_a_quoted_terminator() {
    let src = "print << \"E\", <<~\t'F';\nhi $x\nE\n  bye\n  F\n";
    assert_eq!(
        significant(src),
        vec![
            (Ident, "print"),
            (HeredocOpener, "<< \"E\""),
            (Comma, ","),
            (HeredocOpener, "<<~\t'F'"),
            (Semicolon, ";"),
            (StringContent, "hi "),
            (ScalarVar, "$x"),
            (StringContent, "\n"),
            (HeredocTerminator, "E"),
            (StringContent, "  bye\n"),
            (HeredocTerminator, "  F"),
        ]
    );
}

#[test]
fn shift_is_not_a_heredoc() {
    assert_eq!(kinds("$a << 2"), vec![ScalarVar, Shl, Number]);
    assert_eq!(kinds("$a << $b"), vec![ScalarVar, Shl, ScalarVar]);
    assert_eq!(kinds("print << E"), vec![Ident, Shl, Ident]);
}

// === Quote-likes ===

#[test]
fn unterminated_string() {
    assert_eq!(
        significant("\"abc"),
        vec![(QuoteOpen, "\""), (StringContent, "abc"), (UnterminatedQuote, "")]
    );
}

#[test]
fn interpolated_variables_split_content() {
    let src = r#""a $x b @{y} c $h{k}""#;
    assert_eq!(
        significant(src),
        vec![
            (QuoteOpen, "\""),
            (StringContent, "a "),
            (ScalarVar, "$x"),
            (StringContent, " b "),
            (ArrayVar, "@{y}"),
            (StringContent, " c "),
            (ScalarVar, "$h"),
            (StringContent, "{k}"),
            (QuoteClose, "\""),
        ]
    );
    let out = lex(src);
    let var = out.tokens.iter().find(|t| t.kind == ScalarVar).unwrap();
    assert_eq!(var.mode, LexMode::Interpolated);
}

#[test]
fn expression_blocks_in_strings_are_lexed_as_code() {
    let src = r#""n=${\ join(',', @a)}! @{[ 1 + $x ]}""#;
    assert_eq!(
        significant(src),
        vec![
            (QuoteOpen, "\""),
            (StringContent, "n="),
            (CastScalar, "$"),
            (LBrace, "{"),
            (Backslash, "\\"),
            (Ident, "join"),
            (LParen, "("),
            (QuoteOpen, "'"),
            (StringContent, ","),
            (QuoteClose, "'"),
            (Comma, ","),
            (ArrayVar, "@a"),
            (RParen, ")"),
            (RBrace, "}"),
            (StringContent, "! "),
            (CastArray, "@"),
            (LBrace, "{"),
            (LBracket, "["),
            (Number, "1"),
            (Plus, "+"),
            (ScalarVar, "$x"),
            (RBracket, "]"),
            (RBrace, "}"),
            (QuoteClose, "\""),
        ]
    );
}

#[test]
fn unterminated_expression_block_in_string() {
    assert_eq!(
        kinds("\"a ${ $h{k}"),
        vec![
            QuoteOpen,
            StringContent,
            CastScalar,
            LBrace,
            ScalarVar,
            LBrace,
            Ident,
            RBrace,
            UnterminatedQuote,
        ]
    );
}

#[test]
fn single_quotes_do_not_interpolate() {
    let src = r"'a $x \' b'";
    assert_eq!(
        significant(src),
        vec![(QuoteOpen, "'"), (StringContent, r"a $x \' b"), (QuoteClose, "'")]
    );
    let out = lex(src);
    assert_eq!(out.tokens[1].mode, LexMode::Literal);
}

#[test]
fn bracket_delimiters_nest() {
    assert_eq!(
        significant("q{a{b}c}"),
        vec![(QuoteOpen, "q{"), (StringContent, "a{b}c"), (QuoteClose, "}")]
    );
}

#[test]
fn substitution_with_bracket_pairs() {
    assert_eq!(
        significant("s{a}{b}gi;"),
        vec![
            (QuoteOpen, "s{"),
            (StringContent, "a"),
            (QuoteMid, "}{"),
            (StringContent, "b"),
            (QuoteClose, "}"),
            (QuoteModifiers, "gi"),
            (Semicolon, ";"),
        ]
    );
    assert_eq!(
        significant("s/a/b/;"),
        vec![
            (QuoteOpen, "s/"),
            (StringContent, "a"),
            (QuoteMid, "/"),
            (StringContent, "b"),
            (QuoteClose, "/"),
            (Semicolon, ";"),
        ]
    );
}

#[test]
fn transliteration_with_fresh_second_delimiter() {
    let src = "tr[a-z]\n  [A-Z];";
    assert_eq!(
        significant(src),
        vec![
            (QuoteOpen, "tr["),
            (StringContent, "a-z"),
            (QuoteMid, "]\n  ["),
            (StringContent, "A-Z"),
            (QuoteClose, "]"),
            (Semicolon, ";"),
        ]
    );
}

#[test]
fn hash_delimiter_needs_no_space() {
    assert_eq!(
        significant("q#abc#"),
        vec![(QuoteOpen, "q#"), (StringContent, "abc"), (QuoteClose, "#")]
    );
    let out = lex("q #c\n");
    assert_eq!(out.tokens.kind(0), Ident);
    assert!(out.trivia.iter().any(|t| t.kind == Comment));
}

// === Term / operator disambiguation ===

#[test]
fn slash_is_division_after_a_term() {
    assert_eq!(
        kinds("$x / 2; split /,/, $s;"),
        vec![
            ScalarVar, Slash, Number, Semicolon, Ident, QuoteOpen, StringContent, QuoteClose, Comma,
            ScalarVar, Semicolon,
        ]
    );
}

#[test]
fn percent_is_a_hash_or_modulus() {
    assert_eq!(
        kinds("%h = (a => 1); $n % 2"),
        vec![
            HashVar, Assign, LParen, Ident, FatComma, Number, RParen, Semicolon, ScalarVar,
            Percent, Number,
        ]
    );
}

#[test]
fn quote_words_as_hash_keys_and_method_names() {
    assert_eq!(
        significant("$h{s} = 1; my %o = (q => 1, y => 2); $obj->y(1);"),
        vec![
            (ScalarVar, "$h"),
            (LBrace, "{"),
            (Ident, "s"),
            (RBrace, "}"),
            (Assign, "="),
            (Number, "1"),
            (Semicolon, ";"),
            (KwMy, "my"),
            (HashVar, "%o"),
            (Assign, "="),
            (LParen, "("),
            (Ident, "q"),
            (FatComma, "=>"),
            (Number, "1"),
            (Comma, ","),
            (Ident, "y"),
            (FatComma, "=>"),
            (Number, "2"),
            (RParen, ")"),
            (Semicolon, ";"),
            (ScalarVar, "$obj"),
            (Arrow, "->"),
            (Ident, "y"),
            (LParen, "("),
            (Number, "1"),
            (RParen, ")"),
            (Semicolon, ";"),
        ]
    );
}

#[test]
fn repetition_operator() {
    assert_eq!(
        significant("$s x 3; $s x= 2; (x => 1)"),
        vec![
            (ScalarVar, "$s"),
            (KwX, "x"),
            (Number, "3"),
            (Semicolon, ";"),
            (ScalarVar, "$s"),
            (OpAssign, "x="),
            (Number, "2"),
            (Semicolon, ";"),
            (LParen, "("),
            (Ident, "x"),
            (FatComma, "=>"),
            (Number, "1"),
            (RParen, ")"),
        ]
    );
}

#[test]
fn readline_and_comparison() {
    assert_eq!(
        significant("while (<$fh>) {} my @l = <STDIN>; 1 < 2;"),
        vec![
            (KwWhile, "while"),
            (LParen, "("),
            (ReadLine, "<$fh>"),
            (RParen, ")"),
            (LBrace, "{"),
            (RBrace, "}"),
            (KwMy, "my"),
            (ArrayVar, "@l"),
            (Assign, "="),
            (ReadLine, "<STDIN>"),
            (Semicolon, ";"),
            (Number, "1"),
            (LAngle, "<"),
            (Number, "2"),
            (Semicolon, ";"),
        ]
    );
}

#[test]
fn file_test_operator() {
    assert_eq!(
        significant("if (-e $f) {}"),
        vec![
            (KwIf, "if"),
            (LParen, "("),
            (FileTest, "-e"),
            (ScalarVar, "$f"),
            (RParen, ")"),
            (LBrace, "{"),
            (RBrace, "}"),
        ]
    );
    assert_eq!(
        kinds("(-norequire => 1)"),
        vec![LParen, Minus, Ident, FatComma, Number, RParen]
    );
}

// === Variables ===

#[test]
fn variable_forms() {
    let src = "$#a $#{$r} $$r ${^WARNING_BITS} @$r $::x $Foo::bar @{$r} $_[0]";
    assert_eq!(
        significant(src),
        vec![
            (ArrayLastIndex, "$#a"),
            (CastLastIndex, "$#"),
            (LBrace, "{"),
            (ScalarVar, "$r"),
            (RBrace, "}"),
            (CastScalar, "$"),
            (ScalarVar, "$r"),
            (ScalarVar, "${^WARNING_BITS}"),
            (CastArray, "@"),
            (ScalarVar, "$r"),
            (ScalarVar, "$::x"),
            (ScalarVar, "$Foo::bar"),
            (CastArray, "@"),
            (LBrace, "{"),
            (ScalarVar, "$r"),
            (RBrace, "}"),
            (ScalarVar, "$_"),
            (LBracket, "["),
            (Number, "0"),
            (RBracket, "]"),
        ]
    );
}

#[test]
fn prototype_is_one_token() {
    assert_eq!(
        significant("sub f ($;$) { }"),
        vec![
            (KwSub, "sub"),
            (Ident, "f"),
            (LParen, "("),
            (StringContent, "$;$"),
            (RParen, ")"),
            (LBrace, "{"),
            (RBrace, "}"),
        ]
    );
    assert_eq!(
        kinds("sub g ($x, $y) {}"),
        vec![KwSub, Ident, LParen, ScalarVar, Comma, ScalarVar, RParen, LBrace, RBrace]
    );
}

// === Literals and trivia ===

#[test]
fn numbers_and_versions() {
    assert_eq!(
        significant("1..10; 0x1F; 1_000; 3.14e-2; 5.10.1; v5.36;"),
        vec![
            (Number, "1"),
            (Range, ".."),
            (Number, "10"),
            (Semicolon, ";"),
            (Number, "0x1F"),
            (Semicolon, ";"),
            (Number, "1_000"),
            (Semicolon, ";"),
            (Number, "3.14e-2"),
            (Semicolon, ";"),
            (VString, "5.10.1"),
            (Semicolon, ";"),
            (VString, "v5.36"),
            (Semicolon, ";"),
        ]
    );
}

#[test]
fn use_version_is_a_vstring() {
    assert_eq!(
        significant("use v5.36;"),
        vec![(KwUse, "use"), (VString, "v5.36"), (Semicolon, ";")]
    );
}

#[test]
fn pod_and_data_section_are_trivia() {
    let src = "=pod\n\ndoc\n\n=cut\nmy $x;\n__END__\nstuff\n";
    assert_eq!(
        stream(src),
        vec![Pod, Newline, KwMy, Whitespace, ScalarVar, Semicolon, Newline, DataSection, Eof]
    );
    let out = lex(src);
    assert_eq!(out.trivia[0].text(src), "=pod\n\ndoc\n\n=cut");
    assert_eq!(out.trivia.last().unwrap().text(src), "__END__\nstuff\n");
}

#[test]
fn current_package_method_call() {
    assert_eq!(
        significant("__PACKAGE__->new"),
        vec![(KwCurrentPackage, "__PACKAGE__"), (Arrow, "->"), (Ident, "new")]
    );
}

#[test]
fn byte_order_mark_is_whitespace() {
    assert_eq!(stream("\u{feff}1"), vec![Whitespace, Number, Eof]);
}

#[test]
fn stray_bytes_become_error_tokens() {
    assert_eq!(
        significant("1 \u{1} 2"),
        vec![(Number, "1"), (Error, "\u{1}"), (Number, "2")]
    );
}

// === Iterator and checkpoints ===

#[test]
fn eof_is_yielded_once() {
    let buffer = SourceBuffer::new("1");
    let mut lexer = Lexer::new(&buffer);
    assert_eq!(lexer.next().map(|t| t.kind), Some(Number));
    assert_eq!(lexer.next().map(|t| t.kind), Some(Eof));
    assert_eq!(lexer.next(), None);
    assert_eq!(lexer.next(), None);
}

#[test]
fn resume_from_line_start_checkpoint() {
    let src = "my $a = 1;\nmy $b = $a / 2;\n";
    let buffer = SourceBuffer::new(src);
    let full: Vec<_> = Lexer::new(&buffer).collect();

    let mut lexer = Lexer::new(&buffer);
    let mut head = Vec::new();
    let checkpoint = loop {
        if lexer.offset() > 0 && lexer.at_clean_line_start() {
            break lexer.checkpoint().unwrap();
        }
        head.push(lexer.next().unwrap());
    };
    assert_eq!(checkpoint.offset, 11);

    let tail: Vec<_> = Lexer::resume(&buffer, &checkpoint).collect();
    head.extend(tail);
    assert_eq!(head, full);
}

#[test]
fn no_checkpoint_while_tokens_are_queued() {
    let buffer = SourceBuffer::new("s{a}{b}x");
    let mut lexer = Lexer::new(&buffer);
    while let Some(token) = lexer.next() {
        if token.kind == QuoteClose {
            assert!(lexer.checkpoint().is_none());
            break;
        }
    }
}
