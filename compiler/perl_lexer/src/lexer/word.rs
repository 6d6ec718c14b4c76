//! Words (identifiers, keywords, quote-like operators) and numbers.

use perl_ir::{Token, TokenKind};
use perl_lexer_core::is_blank;

use super::quote::QuoteKind;
use super::Lexer;

/// Builtins and common list operators after which a term is expected:
/// `print /x/`, `push @a, ...`, `split /,/, $s`.
///
/// Sorted for binary search.
const NAMED_OPS: &[&str] = &[
    "abs", "binmode", "bless", "carp", "chdir", "chomp", "chop", "chr", "close", "cluck",
    "confess", "croak", "defined", "delete", "die", "each", "exec", "exists", "exit", "grep",
    "hex", "index", "int", "join", "keys", "lc", "lcfirst", "length", "lock", "map", "mkdir",
    "oct", "open", "ord", "pack", "pop", "print", "printf", "push", "quotemeta", "ref",
    "reverse", "rindex", "rmdir", "say", "scalar", "select", "shift", "sleep", "sort",
    "splice", "split", "sprintf", "sqrt", "stat", "substr", "system", "uc", "ucfirst", "undef",
    "unlink", "unpack", "unshift", "values", "warn",
];

/// Does a term follow this word when it is used as a function name?
pub(crate) fn is_named_op(word: &str) -> bool {
    NAMED_OPS.binary_search(&word).is_ok()
}

impl Lexer<'_> {
    pub(super) fn lex_word(&mut self, start: u32) -> Token {
        let end = self.scan_word_end(start);
        self.cursor.set_pos(end);
        let word = self.cursor.slice(start, end);

        if matches!(word, "__END__" | "__DATA__") && self.prev_kind != TokenKind::Arrow {
            self.cursor.set_pos(self.cursor.source_len());
            return self.emit(TokenKind::DataSection, start);
        }
        let forced = self.word_is_forced(end);
        let after_module_keyword = matches!(
            self.prev_kind,
            TokenKind::KwUse | TokenKind::KwNo | TokenKind::KwRequire
        );
        if is_version_word(word) && (!forced || after_module_keyword) {
            self.eat_version_parts();
            return self.emit(TokenKind::VString, start);
        }
        if forced {
            return self.emit(TokenKind::Ident, start);
        }
        if let Some(kind) = QuoteKind::from_word(word) {
            if self.quote_delimiter_follows(end) {
                return self.open_quote(kind, start);
            }
        }
        match TokenKind::keyword(word) {
            Some(TokenKind::KwX) if self.expect_term => self.emit(TokenKind::Ident, start),
            Some(TokenKind::KwX) if self.cursor.current() == b'=' && self.cursor.peek() != b'=' => {
                self.cursor.advance();
                self.emit(TokenKind::OpAssign, start)
            }
            Some(kind) => self.emit(kind, start),
            None => self.emit(TokenKind::Ident, start),
        }
    }

    /// End of the word at `start`, including `::` separators and a
    /// trailing `::` (`Foo::->new`).
    fn scan_word_end(&self, start: u32) -> u32 {
        let end = self.scan_name(start);
        if self.cursor.byte_at(end) == b':' && self.cursor.byte_at(end + 1) == b':' {
            end + 2
        } else {
            end
        }
    }

    /// Words that are never keywords or quote operators: method names,
    /// sub names, hash keys and the left side of `=>`.
    fn word_is_forced(&self, end: u32) -> bool {
        match self.prev_kind {
            TokenKind::Arrow
            | TokenKind::KwSub
            | TokenKind::KwPackage
            | TokenKind::KwRequire
            | TokenKind::KwUse
            | TokenKind::KwNo => return true,
            TokenKind::LBrace if self.next_non_blank(end) == b'}' => return true,
            _ => {}
        }
        self.fat_comma_at(end)
    }

    /// A quote operator needs a delimiter on the same line.
    fn quote_delimiter_follows(&self, end: u32) -> bool {
        let mut pos = end;
        while is_blank(self.cursor.byte_at(pos)) {
            pos += 1;
        }
        let had_space = pos > end;
        if pos >= self.cursor.source_len() {
            return false;
        }
        let delim = self.cursor.byte_at(pos);
        match delim {
            b'\n' | b',' | b';' | b')' => false,
            b'=' => !had_space && self.cursor.byte_at(pos + 1) != b'>',
            b'#' => !had_space,
            _ => delim.is_ascii_punctuation(),
        }
    }

    fn eat_version_parts(&mut self) {
        while self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
        }
    }

    /// Numeric literals: decimal, `0x`, `0b`, octal, fractions,
    /// exponents, and dotted version strings such as `5.10.1`.
    pub(super) fn lex_number(&mut self, start: u32) -> Token {
        let c = self.cursor.current();
        let p = self.cursor.peek();
        if c == b'0' && matches!(p, b'x' | b'X') {
            self.cursor.advance_n(2);
            self.cursor.eat_while(|b| b.is_ascii_hexdigit() || b == b'_');
            return self.emit(TokenKind::Number, start);
        }
        if c == b'0' && matches!(p, b'b' | b'B') {
            self.cursor.advance_n(2);
            self.cursor.eat_while(|b| matches!(b, b'0' | b'1' | b'_'));
            return self.emit(TokenKind::Number, start);
        }

        self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
        if self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
            if self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit() {
                self.eat_version_parts();
                return self.emit(TokenKind::VString, start);
            }
        }
        if matches!(self.cursor.current(), b'e' | b'E') {
            let p = self.cursor.peek();
            let digit_after_sign =
                matches!(p, b'+' | b'-') && self.cursor.peek_at(2).is_ascii_digit();
            if p.is_ascii_digit() || digit_after_sign {
                self.cursor.advance_n(if digit_after_sign { 2 } else { 1 });
                self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
            }
        }
        self.emit(TokenKind::Number, start)
    }
}

/// `v5`, `v5.36` (but not `v` or `vec`).
fn is_version_word(word: &str) -> bool {
    word.strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

