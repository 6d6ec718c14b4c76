//! The streaming Perl lexer.
//!
//! # Modes
//!
//! Code-mode lexing is the default. Opening a quote-like (`"`, `q{`, `s/`,
//! `//`, ...) pushes a [`QuoteState`] onto `modes`; its closing delimiter
//! pops it. Heredoc openers do not change mode: they append a
//! [`PendingHeredoc`] and the body is lexed when the next code-mode newline
//! is emitted, one pending heredoc per newline in open order.
//!
//! Tokens that a single step produces in bulk (a heredoc body, the
//! modifiers after a closing delimiter) are buffered in `queue`.
//!
//! # Term/operator disambiguation
//!
//! `/`, `%`, `&`, `*`, `<`, `x`, `-X` and `{`-adjacent words are resolved
//! with `expect_term`, which is recomputed after every significant token.

mod heredoc;
mod quote;
mod sigil;
mod word;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;

use perl_ir::{LexMode, Span, Token, TokenKind};
use perl_lexer_core::{is_blank, is_ident_start, Cursor, SourceBuffer};

use crate::LexCheckpoint;
pub use heredoc::unindent_heredoc;
pub(crate) use heredoc::PendingHeredoc;
pub(crate) use quote::QuoteState;

/// Streaming lexer: an iterator of every token, trivia included, ending
/// with a single [`TokenKind::Eof`].
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    modes: Vec<QuoteState>,
    pending_heredocs: VecDeque<PendingHeredoc>,
    queue: VecDeque<Token>,
    expect_term: bool,
    prev_kind: TokenKind,
    /// 1 right after `sub`, 2 after `sub NAME`, else 0.
    after_sub: u8,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(buffer: &'a SourceBuffer<'_>) -> Self {
        Lexer {
            cursor: buffer.cursor(),
            modes: Vec::new(),
            pending_heredocs: VecDeque::new(),
            queue: VecDeque::new(),
            expect_term: true,
            prev_kind: TokenKind::Semicolon,
            after_sub: 0,
            finished: false,
        }
    }

    /// Continue lexing `buffer` from a checkpoint taken on an earlier text
    /// whose bytes before `checkpoint.offset` are identical.
    pub fn resume(buffer: &'a SourceBuffer<'_>, checkpoint: &LexCheckpoint) -> Self {
        Lexer {
            cursor: buffer.cursor_at(checkpoint.offset),
            modes: checkpoint.modes.clone(),
            pending_heredocs: checkpoint.pending_heredocs.clone(),
            queue: VecDeque::new(),
            expect_term: checkpoint.expect_term,
            prev_kind: checkpoint.prev_kind,
            after_sub: checkpoint.after_sub,
            finished: false,
        }
    }

    /// Snapshot of the lexer state at the current offset.
    ///
    /// `None` while buffered tokens are waiting to be returned, since those
    /// are not part of the resumable state.
    pub fn checkpoint(&self) -> Option<LexCheckpoint> {
        if !self.queue.is_empty() || self.finished {
            return None;
        }
        Some(LexCheckpoint {
            offset: self.cursor.pos(),
            expect_term: self.expect_term,
            prev_kind: self.prev_kind,
            after_sub: self.after_sub,
            modes: self.modes.clone(),
            pending_heredocs: self.pending_heredocs.clone(),
        })
    }

    /// True at a physical line start in plain code with nothing pending.
    ///
    /// Never true at the end of non-empty input: POD, `__END__` and
    /// unterminated constructs extend to the end, so text appended there
    /// changes tokens that were already emitted.
    pub fn at_clean_line_start(&self) -> bool {
        self.cursor.at_line_start()
            && (!self.cursor.is_eof() || self.cursor.pos() == 0)
            && self.modes.is_empty()
            && self.pending_heredocs.is_empty()
            && self.queue.is_empty()
            && !self.finished
    }

    #[inline]
    pub fn offset(&self) -> u32 {
        self.cursor.pos()
    }

    fn next_token(&mut self) -> Option<Token> {
        if let Some(token) = self.queue.pop_front() {
            return Some(token);
        }
        if self.finished {
            return None;
        }
        if let Some(state) = self.modes.last() {
            if state.code_depth > 0 {
                return Some(self.lex_interpolated_code());
            }
            return Some(self.lex_quote());
        }
        if self.cursor.is_eof() {
            if !self.pending_heredocs.is_empty() {
                self.flush_unterminated_heredocs();
                return self.queue.pop_front();
            }
            self.finished = true;
            let end = self.cursor.pos();
            return Some(Token::new(TokenKind::Eof, Span::point(end), LexMode::Code));
        }
        Some(self.lex_code())
    }

    /// Build a code-mode token from `start` to the cursor and update the
    /// term/operator state.
    fn emit(&mut self, kind: TokenKind, start: u32) -> Token {
        let span = Span::new(start, self.cursor.pos());
        if !kind.is_trivia() {
            self.expect_term = self.term_follows(kind, span);
            self.after_sub = match kind {
                TokenKind::KwSub => 1,
                TokenKind::Ident if self.after_sub == 1 => 2,
                _ => 0,
            };
            self.prev_kind = kind;
        }
        Token::new(kind, span, LexMode::Code)
    }

    fn term_follows(&self, kind: TokenKind, span: Span) -> bool {
        match kind {
            TokenKind::ScalarVar
            | TokenKind::ArrayVar
            | TokenKind::HashVar
            | TokenKind::CodeVar
            | TokenKind::GlobVar
            | TokenKind::ArrayLastIndex
            | TokenKind::Number
            | TokenKind::VString
            | TokenKind::QuoteClose
            | TokenKind::QuoteModifiers
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::ReadLine
            | TokenKind::HeredocOpener
            | TokenKind::KwCurrentPackage
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => false,
            TokenKind::Ident => {
                self.prev_kind != TokenKind::Arrow
                    && word::is_named_op(self.cursor.slice(span.start, span.end))
            }
            _ => true,
        }
    }

    fn lex_code(&mut self) -> Token {
        let start = self.cursor.pos();
        let c = self.cursor.current();

        if start == 0 && self.cursor.starts_with(&[0xEF, 0xBB, 0xBF]) {
            self.cursor.advance_n(3);
            return self.emit(TokenKind::Whitespace, start);
        }
        if c == b'=' && self.cursor.at_line_start() && self.cursor.peek().is_ascii_alphabetic() {
            return self.lex_pod(start);
        }

        match c {
            b'\n' => {
                self.cursor.advance();
                let token = self.emit(TokenKind::Newline, start);
                if self.prev_kind == TokenKind::RBrace {
                    // `}` ending a line usually closes a block.
                    self.expect_term = true;
                }
                if !self.pending_heredocs.is_empty() {
                    self.splice_heredoc();
                }
                token
            }
            c if is_blank(c) => {
                self.cursor.eat_blanks();
                self.emit(TokenKind::Whitespace, start)
            }
            b'#' => {
                self.cursor.eat_until_newline_or_eof();
                self.emit(TokenKind::Comment, start)
            }
            b'0'..=b'9' => self.lex_number(start),
            c if is_ident_start(c) => self.lex_word(start),
            b':' if self.cursor.peek() == b':' && is_ident_start(self.cursor.peek_at(2)) => {
                self.lex_word(start)
            }
            b'$' => self.lex_dollar(start),
            b'@' => self.lex_at(start),
            b'%' => self.lex_percent(start),
            b'&' => self.lex_amp(start),
            b'*' => self.lex_star(start),
            b'"' => self.open_quote(quote::QuoteKind::Double, start),
            b'\'' => self.open_quote(quote::QuoteKind::Single, start),
            b'`' => self.open_quote(quote::QuoteKind::Backtick, start),
            b'/' if self.expect_term => self.open_quote(quote::QuoteKind::Slash, start),
            b'/' => self.lex_slash_op(start),
            b'<' => self.lex_less(start),
            b'.' if self.expect_term && self.cursor.peek().is_ascii_digit() => {
                self.lex_number(start)
            }
            _ => self.lex_punct(start),
        }
    }

    /// `=pod` .. `=cut`, up to the end of the `=cut` line.
    fn lex_pod(&mut self, start: u32) -> Token {
        let len = self.cursor.source_len();
        let mut line_start = start;
        loop {
            let line_end = self.cursor.line_end_from(line_start);
            let line = self.cursor.slice(line_start, line_end);
            let is_cut = line
                .strip_prefix("=cut")
                .is_some_and(|rest| !rest.starts_with(|ch: char| ch.is_ascii_alphanumeric()));
            if is_cut || line_end >= len {
                self.cursor.set_pos(line_end);
                break;
            }
            line_start = line_end + 1;
        }
        let span = Span::new(start, self.cursor.pos());
        Token::new(TokenKind::Pod, span, LexMode::Pod)
    }

    fn lex_slash_op(&mut self, start: u32) -> Token {
        let kind = if self.cursor.starts_with(b"//=") {
            self.cursor.advance_n(3);
            TokenKind::OpAssign
        } else if self.cursor.starts_with(b"//") {
            self.cursor.advance_n(2);
            TokenKind::DefinedOr
        } else if self.cursor.starts_with(b"/=") {
            self.cursor.advance_n(2);
            TokenKind::OpAssign
        } else {
            self.cursor.advance();
            TokenKind::Slash
        };
        self.emit(kind, start)
    }

    /// `<` in all its roles: heredoc opener, `<FH>`, comparison, shift.
    fn lex_less(&mut self, start: u32) -> Token {
        if self.expect_term {
            if self.cursor.peek() == b'<' {
                if let Some(token) = self.try_heredoc_opener(start) {
                    return token;
                }
                if self.cursor.starts_with(b"<<>>") {
                    self.cursor.advance_n(4);
                    return self.emit(TokenKind::ReadLine, start);
                }
            }
            let mut i = start + 1;
            if self.cursor.byte_at(i) == b'$' {
                i += 1;
            }
            while perl_lexer_core::is_ident_continue(self.cursor.byte_at(i))
                || self.cursor.byte_at(i) == b':'
            {
                i += 1;
            }
            if self.cursor.byte_at(i) == b'>' {
                self.cursor.set_pos(i + 1);
                return self.emit(TokenKind::ReadLine, start);
            }
        }
        let (kind, len) = if self.cursor.starts_with(b"<=>") {
            (TokenKind::Spaceship, 3)
        } else if self.cursor.starts_with(b"<<=") {
            (TokenKind::OpAssign, 3)
        } else if self.cursor.starts_with(b"<=") {
            (TokenKind::LtEq, 2)
        } else if self.cursor.starts_with(b"<<") {
            (TokenKind::Shl, 2)
        } else {
            (TokenKind::LAngle, 1)
        };
        self.cursor.advance_n(len);
        self.emit(kind, start)
    }

    /// Operators and delimiters that need no term/operator context beyond
    /// file tests.
    fn lex_punct(&mut self, start: u32) -> Token {
        let c = self.cursor.current();
        let p = self.cursor.peek();
        let p2 = self.cursor.peek_at(2);
        let (kind, len) = match c {
            b';' => (TokenKind::Semicolon, 1),
            b',' => (TokenKind::Comma, 1),
            b'(' => return self.lex_lparen(start),
            b')' => (TokenKind::RParen, 1),
            b'[' => (TokenKind::LBracket, 1),
            b']' => (TokenKind::RBracket, 1),
            b'{' => (TokenKind::LBrace, 1),
            b'}' => (TokenKind::RBrace, 1),
            b'\\' => (TokenKind::Backslash, 1),
            b'?' => (TokenKind::Question, 1),
            b':' => (TokenKind::Colon, 1),
            b'-' => match p {
                b'>' => (TokenKind::Arrow, 2),
                b'-' => (TokenKind::MinusMinus, 2),
                b'=' => (TokenKind::OpAssign, 2),
                _ if self.expect_term && self.is_file_test() => (TokenKind::FileTest, 2),
                _ => (TokenKind::Minus, 1),
            },
            b'+' => match p {
                b'+' => (TokenKind::PlusPlus, 2),
                b'=' => (TokenKind::OpAssign, 2),
                _ => (TokenKind::Plus, 1),
            },
            b'.' => match (p, p2) {
                (b'.', b'.') => (TokenKind::Ellipsis, 3),
                (b'.', _) => (TokenKind::Range, 2),
                (b'=', _) => (TokenKind::OpAssign, 2),
                _ => (TokenKind::Dot, 1),
            },
            b'=' => match p {
                b'=' => (TokenKind::NumEq, 2),
                b'~' => (TokenKind::Match, 2),
                b'>' => (TokenKind::FatComma, 2),
                _ => (TokenKind::Assign, 1),
            },
            b'!' => match p {
                b'=' => (TokenKind::NumNe, 2),
                b'~' => (TokenKind::NotMatch, 2),
                _ => (TokenKind::Bang, 1),
            },
            b'~' if p == b'~' => (TokenKind::SmartMatch, 2),
            b'~' => (TokenKind::Tilde, 1),
            b'|' => match (p, p2) {
                (b'|', b'=') => (TokenKind::OpAssign, 3),
                (b'|', _) => (TokenKind::OrOr, 2),
                (b'=', _) => (TokenKind::OpAssign, 2),
                _ => (TokenKind::Pipe, 1),
            },
            b'^' if p == b'=' => (TokenKind::OpAssign, 2),
            b'^' => (TokenKind::Caret, 1),
            b'>' => match (p, p2) {
                (b'>', b'=') => (TokenKind::OpAssign, 3),
                (b'>', _) => (TokenKind::Shr, 2),
                (b'=', _) => (TokenKind::GtEq, 2),
                _ => (TokenKind::RAngle, 1),
            },
            _ => {
                self.cursor.advance_char();
                return self.emit(TokenKind::Error, start);
            }
        };
        self.cursor.advance_n(len);
        self.emit(kind, start)
    }

    /// `-e $file` style file tests: a single test letter not followed by
    /// a word character or `=>`.
    fn is_file_test(&self) -> bool {
        const LETTERS: &[u8] = b"erwxoRWXOezsfdlpSbcugktTBAMC";
        let letter = self.cursor.peek();
        if !LETTERS.contains(&letter)
            || perl_lexer_core::is_ident_continue(self.cursor.peek_at(2))
        {
            return false;
        }
        !self.fat_comma_at(self.cursor.pos() + 2)
    }

    /// `(`, which after `sub` or `sub NAME` may open a prototype. A
    /// prototype body is passed through as one `StringContent` token so
    /// that `$;` and `$)` are not read as variables.
    fn lex_lparen(&mut self, start: u32) -> Token {
        if self.after_sub > 0 {
            let mut i = start + 1;
            while b"$@%&*;\\[]+_ \t".contains(&self.cursor.byte_at(i)) {
                i += 1;
            }
            if i > start + 1 && self.cursor.byte_at(i) == b')' {
                self.cursor.advance();
                let token = self.emit(TokenKind::LParen, start);
                let body = Span::new(start + 1, i);
                self.queue
                    .push_back(Token::new(TokenKind::StringContent, body, LexMode::Code));
                self.cursor.set_pos(i);
                return token;
            }
        }
        self.cursor.advance();
        self.emit(TokenKind::LParen, start)
    }

    /// Is `=>` the next thing on this line at or after `pos`?
    fn fat_comma_at(&self, mut pos: u32) -> bool {
        while is_blank(self.cursor.byte_at(pos)) {
            pos += 1;
        }
        self.cursor.byte_at(pos) == b'=' && self.cursor.byte_at(pos + 1) == b'>'
    }

    /// First non-blank byte on this line at or after `pos`.
    fn next_non_blank(&self, mut pos: u32) -> u8 {
        while is_blank(self.cursor.byte_at(pos)) {
            pos += 1;
        }
        self.cursor.byte_at(pos)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}
