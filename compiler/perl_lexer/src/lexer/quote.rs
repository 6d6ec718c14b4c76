//! Quote-like constructs: `'..'`, `".."`, backticks, `q qq qw qx m qr s
//! tr y`, and `/../` in term position.
//!
//! # Token shape
//!
//! ```text
//! s{ a $x }{ b }gi
//! ^^         ^^^  ^^
//! QuoteOpen  |    QuoteClose + QuoteModifiers
//!            QuoteMid (close, whitespace, new open)
//! ```
//!
//! Between the delimiters the lexer emits `StringContent` runs and, in
//! interpolating parts, `ScalarVar`/`ArrayVar` tokens for `$name`,
//! `${name}`, `@name` and `@{name}`. Bracket delimiters nest by depth;
//! a backslash always escapes the next character.
//!
//! A `${ EXPR }` or `@{ EXPR }` block is lexed as code: `"n=${\ f(@a)}!"`
//! gives `StringContent`, `CastScalar`, `LBrace`, the code tokens of
//! `\ f(@a)`, `RBrace`, then content again.

use perl_ir::{LexMode, Span, Token, TokenKind};

use super::Lexer;

/// Which quote-like construct is open.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum QuoteKind {
    Single,
    Double,
    Backtick,
    Q,
    Qq,
    Qw,
    Qx,
    Match,
    /// `/.../` in term position.
    Slash,
    Qr,
    Subst,
    Trans,
}

impl QuoteKind {
    pub(crate) fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "q" => QuoteKind::Q,
            "qq" => QuoteKind::Qq,
            "qw" => QuoteKind::Qw,
            "qx" => QuoteKind::Qx,
            "m" => QuoteKind::Match,
            "qr" => QuoteKind::Qr,
            "s" => QuoteKind::Subst,
            "tr" | "y" => QuoteKind::Trans,
            _ => return None,
        })
    }

    /// Number of delimited parts: two for `s` and `tr`.
    fn parts(self) -> u8 {
        match self {
            QuoteKind::Subst | QuoteKind::Trans => 2,
            _ => 1,
        }
    }

    fn has_modifiers(self) -> bool {
        matches!(
            self,
            QuoteKind::Match
                | QuoteKind::Slash
                | QuoteKind::Qr
                | QuoteKind::Subst
                | QuoteKind::Trans
        )
    }

    /// Does the first part interpolate when opened with `open`?
    fn interpolates(self, open: u8) -> bool {
        match self {
            QuoteKind::Single | QuoteKind::Q | QuoteKind::Qw | QuoteKind::Trans => false,
            QuoteKind::Double | QuoteKind::Backtick | QuoteKind::Slash => true,
            QuoteKind::Qq | QuoteKind::Qx | QuoteKind::Match | QuoteKind::Qr | QuoteKind::Subst => {
                open != b'\''
            }
        }
    }
}

/// One open quote-like construct on the mode stack.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) struct QuoteState {
    pub(crate) kind: QuoteKind,
    open: u8,
    close: u8,
    depth: u32,
    interpolate: bool,
    parts_left: u8,
    /// Open braces of an embedded `${ .. }` or `@{ .. }` code block.
    pub(crate) code_depth: u32,
}

/// Closing delimiter for an opening one.
fn closing_delimiter(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        b'<' => b'>',
        other => other,
    }
}

impl Lexer<'_> {
    /// Emit `QuoteOpen` for a construct whose first delimiter is at or
    /// after the cursor (after optional blanks for the word forms), and
    /// push its state.
    pub(super) fn open_quote(&mut self, kind: QuoteKind, start: u32) -> Token {
        if !matches!(
            kind,
            QuoteKind::Single | QuoteKind::Double | QuoteKind::Backtick | QuoteKind::Slash
        ) {
            self.cursor.eat_blanks();
        }
        let open = self.cursor.current();
        self.cursor.advance();
        let token = self.emit(TokenKind::QuoteOpen, start);
        self.modes.push(QuoteState {
            kind,
            open,
            close: closing_delimiter(open),
            depth: 0,
            interpolate: kind.interpolates(open),
            parts_left: kind.parts(),
            code_depth: 0,
        });
        token
    }

    /// One token inside the innermost quote-like.
    pub(super) fn lex_quote(&mut self) -> Token {
        let Some(&state) = self.modes.last() else {
            return self.lex_code();
        };
        let start = self.cursor.pos();

        if self.cursor.is_eof() {
            self.modes.pop();
            tracing::debug!(offset = start, kind = ?state.kind, "unterminated quote-like");
            return Token::new(
                TokenKind::UnterminatedQuote,
                Span::point(start),
                LexMode::Code,
            );
        }

        if self.cursor.current() == state.close && state.depth == 0 {
            if state.parts_left > 1 {
                return self.lex_quote_mid(state, start);
            }
            self.cursor.advance();
            self.modes.pop();
            let token = self.emit(TokenKind::QuoteClose, start);
            if state.kind.has_modifiers() {
                let modifiers = self.cursor.pos();
                self.cursor.eat_while(|b| b.is_ascii_alphabetic());
                if self.cursor.pos() > modifiers {
                    let modifiers = self.emit(TokenKind::QuoteModifiers, modifiers);
                    self.queue.push_back(modifiers);
                }
            }
            return token;
        }

        let mode = if state.interpolate {
            LexMode::Interpolated
        } else {
            LexMode::Literal
        };
        if state.interpolate {
            if let Some((kind, end)) = self.interpolated_var_at(start) {
                self.cursor.set_pos(end);
                return Token::new(kind, Span::new(start, end), mode);
            }
            if let Some(cast) = self.interpolated_block_at(start) {
                return self.open_interpolated_block(cast, start);
            }
        }
        self.scan_quote_content(state);
        Token::new(
            TokenKind::StringContent,
            Span::new(start, self.cursor.pos()),
            mode,
        )
    }

    /// Between the two parts of `s` and `tr`. For bracket delimiters the
    /// second part opens with a fresh delimiter after optional whitespace.
    fn lex_quote_mid(&mut self, state: QuoteState, start: u32) -> Token {
        self.cursor.advance();
        let (open, close) = if state.open == state.close {
            (state.open, state.close)
        } else {
            self.cursor.eat_while(|b| perl_lexer_core::is_blank(b) || b == b'\n');
            let next = self.cursor.current();
            if !self.cursor.is_eof() && next.is_ascii_punctuation() {
                self.cursor.advance();
                (next, closing_delimiter(next))
            } else {
                (state.open, state.close)
            }
        };
        if let Some(top) = self.modes.last_mut() {
            top.open = open;
            top.close = close;
            top.depth = 0;
            top.parts_left -= 1;
            top.interpolate = state.kind == QuoteKind::Subst && open != b'\'';
        }
        Token::new(
            TokenKind::QuoteMid,
            Span::new(start, self.cursor.pos()),
            LexMode::Code,
        )
    }

    /// Consume one non-empty content run, stopping before the closing
    /// delimiter, an interpolated variable, or end of input.
    fn scan_quote_content(&mut self, state: QuoteState) {
        let bracketed = state.open != state.close;
        // `open == close` for non-bracket delimiters; the repeat is harmless.
        let needles = [state.close, state.open, b'\\', b'$', b'@'];
        let mut depth = state.depth;
        let content_start = self.cursor.pos();
        loop {
            let found = self.cursor.skip_to_any(&needles);
            if self.cursor.is_eof() {
                break;
            }
            let pos = self.cursor.pos();
            if found == state.close {
                if depth == 0 {
                    if pos == content_start {
                        // Runs are never empty.
                        self.cursor.advance();
                        continue;
                    }
                    break;
                }
                depth -= 1;
                self.cursor.advance();
            } else if bracketed && found == state.open {
                depth += 1;
                self.cursor.advance();
            } else if found == b'\\' {
                self.cursor.advance();
                self.cursor.advance_char();
            } else if state.interpolate && pos > content_start && self.interpolation_at(pos) {
                break;
            } else {
                self.cursor.advance();
            }
        }
        if let Some(top) = self.modes.last_mut() {
            top.depth = depth;
        }
    }

    fn interpolation_at(&self, pos: u32) -> bool {
        self.interpolated_var_at(pos).is_some() || self.interpolated_block_at(pos).is_some()
    }

    /// The cast opening a `${ EXPR }` or `@{ EXPR }` block at `pos`.
    fn interpolated_block_at(&self, pos: u32) -> Option<TokenKind> {
        let cast = match self.cursor.byte_at(pos) {
            b'$' => TokenKind::CastScalar,
            b'@' => TokenKind::CastArray,
            _ => return None,
        };
        (self.cursor.byte_at(pos + 1) == b'{' && self.braced_name_end(pos + 1).is_none())
            .then_some(cast)
    }

    /// Emit the cast, queue the `{` and switch the quote to code.
    fn open_interpolated_block(&mut self, cast: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        let cast = self.emit(cast, start);
        let brace = self.cursor.pos();
        self.cursor.advance();
        let open = self.emit(TokenKind::LBrace, brace);
        self.queue.push_back(open);
        if let Some(top) = self.modes.last_mut() {
            top.code_depth = 1;
        }
        cast
    }

    /// One code token inside an interpolated block. The closing `}`
    /// returns the quote to content.
    pub(super) fn lex_interpolated_code(&mut self) -> Token {
        let start = self.cursor.pos();
        if self.cursor.is_eof() {
            self.modes.pop();
            tracing::debug!(offset = start, "unterminated interpolated block");
            return Token::new(
                TokenKind::UnterminatedQuote,
                Span::point(start),
                LexMode::Code,
            );
        }
        let frames = self.modes.len();
        let token = self.lex_code();
        if self.modes.len() == frames {
            if let Some(top) = self.modes.last_mut() {
                match token.kind {
                    TokenKind::LBrace => top.code_depth += 1,
                    TokenKind::RBrace => top.code_depth -= 1,
                    _ => {}
                }
            }
        }
        token
    }

    /// An interpolated `$name`, `${name}`, `@name` or `@{name}` at `pos`:
    /// its kind and end offset.
    pub(super) fn interpolated_var_at(&self, pos: u32) -> Option<(TokenKind, u32)> {
        let kind = match self.cursor.byte_at(pos) {
            b'$' => TokenKind::ScalarVar,
            b'@' => TokenKind::ArrayVar,
            _ => return None,
        };
        let next = self.cursor.byte_at(pos + 1);
        if next == b'{' {
            return self.braced_name_end(pos + 1).map(|end| (kind, end));
        }
        if kind == TokenKind::ScalarVar && next.is_ascii_digit() {
            let mut end = pos + 1;
            while self.cursor.byte_at(end).is_ascii_digit() {
                end += 1;
            }
            return Some((kind, end));
        }
        let end = self.scan_name(pos + 1);
        (end > pos + 1).then_some((kind, end))
    }
}
