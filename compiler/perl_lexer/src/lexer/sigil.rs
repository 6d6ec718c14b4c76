//! Sigil-led tokens: variables, casts, and the operators that share a
//! sigil character (`%`, `&`, `*`).

use perl_ir::{Token, TokenKind};
use perl_lexer_core::{is_blank, is_ident_start};

use super::Lexer;

/// Characters that form a one-character punctuation variable after `$`.
const PUNCT_VARS: &[u8] = b"&`'+./\\,;!@<>[]()?|~%=-:\"0";

impl Lexer<'_> {
    /// End of a `name`, `::name`, `Foo::Bar` word starting at `pos`, or
    /// `pos` itself if there is none.
    pub(super) fn scan_name(&self, mut pos: u32) -> u32 {
        if self.cursor.byte_at(pos) == b':'
            && self.cursor.byte_at(pos + 1) == b':'
            && is_ident_start(self.cursor.byte_at(pos + 2))
        {
            pos += 2;
        }
        loop {
            while perl_lexer_core::is_ident_continue(self.cursor.byte_at(pos)) {
                pos += 1;
            }
            if self.cursor.byte_at(pos) == b':'
                && self.cursor.byte_at(pos + 1) == b':'
                && is_ident_start(self.cursor.byte_at(pos + 2))
            {
                pos += 2;
                continue;
            }
            return pos;
        }
    }

    /// Does a name start at `pos`?
    fn name_starts_at(&self, pos: u32) -> bool {
        let b = self.cursor.byte_at(pos);
        is_ident_start(b)
            || (b == b':'
                && self.cursor.byte_at(pos + 1) == b':'
                && is_ident_start(self.cursor.byte_at(pos + 2)))
    }

    /// For `{` at `open`: end offset after `{ name }` when the braces hold
    /// only a plain name.
    pub(super) fn braced_name_end(&self, open: u32) -> Option<u32> {
        let mut pos = open + 1;
        while is_blank(self.cursor.byte_at(pos)) {
            pos += 1;
        }
        if self.cursor.byte_at(pos) == b'^' {
            pos += 1;
        }
        if !self.name_starts_at(pos) {
            return None;
        }
        pos = self.scan_name(pos);
        while is_blank(self.cursor.byte_at(pos)) {
            pos += 1;
        }
        (self.cursor.byte_at(pos) == b'}').then_some(pos + 1)
    }

    pub(super) fn lex_dollar(&mut self, start: u32) -> Token {
        let next = self.cursor.peek();
        let next2 = self.cursor.peek_at(2);
        let kind = match next {
            b'#' => {
                if next2 == b'{' || next2 == b'$' {
                    self.cursor.advance_n(2);
                    TokenKind::CastLastIndex
                } else if self.name_starts_at(start + 2) {
                    let end = self.scan_name(start + 2);
                    self.cursor.set_pos(end);
                    TokenKind::ArrayLastIndex
                } else {
                    self.cursor.advance_n(2);
                    TokenKind::ScalarVar
                }
            }
            b'{' => {
                if let Some(end) = self.braced_name_end(start + 1) {
                    self.cursor.set_pos(end);
                    TokenKind::ScalarVar
                } else {
                    self.cursor.advance();
                    TokenKind::CastScalar
                }
            }
            b'$' => {
                if self.name_starts_at(start + 2) || next2 == b'{' || next2 == b'$' {
                    self.cursor.advance();
                    TokenKind::CastScalar
                } else {
                    // `$$`, the process id.
                    self.cursor.advance_n(2);
                    TokenKind::ScalarVar
                }
            }
            b'^' => {
                if next2.is_ascii_uppercase() || b"[]^_?\\".contains(&next2) {
                    self.cursor.advance_n(3);
                } else {
                    self.cursor.advance_n(2);
                }
                TokenKind::ScalarVar
            }
            b'0'..=b'9' => {
                self.cursor.advance();
                self.cursor.eat_while(|b| b.is_ascii_digit());
                TokenKind::ScalarVar
            }
            _ if self.name_starts_at(start + 1) => {
                let end = self.scan_name(start + 1);
                self.cursor.set_pos(end);
                TokenKind::ScalarVar
            }
            _ if PUNCT_VARS.contains(&next) => {
                self.cursor.advance_n(2);
                TokenKind::ScalarVar
            }
            _ => {
                self.cursor.advance();
                TokenKind::Error
            }
        };
        self.emit(kind, start)
    }

    pub(super) fn lex_at(&mut self, start: u32) -> Token {
        let next = self.cursor.peek();
        let kind = match next {
            b'{' => {
                if let Some(end) = self.braced_name_end(start + 1) {
                    self.cursor.set_pos(end);
                    TokenKind::ArrayVar
                } else {
                    self.cursor.advance();
                    TokenKind::CastArray
                }
            }
            b'$' => {
                self.cursor.advance();
                TokenKind::CastArray
            }
            b'-' | b'+' => {
                self.cursor.advance_n(2);
                TokenKind::ArrayVar
            }
            _ if self.name_starts_at(start + 1) => {
                let end = self.scan_name(start + 1);
                self.cursor.set_pos(end);
                TokenKind::ArrayVar
            }
            _ => {
                self.cursor.advance();
                TokenKind::Error
            }
        };
        self.emit(kind, start)
    }

    /// `%name`, `%$ref`, `%{...}` in term position; modulus otherwise.
    pub(super) fn lex_percent(&mut self, start: u32) -> Token {
        if self.expect_term {
            let next = self.cursor.peek();
            let kind = match next {
                b'{' => match self.braced_name_end(start + 1) {
                    Some(end) => {
                        self.cursor.set_pos(end);
                        Some(TokenKind::HashVar)
                    }
                    None => {
                        self.cursor.advance();
                        Some(TokenKind::CastHash)
                    }
                },
                b'$' => {
                    self.cursor.advance();
                    Some(TokenKind::CastHash)
                }
                b'+' | b'-' | b'!' => {
                    self.cursor.advance_n(2);
                    Some(TokenKind::HashVar)
                }
                b'^' if self.cursor.peek_at(2) == b'H' => {
                    self.cursor.advance_n(3);
                    Some(TokenKind::HashVar)
                }
                _ if self.name_starts_at(start + 1) => {
                    let end = self.scan_name(start + 1);
                    self.cursor.set_pos(end);
                    Some(TokenKind::HashVar)
                }
                _ => None,
            };
            if let Some(kind) = kind {
                return self.emit(kind, start);
            }
        }
        let kind = if self.cursor.peek() == b'=' {
            self.cursor.advance_n(2);
            TokenKind::OpAssign
        } else {
            self.cursor.advance();
            TokenKind::Percent
        };
        self.emit(kind, start)
    }

    /// `&&`, `&name`, `&$code`, `&{...}`, bitwise and.
    pub(super) fn lex_amp(&mut self, start: u32) -> Token {
        let next = self.cursor.peek();
        if next == b'&' {
            let kind = if self.cursor.peek_at(2) == b'=' {
                self.cursor.advance_n(3);
                TokenKind::OpAssign
            } else {
                self.cursor.advance_n(2);
                TokenKind::AndAnd
            };
            return self.emit(kind, start);
        }
        if self.expect_term {
            if next == b'$' || next == b'{' {
                self.cursor.advance();
                return self.emit(TokenKind::CastCode, start);
            }
            if self.name_starts_at(start + 1) {
                let end = self.scan_name(start + 1);
                self.cursor.set_pos(end);
                return self.emit(TokenKind::CodeVar, start);
            }
        }
        let kind = if next == b'=' {
            self.cursor.advance_n(2);
            TokenKind::OpAssign
        } else {
            self.cursor.advance();
            TokenKind::Amp
        };
        self.emit(kind, start)
    }

    /// `**`, `*name`, `*{...}`, multiplication.
    pub(super) fn lex_star(&mut self, start: u32) -> Token {
        let next = self.cursor.peek();
        if next == b'*' {
            let kind = if self.cursor.peek_at(2) == b'=' {
                self.cursor.advance_n(3);
                TokenKind::OpAssign
            } else {
                self.cursor.advance_n(2);
                TokenKind::StarStar
            };
            return self.emit(kind, start);
        }
        if self.expect_term {
            if next == b'$' || next == b'{' {
                self.cursor.advance();
                return self.emit(TokenKind::CastGlob, start);
            }
            if self.name_starts_at(start + 1) {
                let end = self.scan_name(start + 1);
                self.cursor.set_pos(end);
                return self.emit(TokenKind::GlobVar, start);
            }
        }
        let kind = if next == b'=' {
            self.cursor.advance_n(2);
            TokenKind::OpAssign
        } else {
            self.cursor.advance();
            TokenKind::Star
        };
        self.emit(kind, start)
    }
}
