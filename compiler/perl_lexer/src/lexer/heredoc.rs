//! Heredocs.
//!
//! `<<END`, `<<"END"`, `<<'END'`, `<<\END` and the indented `<<~` forms.
//! A quoted terminator may follow `<<` after blanks, as in `<< "END"`.
//! The opener is a single `HeredocOpener` token; the rest of the line is
//! lexed normally. When the line's newline is emitted, the first pending
//! heredoc's body is lexed and queued:
//!
//! ```text
//! print <<A, <<B;\n  body of A\n  A\n  body of B\n  B\n
//!       ^^^  ^^^   ^^            ^                 ^
//!       openers    Newline: body A + terminator A   |
//!                                  Newline: body B + terminator B
//! ```
//!
//! Bodies are `StringContent` runs (with interpolated variables for the
//! interpolating forms) in [`LexMode::HeredocBody`]. A body with no
//! terminator line runs to end of input and is followed by a zero-width
//! `UnterminatedHeredoc`.

use perl_ir::{LexMode, Span, Token, TokenKind};
use perl_lexer_core::{is_ident_continue, is_ident_start};

use super::Lexer;

/// A heredoc whose opener has been seen but whose body has not.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) struct PendingHeredoc {
    pub(crate) terminator: String,
    pub(crate) interpolate: bool,
    pub(crate) indented: bool,
}

impl Lexer<'_> {
    /// At `<<` in term position: lex a heredoc opener, or `None` if this
    /// is not one (`<< 2`, `<<>>`).
    pub(super) fn try_heredoc_opener(&mut self, start: u32) -> Option<Token> {
        let mut pos = start + 2;
        let indented = self.cursor.byte_at(pos) == b'~';
        if indented {
            pos += 1;
        }
        // Blanks may precede a quoted terminator, never a bare one.
        let blanks_end = self.skip_blanks_from(pos);
        if blanks_end > pos {
            if !matches!(self.cursor.byte_at(blanks_end), b'"' | b'\'') {
                return None;
            }
            pos = blanks_end;
        }
        let quote = self.cursor.byte_at(pos);
        let (name_start, name_end, interpolate, end) = match quote {
            b'"' | b'\'' => {
                let mut close = pos + 1;
                while close < self.cursor.source_len()
                    && !matches!(self.cursor.byte_at(close), b'\n')
                    && self.cursor.byte_at(close) != quote
                {
                    close += 1;
                }
                if self.cursor.byte_at(close) != quote || close >= self.cursor.source_len() {
                    return None;
                }
                (pos + 1, close, quote == b'"', close + 1)
            }
            b'\\' if is_ident_start(self.cursor.byte_at(pos + 1)) => {
                let name_end = self.scan_plain_word(pos + 1);
                (pos + 1, name_end, false, name_end)
            }
            b if is_ident_start(b) => {
                let name_end = self.scan_plain_word(pos);
                (pos, name_end, true, name_end)
            }
            _ => return None,
        };

        let terminator = self.cursor.slice(name_start, name_end).to_owned();
        self.cursor.set_pos(end);
        tracing::trace!(%terminator, interpolate, indented, "heredoc opener");
        self.pending_heredocs.push_back(PendingHeredoc {
            terminator,
            interpolate,
            indented,
        });
        Some(self.emit(TokenKind::HeredocOpener, start))
    }

    fn skip_blanks_from(&self, mut pos: u32) -> u32 {
        while matches!(self.cursor.byte_at(pos), b' ' | b'\t') {
            pos += 1;
        }
        pos
    }

    fn scan_plain_word(&self, mut pos: u32) -> u32 {
        while is_ident_continue(self.cursor.byte_at(pos)) {
            pos += 1;
        }
        pos
    }

    /// Lex the body and terminator of the oldest pending heredoc into the
    /// queue. The cursor is at the start of the line after the opener.
    pub(super) fn splice_heredoc(&mut self) {
        let Some(heredoc) = self.pending_heredocs.pop_front() else {
            return;
        };
        let len = self.cursor.source_len();
        let body_start = self.cursor.pos();
        let mut line_start = body_start;

        let terminator = loop {
            if line_start >= len {
                break None;
            }
            let line_end = self.cursor.line_end_from(line_start);
            let line = self.cursor.slice(line_start, line_end);
            let line = line.strip_suffix('\r').unwrap_or(line);
            let line = if heredoc.indented {
                line.trim_start_matches([' ', '\t'])
            } else {
                line
            };
            if line == heredoc.terminator {
                break Some((line_start, line_end));
            }
            if line_end >= len {
                break None;
            }
            line_start = line_end + 1;
        };

        match terminator {
            Some((term_start, term_end)) => {
                self.push_heredoc_body(body_start, term_start, heredoc.interpolate);
                self.queue.push_back(Token::new(
                    TokenKind::HeredocTerminator,
                    Span::new(term_start, term_end),
                    LexMode::HeredocBody,
                ));
                self.cursor.set_pos(term_end);
            }
            None => {
                tracing::debug!(
                    terminator = %heredoc.terminator,
                    offset = body_start,
                    "unterminated heredoc"
                );
                self.push_heredoc_body(body_start, len, heredoc.interpolate);
                self.queue.push_back(Token::new(
                    TokenKind::UnterminatedHeredoc,
                    Span::point(len),
                    LexMode::HeredocBody,
                ));
                self.cursor.set_pos(len);
            }
        }
    }

    /// Queue content runs and interpolated variables for `start..end`.
    fn push_heredoc_body(&mut self, start: u32, end: u32, interpolate: bool) {
        if start >= end {
            return;
        }
        if !interpolate {
            self.queue.push_back(Token::new(
                TokenKind::StringContent,
                Span::new(start, end),
                LexMode::HeredocBody,
            ));
            return;
        }

        let mut run_start = start;
        let mut pos = start;
        while pos < end {
            match self.cursor.byte_at(pos) {
                b'\\' => pos += 2,
                b'$' | b'@' => match self.interpolated_var_at(pos) {
                    Some((kind, var_end)) if var_end <= end => {
                        if pos > run_start {
                            self.queue.push_back(Token::new(
                                TokenKind::StringContent,
                                Span::new(run_start, pos),
                                LexMode::HeredocBody,
                            ));
                        }
                        self.queue.push_back(Token::new(
                            kind,
                            Span::new(pos, var_end),
                            LexMode::HeredocBody,
                        ));
                        pos = var_end;
                        run_start = pos;
                    }
                    _ => pos += 1,
                },
                _ => pos += 1,
            }
        }
        if run_start < end {
            self.queue.push_back(Token::new(
                TokenKind::StringContent,
                Span::new(run_start, end),
                LexMode::HeredocBody,
            ));
        }
    }

    /// End of input with heredocs still pending: each gets an
    /// `UnterminatedHeredoc`.
    pub(super) fn flush_unterminated_heredocs(&mut self) {
        let end = self.cursor.pos();
        while let Some(heredoc) = self.pending_heredocs.pop_front() {
            tracing::debug!(
                terminator = %heredoc.terminator,
                "heredoc body missing at end of input"
            );
            self.queue.push_back(Token::new(
                TokenKind::UnterminatedHeredoc,
                Span::point(end),
                LexMode::HeredocBody,
            ));
        }
    }
}

/// Remove the common leading indentation of an indented (`<<~`) heredoc
/// body, as measured on its terminator line.
pub fn unindent_heredoc(body: &str, terminator_line: &str) -> String {
    let indent = terminator_line.len() - terminator_line.trim_start_matches([' ', '\t']).len();
    body.split_inclusive('\n')
        .map(|line| {
            let strip = line
                .bytes()
                .take(indent)
                .take_while(|b| matches!(b, b' ' | b'\t'))
                .count();
            &line[strip..]
        })
        .collect()
}
