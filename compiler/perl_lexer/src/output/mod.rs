//! Whole-file lexing and incremental re-lexing.

use perl_ir::{Token, TokenFlags, TokenKind, TokenList};
use perl_lexer_core::SourceBuffer;

use crate::{Annotation, LexCheckpoint, Lexer};

/// Options for [`lex_with`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct LexOptions {
    /// Record line-start checkpoints for [`relex`].
    pub record_checkpoints: bool,
}

impl Default for LexOptions {
    fn default() -> Self {
        LexOptions {
            record_checkpoints: true,
        }
    }
}

/// Result of lexing one file.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LexOutput {
    /// Significant tokens, ending with `Eof`, with layout flags set.
    pub tokens: TokenList,
    /// Whitespace, newlines, comments, POD and `__END__` sections.
    pub trivia: Vec<Token>,
    /// `#@name` comments, in source order.
    pub annotations: Vec<Annotation>,
    /// Resumable states at line starts, ascending by offset.
    pub checkpoints: Vec<LexCheckpoint>,
    /// Every token except `Eof`, in source order.
    all: Vec<Token>,
    /// For each checkpoint, the number of tokens of `all` emitted before it.
    resume_points: Vec<usize>,
}

impl LexOutput {
    fn from_stream(run: Run, source: &str) -> Self {
        let Run {
            all,
            checkpoints,
            resume_points,
        } = run;
        let mut tokens = TokenList::with_capacity(all.len() / 2 + 1);
        let mut trivia = Vec::new();
        let mut annotations = Vec::new();
        let mut flags = TokenFlags::empty();
        let mut eof = None;

        for token in &all {
            match token.kind {
                TokenKind::Newline => {
                    flags |= TokenFlags::NEWLINE_BEFORE;
                    trivia.push(*token);
                }
                TokenKind::Comment => {
                    flags |= TokenFlags::SPACE_BEFORE;
                    annotations.extend(Annotation::from_comment(token, source));
                    trivia.push(*token);
                }
                kind if kind.is_trivia() => {
                    flags |= TokenFlags::SPACE_BEFORE;
                    trivia.push(*token);
                }
                TokenKind::Eof => eof = Some(*token),
                _ => {
                    let mut token = *token;
                    token.flags = flags;
                    flags = TokenFlags::empty();
                    tokens.push(token);
                }
            }
        }
        let mut eof = eof.unwrap_or_else(|| {
            let end = all.last().map_or(0, |t| t.span.end);
            Token::new(
                TokenKind::Eof,
                perl_ir::Span::point(end),
                perl_ir::LexMode::Code,
            )
        });
        eof.flags = flags;
        tokens.push(eof);

        let all = all.into_iter().filter(|t| t.kind != TokenKind::Eof).collect();
        LexOutput {
            tokens,
            trivia,
            annotations,
            checkpoints,
            all,
            resume_points,
        }
    }

    /// Every token, trivia included, in source order (no `Eof`).
    pub fn all_tokens(&self) -> &[Token] {
        &self.all
    }

    /// Number of tokens that were unterminated quote-likes or heredocs.
    pub fn unterminated_count(&self) -> usize {
        self.tokens
            .kinds()
            .iter()
            .filter(|k| matches!(k, TokenKind::UnterminatedQuote | TokenKind::UnterminatedHeredoc))
            .count()
    }
}

/// Lex `text` with default options.
pub fn lex(text: &str) -> LexOutput {
    lex_with(text, LexOptions::default())
}

#[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
pub fn lex_with(text: &str, options: LexOptions) -> LexOutput {
    let buffer = SourceBuffer::new(text);
    let collected = run(
        Lexer::new(&buffer),
        options.record_checkpoints,
        Run::default(),
    );
    let output = LexOutput::from_stream(collected, text);
    tracing::debug!(
        tokens = output.tokens.len(),
        trivia = output.trivia.len(),
        "lexed"
    );
    output
}

/// Tokens and checkpoints collected by [`run`].
#[derive(Default)]
struct Run {
    all: Vec<Token>,
    checkpoints: Vec<LexCheckpoint>,
    resume_points: Vec<usize>,
}

/// Drive a lexer to the end, appending to `into` and optionally recording
/// line-start checkpoints.
fn run(mut lexer: Lexer<'_>, record: bool, mut into: Run) -> Run {
    loop {
        if record && lexer.at_clean_line_start() {
            if let Some(checkpoint) = lexer.checkpoint() {
                into.checkpoints.push(checkpoint);
                into.resume_points.push(into.all.len());
            }
        }
        match lexer.next() {
            Some(token) => into.all.push(token),
            None => break,
        }
    }
    into
}

/// Re-lex `new_text` after an edit at `edit_offset`, reusing the tokens
/// of `previous` before the last checkpoint at or before the edit.
///
/// `new_text` must equal the previously lexed text before `edit_offset`.
/// The result equals `lex(new_text)`.
#[tracing::instrument(level = "debug", skip_all, fields(edit_offset = edit_offset))]
pub fn relex(previous: &LexOutput, new_text: &str, edit_offset: u32) -> LexOutput {
    let limit = edit_offset.min(u32::try_from(new_text.len()).unwrap_or(u32::MAX));
    let Some(index) = previous
        .checkpoints
        .iter()
        .rposition(|cp| cp.offset <= limit)
    else {
        return lex(new_text);
    };
    let resume_at = &previous.checkpoints[index];
    let reused = previous.resume_points[index];
    tracing::debug!(reused, from = resume_at.offset, "relex");

    let prefix = Run {
        all: previous.all[..reused].to_vec(),
        checkpoints: previous.checkpoints[..index].to_vec(),
        resume_points: previous.resume_points[..index].to_vec(),
    };
    let buffer = SourceBuffer::new(new_text);
    let collected = run(Lexer::resume(&buffer, resume_at), true, prefix);
    LexOutput::from_stream(collected, new_text)
}
