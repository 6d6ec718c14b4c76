//! `#@name args` annotation comments.
//!
//! ```perl
//! #@returns Foo::Bar
//! #@deprecated
//! sub make { ... }
//! ```
//!
//! Annotations are ordinary comments to Perl. The parser attaches the ones
//! preceding a `sub` to its registry entry.

use perl_ir::{Span, Token, TokenKind};

/// Recognised annotation names.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AnnotationKind {
    /// `#@returns PACKAGE` or `#@returns ArrayRef[Foo]`.
    Returns,
    Method,
    Override,
    Abstract,
    Deprecated,
    Inject,
    /// `#@noinspection NAME`.
    NoInspection,
    /// `#@type PACKAGE` for the following variable declaration.
    Type,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 8] = [
        AnnotationKind::Returns,
        AnnotationKind::Method,
        AnnotationKind::Override,
        AnnotationKind::Abstract,
        AnnotationKind::Deprecated,
        AnnotationKind::Inject,
        AnnotationKind::NoInspection,
        AnnotationKind::Type,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            AnnotationKind::Returns => "returns",
            AnnotationKind::Method => "method",
            AnnotationKind::Override => "override",
            AnnotationKind::Abstract => "abstract",
            AnnotationKind::Deprecated => "deprecated",
            AnnotationKind::Inject => "inject",
            AnnotationKind::NoInspection => "noinspection",
            AnnotationKind::Type => "type",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// One annotation comment.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Annotation {
    pub kind: AnnotationKind,
    /// The whole comment.
    pub span: Span,
    /// The argument after the name, trimmed. Empty when absent.
    pub argument: Span,
}

impl Annotation {
    /// Parse a comment token. `None` for plain comments and unknown names.
    pub fn from_comment(token: &Token, source: &str) -> Option<Self> {
        if token.kind != TokenKind::Comment {
            return None;
        }
        let text = token.text(source);
        let body = text.strip_prefix("#@")?;
        let name_len = body
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        let kind = AnnotationKind::from_name(&body[..name_len])?;

        let rest = &body[name_len..];
        let trimmed_start = rest.trim_start();
        let argument_text = trimmed_start.trim_end();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "comment lengths are bounded by u32 source offsets"
        )]
        let argument_start =
            token.span.start + (2 + name_len + (rest.len() - trimmed_start.len())) as u32;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "comment lengths are bounded by u32 source offsets"
        )]
        let argument = Span::new(argument_start, argument_start + argument_text.len() as u32);

        Some(Annotation {
            kind,
            span: token.span,
            argument,
        })
    }

    #[inline]
    pub fn argument_text(self, source: &str) -> &str {
        self.argument.text(source)
    }
}
