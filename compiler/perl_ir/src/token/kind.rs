//! Token kinds.

use std::fmt;

/// Kind of a lexed token.
///
/// Tokens carry no payload; their text is recovered from the span. The
/// discriminant fits in a `u8` and stays below 128 so that parser token sets
/// can be a single `u128` bitset.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TokenKind {
    // === Trivia ===
    Whitespace,
    Newline,
    /// `# ...` up to (not including) the newline.
    Comment,
    /// `=pod ... =cut` block, including the `=cut` line.
    Pod,
    /// `__END__` / `__DATA__` marker and everything after it.
    DataSection,

    // === Names ===
    /// Bareword, possibly package-qualified (`Foo::Bar`, `::foo`).
    Ident,
    /// `$name`, `${name}`, `$Foo::x`, `$_`, `$1`, `$@`, `$^W`.
    ScalarVar,
    /// `@name`, `@{name}`, `@_`.
    ArrayVar,
    /// `%name`, `%ENV`, `%+`.
    HashVar,
    /// `&name`.
    CodeVar,
    /// `*name`.
    GlobVar,
    /// `$#name`.
    ArrayLastIndex,
    /// Sigil applied to an expression: `$` in `$$ref` or `${ expr }`.
    CastScalar,
    CastArray,
    CastHash,
    CastCode,
    CastGlob,
    /// `$#` in `$#{ expr }` / `$#$ref`.
    CastLastIndex,

    // === Literals ===
    Number,
    /// `v5.12.1` or `5.12.1`.
    VString,
    /// Opening of a quote-like: `'`, `"`, `` ` ``, `q{`, `s/`, `qw(`.
    QuoteOpen,
    /// Boundary between the two parts of `s` / `tr` / `y`.
    QuoteMid,
    QuoteClose,
    /// Trailing flag letters after a match/substitution/transliteration.
    QuoteModifiers,
    /// A literal run inside a string, heredoc body or quote-like.
    StringContent,
    /// End of input reached inside a quote-like.
    UnterminatedQuote,
    /// `<<END`, `<<"END"`, `<<'END'`, `<<~END`.
    HeredocOpener,
    /// The terminator line of a heredoc body.
    HeredocTerminator,
    /// End of input reached inside a heredoc body.
    UnterminatedHeredoc,
    /// `<STDIN>`, `<$fh>`, `<>`.
    ReadLine,

    // === Keywords ===
    KwMy,
    KwOur,
    KwLocal,
    KwState,
    KwSub,
    KwPackage,
    KwUse,
    KwNo,
    KwRequire,
    KwReturn,
    KwIf,
    KwUnless,
    KwElsif,
    KwElse,
    KwWhile,
    KwUntil,
    KwFor,
    KwForeach,
    KwDo,
    KwEval,
    KwLast,
    KwNext,
    KwRedo,
    KwGoto,
    KwAnd,
    KwOr,
    KwXor,
    KwNot,
    KwLt,
    KwGt,
    KwLe,
    KwGe,
    KwEq,
    KwNe,
    KwCmp,
    /// Repetition operator `x` (only in operator position).
    KwX,
    /// `__PACKAGE__`
    KwCurrentPackage,

    // === Punctuation ===
    Semicolon,
    Comma,
    FatComma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Arrow,
    PlusPlus,
    MinusMinus,
    StarStar,
    Bang,
    Tilde,
    Backslash,
    Match,
    NotMatch,
    Star,
    Slash,
    Percent,
    Plus,
    Minus,
    Dot,
    Shl,
    Shr,
    LAngle,
    RAngle,
    LtEq,
    GtEq,
    NumEq,
    NumNe,
    Spaceship,
    SmartMatch,
    Amp,
    Pipe,
    Caret,
    AndAnd,
    OrOr,
    DefinedOr,
    Range,
    Ellipsis,
    Question,
    Colon,
    Assign,
    /// Compound assignment: `+=`, `.=`, `||=`, `//=`, `**=`, ...
    OpAssign,
    /// File test operator: `-e`, `-f`, `-d`, ...
    FileTest,

    // === Special ===
    /// A byte sequence the lexer could not classify.
    Error,
    Eof,
}

/// Number of token kinds. Must stay at or below 128.
pub const TOKEN_KIND_COUNT: usize = TokenKind::Eof as usize + 1;

const _: () = assert!(TOKEN_KIND_COUNT <= 128);

/// Keyword spellings, sorted for binary search.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("__PACKAGE__", TokenKind::KwCurrentPackage),
    ("and", TokenKind::KwAnd),
    ("cmp", TokenKind::KwCmp),
    ("do", TokenKind::KwDo),
    ("else", TokenKind::KwElse),
    ("elsif", TokenKind::KwElsif),
    ("eq", TokenKind::KwEq),
    ("eval", TokenKind::KwEval),
    ("for", TokenKind::KwFor),
    ("foreach", TokenKind::KwForeach),
    ("ge", TokenKind::KwGe),
    ("goto", TokenKind::KwGoto),
    ("gt", TokenKind::KwGt),
    ("if", TokenKind::KwIf),
    ("last", TokenKind::KwLast),
    ("le", TokenKind::KwLe),
    ("local", TokenKind::KwLocal),
    ("lt", TokenKind::KwLt),
    ("my", TokenKind::KwMy),
    ("ne", TokenKind::KwNe),
    ("next", TokenKind::KwNext),
    ("no", TokenKind::KwNo),
    ("not", TokenKind::KwNot),
    ("or", TokenKind::KwOr),
    ("our", TokenKind::KwOur),
    ("package", TokenKind::KwPackage),
    ("redo", TokenKind::KwRedo),
    ("require", TokenKind::KwRequire),
    ("return", TokenKind::KwReturn),
    ("state", TokenKind::KwState),
    ("sub", TokenKind::KwSub),
    ("unless", TokenKind::KwUnless),
    ("until", TokenKind::KwUntil),
    ("use", TokenKind::KwUse),
    ("while", TokenKind::KwWhile),
    ("x", TokenKind::KwX),
    ("xor", TokenKind::KwXor),
];

impl TokenKind {
    /// Look up the keyword kind for a bareword.
    ///
    /// `x` is returned as [`TokenKind::KwX`]; the lexer only keeps it when an
    /// operator is expected.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        KEYWORDS
            .binary_search_by(|(kw, _)| (*kw).cmp(word))
            .ok()
            .map(|idx| KEYWORDS[idx].1)
    }

    /// Trivia never reaches the parser.
    #[inline]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::Comment
                | TokenKind::Pod
                | TokenKind::DataSection
        )
    }

    #[inline]
    pub const fn is_keyword(self) -> bool {
        (self as u8) >= (TokenKind::KwMy as u8)
            && (self as u8) <= (TokenKind::KwCurrentPackage as u8)
    }

    /// Word operators that double as barewords (`lt`, `eq`, `x`, ...).
    #[inline]
    pub const fn is_word_operator(self) -> bool {
        matches!(
            self,
            TokenKind::KwAnd
                | TokenKind::KwOr
                | TokenKind::KwXor
                | TokenKind::KwNot
                | TokenKind::KwLt
                | TokenKind::KwGt
                | TokenKind::KwLe
                | TokenKind::KwGe
                | TokenKind::KwEq
                | TokenKind::KwNe
                | TokenKind::KwCmp
                | TokenKind::KwX
        )
    }

    /// Simple variable tokens (sigil + name).
    #[inline]
    pub const fn is_variable(self) -> bool {
        matches!(
            self,
            TokenKind::ScalarVar
                | TokenKind::ArrayVar
                | TokenKind::HashVar
                | TokenKind::CodeVar
                | TokenKind::GlobVar
                | TokenKind::ArrayLastIndex
        )
    }

    #[inline]
    pub const fn is_cast(self) -> bool {
        matches!(
            self,
            TokenKind::CastScalar
                | TokenKind::CastArray
                | TokenKind::CastHash
                | TokenKind::CastCode
                | TokenKind::CastGlob
                | TokenKind::CastLastIndex
        )
    }

    /// Human-readable name for diagnostics.
    pub fn display_name(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::Newline => "newline",
            TokenKind::Comment => "comment",
            TokenKind::Pod => "POD block",
            TokenKind::DataSection => "data section",
            TokenKind::Ident => "identifier",
            TokenKind::ScalarVar => "scalar variable",
            TokenKind::ArrayVar => "array variable",
            TokenKind::HashVar => "hash variable",
            TokenKind::CodeVar => "code variable",
            TokenKind::GlobVar => "glob",
            TokenKind::ArrayLastIndex => "`$#array`",
            TokenKind::CastScalar => "`$` dereference",
            TokenKind::CastArray => "`@` dereference",
            TokenKind::CastHash => "`%` dereference",
            TokenKind::CastCode => "`&` dereference",
            TokenKind::CastGlob => "`*` dereference",
            TokenKind::CastLastIndex => "`$#` dereference",
            TokenKind::Number => "number",
            TokenKind::VString => "version string",
            TokenKind::QuoteOpen => "string",
            TokenKind::QuoteMid => "quote separator",
            TokenKind::QuoteClose => "closing quote",
            TokenKind::QuoteModifiers => "quote modifiers",
            TokenKind::StringContent => "string content",
            TokenKind::UnterminatedQuote => "unterminated string",
            TokenKind::HeredocOpener => "heredoc",
            TokenKind::HeredocTerminator => "heredoc terminator",
            TokenKind::UnterminatedHeredoc => "unterminated heredoc",
            TokenKind::ReadLine => "`<...>`",
            TokenKind::KwMy => "`my`",
            TokenKind::KwOur => "`our`",
            TokenKind::KwLocal => "`local`",
            TokenKind::KwState => "`state`",
            TokenKind::KwSub => "`sub`",
            TokenKind::KwPackage => "`package`",
            TokenKind::KwUse => "`use`",
            TokenKind::KwNo => "`no`",
            TokenKind::KwRequire => "`require`",
            TokenKind::KwReturn => "`return`",
            TokenKind::KwIf => "`if`",
            TokenKind::KwUnless => "`unless`",
            TokenKind::KwElsif => "`elsif`",
            TokenKind::KwElse => "`else`",
            TokenKind::KwWhile => "`while`",
            TokenKind::KwUntil => "`until`",
            TokenKind::KwFor => "`for`",
            TokenKind::KwForeach => "`foreach`",
            TokenKind::KwDo => "`do`",
            TokenKind::KwEval => "`eval`",
            TokenKind::KwLast => "`last`",
            TokenKind::KwNext => "`next`",
            TokenKind::KwRedo => "`redo`",
            TokenKind::KwGoto => "`goto`",
            TokenKind::KwAnd => "`and`",
            TokenKind::KwOr => "`or`",
            TokenKind::KwXor => "`xor`",
            TokenKind::KwNot => "`not`",
            TokenKind::KwLt => "`lt`",
            TokenKind::KwGt => "`gt`",
            TokenKind::KwLe => "`le`",
            TokenKind::KwGe => "`ge`",
            TokenKind::KwEq => "`eq`",
            TokenKind::KwNe => "`ne`",
            TokenKind::KwCmp => "`cmp`",
            TokenKind::KwX => "`x`",
            TokenKind::KwCurrentPackage => "`__PACKAGE__`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::FatComma => "`=>`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Arrow => "`->`",
            TokenKind::PlusPlus => "`++`",
            TokenKind::MinusMinus => "`--`",
            TokenKind::StarStar => "`**`",
            TokenKind::Bang => "`!`",
            TokenKind::Tilde => "`~`",
            TokenKind::Backslash => "`\\`",
            TokenKind::Match => "`=~`",
            TokenKind::NotMatch => "`!~`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Dot => "`.`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::LAngle => "`<`",
            TokenKind::RAngle => "`>`",
            TokenKind::LtEq => "`<=`",
            TokenKind::GtEq => "`>=`",
            TokenKind::NumEq => "`==`",
            TokenKind::NumNe => "`!=`",
            TokenKind::Spaceship => "`<=>`",
            TokenKind::SmartMatch => "`~~`",
            TokenKind::Amp => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::AndAnd => "`&&`",
            TokenKind::OrOr => "`||`",
            TokenKind::DefinedOr => "`//`",
            TokenKind::Range => "`..`",
            TokenKind::Ellipsis => "`...`",
            TokenKind::Question => "`?`",
            TokenKind::Colon => "`:`",
            TokenKind::Assign => "`=`",
            TokenKind::OpAssign => "compound assignment",
            TokenKind::FileTest => "file test",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
