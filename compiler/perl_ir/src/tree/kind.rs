//! Syntax node kinds.

use std::fmt;

/// Kind of a syntax tree node.
///
/// Node kinds are fieldless; the few facts a node carries beyond its
/// children (a package, sub, module or variable name) live in
/// [`Node::name`](super::Node::name).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum NodeKind {
    /// Root of a file.
    File,
    /// Tokens the parser could not make sense of.
    Error,

    // === Statements ===
    /// Expression followed by `;`.
    ExprStmt,
    /// A lone `;`.
    EmptyStmt,
    Block,
    /// `package NAME [VERSION];` or `package NAME [VERSION] BLOCK`. `name` is the package.
    PackageDecl,
    /// `sub NAME ...`. `name` is the sub name as written (may be qualified).
    SubDecl,
    /// `BEGIN { ... }`, `END { ... }`, ... `name` is the phase.
    PhaseBlock,
    /// `use MODULE ...` / `use VERSION`. `name` is the module (empty for versions).
    UseStmt,
    /// `no MODULE ...`. `name` is the module.
    NoStmt,
    /// `if`/`unless` with optional `elsif`/`else` clauses.
    IfStmt,
    ElsifClause,
    ElseClause,
    /// `while`/`until` loop.
    WhileStmt,
    /// C-style `for (init; cond; step)`.
    ForStmt,
    /// `foreach [my] $var (LIST) BLOCK`.
    ForeachStmt,
    /// `EXPR if COND;` and friends. Children: modifier keyword, condition.
    StatementModifier,
    /// `LABEL:` prefix. `name` is the label.
    Label,

    // === Declarations ===
    /// `my`/`our`/`local`/`state` with a variable or a parenthesised list.
    VarDecl,
    /// Sub signature or prototype in parentheses.
    Signature,

    // === Variables ===
    /// `name` is the variable name without sigil, e.g. `x`, `Foo::x`, `_`.
    ScalarVar,
    ArrayVar,
    HashVar,
    CodeVar,
    GlobVar,
    ArrayLastIndex,
    /// `$a[0]`. `name` is the array name.
    ArrayElement,
    /// `$h{k}`. `name` is the hash name.
    HashElement,
    /// `@a[0, 1]`.
    ArraySlice,
    /// `@h{qw(a b)}`.
    HashSlice,
    /// `EXPR->[0]`, or an implicit arrow between subscripts.
    DerefArrayElement,
    /// `EXPR->{k}`.
    DerefHashElement,
    /// Sigil applied to an expression: `$$ref`, `@{ ... }`, `%$h`.
    Cast,

    // === Literals ===
    NumberLit,
    VersionLit,
    /// `'..'`, `".."`, `q`, `qq`, `qx`, backticks.
    StringLit,
    /// A string literal cut off by end of input.
    UnterminatedString,
    /// `qw(...)`.
    QwList,
    /// `m//` or `//`.
    RegexMatch,
    /// `s///`.
    RegexSubst,
    /// `tr///` / `y///`.
    Transliterate,
    /// `qr//`.
    RegexQr,
    /// `<<END`. The body follows later as a [`NodeKind::HeredocBody`].
    HeredocLit,
    HeredocBody,
    /// `<FH>`, `<$fh>`, `<>`.
    ReadLine,

    // === Composite expressions ===
    /// `[ ... ]`
    AnonArray,
    /// `{ ... }` in expression position.
    AnonHash,
    /// `sub { ... }`
    AnonSub,
    /// `\EXPR`
    RefExpr,
    /// `( ... )`
    ParenList,
    /// Comma-separated expressions.
    ListExpr,
    BinaryExpr,
    UnaryExpr,
    PostfixExpr,
    /// `=` and compound assignment.
    AssignExpr,
    TernaryExpr,

    // === Calls ===
    /// Named function call, with or without parentheses. `name` is the function.
    Call,
    /// Call arguments.
    Args,
    /// `INVOCANT->method(...)`. `name` is the method when static.
    MethodCall,
    /// `$code->(...)`, `&$code(...)`, `&name(...)`.
    CodeCall,
    /// A bareword used as a value: class name, hash key, filehandle.
    Bareword,
    /// `__PACKAGE__`
    CurrentPackage,
    Return,
    DoBlock,
    EvalBlock,
    /// `require Foo::Bar` / `require "file.pl"`. `name` is the module when bare.
    Require,
    /// `last`/`next`/`redo`/`goto` with optional label. `name` is the label.
    LoopControl,
}

impl NodeKind {
    /// Statement-level node kinds.
    pub const fn is_statement(self) -> bool {
        matches!(
            self,
            NodeKind::ExprStmt
                | NodeKind::EmptyStmt
                | NodeKind::PackageDecl
                | NodeKind::SubDecl
                | NodeKind::PhaseBlock
                | NodeKind::UseStmt
                | NodeKind::NoStmt
                | NodeKind::IfStmt
                | NodeKind::WhileStmt
                | NodeKind::ForStmt
                | NodeKind::ForeachStmt
                | NodeKind::Block
                | NodeKind::Error
        )
    }

    /// Nodes that name a variable directly.
    pub const fn is_variable(self) -> bool {
        matches!(
            self,
            NodeKind::ScalarVar
                | NodeKind::ArrayVar
                | NodeKind::HashVar
                | NodeKind::CodeVar
                | NodeKind::GlobVar
                | NodeKind::ArrayLastIndex
        )
    }

    /// String-like literals, including regex forms.
    pub const fn is_string_like(self) -> bool {
        matches!(
            self,
            NodeKind::StringLit
                | NodeKind::UnterminatedString
                | NodeKind::QwList
                | NodeKind::RegexMatch
                | NodeKind::RegexSubst
                | NodeKind::Transliterate
                | NodeKind::RegexQr
                | NodeKind::HeredocLit
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
