//! Perl IR - shared data structures for the Perl analysis core.
//!
//! This crate contains the types every pipeline stage agrees on:
//! - Spans for source locations
//! - Names for interned identifiers
//! - Tokens and `TokenList` for lexer output
//! - The syntax tree arena (`SyntaxTree`, `NodeId`, `NodeKind`)
//! - Feature tables and Perl versions for pragma tracking
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifier strings become `Name(u32)`
//! - **Flatten Everything**: no `Box<Node>`, nodes live in an arena addressed by `NodeId(u32)`
//! - **Snapshots, not mutation**: a finished `SyntaxTree` is immutable; re-parsing
//!   produces a new tree

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod features;
mod interner;
mod name;
mod span;
mod token;
pub mod tree;
pub mod visitor;

pub use features::{FeatureTable, Features, PerlVersion};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
pub use token::{LexMode, Token, TokenFlags, TokenKind, TokenList, TOKEN_KIND_COUNT};
pub use tree::{
    Checkpoint, Child, ContextId, Node, NodeId, NodeKind, ScopeContext, SyntaxTree, TreeBuilder,
};

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{Node, Span, Token};
    static_assert_size!(Span, 8);
    static_assert_size!(Token, 12);
    static_assert_size!(Node, 32);
}
