//! Value inference for Perl syntax trees.
//!
//! Given a parsed file, [`Engine::infer_value`] computes the [`Value`] an
//! expression may evaluate to, without running anything. Resolution order:
//!
//! 1. Literal and constructor syntax (`"..."`, `[...]`, `{...}`, `sub {...}`)
//! 2. Builtin return shapes (`keys %h`, `bless`, `shift`)
//! 3. Declared (`#@returns`) or inferred return values of called subs, found
//!    through the package registry and its parent chains
//! 4. The assignments to a variable that reach the point of use, merged
//! 5. `Unknown`
//!
//! # Design
//!
//! - **Total**: inference never fails; cycles, misses and cancelled queries
//!   all come back as `Unknown`
//! - **Per-query state**: a [`Visited`] set tracks the inferences running on
//!   the current query so that circular assignments terminate
//! - **Shared summaries**: return values of subs are computed once per file
//!   snapshot in a [`SummaryCache`]; concurrent queries wait for an
//!   in-flight summary instead of duplicating it
//! - **Cooperative cancellation**: every node visit polls a [`Cancellation`]
//!
//! [`Value`]: perl_types::Value

mod builtins;
mod cancel;
mod engine;
mod summary;
mod visited;

pub use builtins::{builtin, Builtin, BuiltinReturn, BUILTINS};
pub use cancel::Cancellation;
pub use engine::{Engine, ExternalLookup};
pub use summary::{SummaryCache, SummaryKey, WaitGraph};
pub use visited::Visited;

/// Inference limits.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct InferOptions {
    /// Values are cut to this nesting depth; anything below becomes `Unknown`.
    pub max_depth: u32,
}

impl InferOptions {
    pub const DEFAULT_MAX_DEPTH: u32 = 32;
}

impl Default for InferOptions {
    fn default() -> Self {
        InferOptions {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests;
