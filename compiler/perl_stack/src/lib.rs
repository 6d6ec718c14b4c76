//! Stack growth for deep recursion.
//!
//! The expression parser and the inference engine recurse once per nesting
//! level. Generated Perl (long `.` chains, deeply nested data dumps) can
//! nest tens of thousands of levels, so both wrap their recursive entry
//! points in [`ensure_sufficient_stack`].
//!
//! On native targets the stack is grown on demand with `stacker`; on WASM
//! the closure is called directly.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first switching to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
