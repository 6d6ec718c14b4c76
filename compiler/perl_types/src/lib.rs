//! Value lattice and package registry for the Perl analysis core.
//!
//! - [`Value`]: the closed set of value shapes inference works with, plus the
//!   merge and bless operations that make it a small lattice
//! - [`Registry`]: per-file packages, subs, parents and export lists, built
//!   once by the parser through a [`RegistryBuilder`]
//! - [`codec`]: the tagged binary form both of them persist through
//!
//! # Design Philosophy
//!
//! - **Closed variants**: every consumer matches exhaustively on `Value`
//! - **Canonical unions**: a `OneOf` is always sorted, deduplicated and flat,
//!   so structural equality is set equality
//! - **Snapshots**: a finished `Registry` is never mutated; re-parsing builds
//!   a new one

pub mod codec;
mod registry;
mod tag;
mod value;

pub use codec::{DecodeError, Decoder, Encoder};
pub use registry::{
    ancestors, resolve_method, Exports, MethodResolution, PackageEntry, PackageLookup, Registry,
    RegistryBuilder, SubEntry, SubFlags, UseEntry, UseKind,
};
pub use tag::Tag;
pub use value::{CodeContract, ScalarKind, Union, Value};
