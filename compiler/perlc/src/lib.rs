//! Driver for the Perl analysis core.
//!
//! ```text
//! source text
//!     │
//!     ▼
//! FileSnapshot::build ──► tokens, tree, registry   (one writer per file)
//!     │
//!     ▼
//! Workspace ──► WorkspaceView                      (frozen, cross-file lookup)
//!     │
//!     ▼
//! value_at / visible_symbols / documentation_at    (queried, never pushed)
//! ```
//!
//! Registry stubs of unchanged files are persisted in a [`StubCache`] so
//! that library files need not be re-parsed between runs.

pub mod commands;
pub mod config;
mod error;
mod hash;
pub mod snapshot;
mod stub_cache;
pub mod workspace;

use std::sync::Once;

pub use config::AnalysisConfig;
pub use error::{CacheError, CliError};
pub use hash::ContentHash;
pub use snapshot::FileSnapshot;
pub use stub_cache::StubCache;
pub use workspace::{Workspace, WorkspaceView};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=perl_infer=debug`. With `PERLC_LOG_TREE` set, spans are
/// printed as an indented tree instead of flat lines.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var_os("PERLC_LOG_TREE").is_some() {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
