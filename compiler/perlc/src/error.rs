//! Driver errors.
//!
//! Problems in the analysed Perl source are never errors here: they are
//! parse diagnostics and `Unknown` values. These types cover the faults of
//! the driver itself.

use std::path::PathBuf;

use perl_types::DecodeError;
use thiserror::Error;

/// Command-line and input problems.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid value {value:?} for {option}: {reason}")]
    InvalidOption {
        option: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("{0}")]
    Usage(&'static str),
}

/// Failures of the on-disk stub cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("stub cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stub envelope is corrupt: {0}")]
    Envelope(#[from] bincode::Error),
    #[error("stub payload is corrupt: {0}")]
    Payload(#[from] DecodeError),
}
