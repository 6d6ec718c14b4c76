//! Command handlers for the `perlc` CLI.
//!
//! Each submodule implements one command. Handlers write to the given
//! output so that tests can capture it; `main` passes stdout. Shared
//! helpers live here.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{AnalysisConfig, CliError, FileSnapshot, Workspace};

mod check;
mod debug;
mod infer;

pub use check::{check_files, render_parse_errors};
pub use debug::{lex_file, parse_file};
pub use infer::{infer_files, symbols_at};

/// Read a source file.
pub fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read `paths` and analyse them together.
pub(crate) fn load_workspace(
    config: &AnalysisConfig,
    paths: &[String],
) -> Result<(Workspace, Vec<Arc<FileSnapshot>>), CliError> {
    if paths.is_empty() {
        return Err(CliError::Usage("no input files"));
    }
    let files = paths
        .iter()
        .map(|path| {
            let path = PathBuf::from(path);
            read_source(&path).map(|source| (path, source))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let workspace = Workspace::new(config.clone());
    let snapshots = workspace.analyze_all(files);
    Ok((workspace, snapshots))
}

/// One-based line of a byte offset.
pub(crate) fn line_of(source: &str, offset: u32) -> usize {
    let end = usize::try_from(offset).map_or(source.len(), |o| o.min(source.len()));
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Header line naming a file.
fn file_header(out: &mut dyn Write, path: &Path) -> Result<(), CliError> {
    writeln!(out, "{}:", path.display())?;
    Ok(())
}
