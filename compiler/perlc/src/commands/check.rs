//! `check`: parse files and report syntax errors.

use std::io::Write;
use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use perl_parse::ParseError;

use super::load_workspace;
use crate::{AnalysisConfig, CliError};

/// Check `paths`, writing a report for every parse error. Returns the
/// number of errors.
pub fn check_files(
    config: &AnalysisConfig,
    paths: &[String],
    color: bool,
    out: &mut dyn Write,
) -> Result<usize, CliError> {
    let (_, snapshots) = load_workspace(config, paths)?;
    let mut total = 0;
    for snapshot in &snapshots {
        let path = snapshot.path().display().to_string();
        render_parse_errors(&path, snapshot.source(), snapshot.errors(), color, out)?;
        total += snapshot.errors().len();
    }
    if total == 0 {
        writeln!(out, "No errors in {} file(s).", snapshots.len())?;
    } else {
        writeln!(out, "{total} error(s) in {} file(s).", snapshots.len())?;
    }
    Ok(total)
}

/// Write one report per error.
pub fn render_parse_errors(
    path: &str,
    source: &str,
    errors: &[ParseError],
    color: bool,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    for error in errors {
        let range = char_range(source, error.span.to_range());
        Report::build(ReportKind::Error, path, range.start)
            .with_config(Config::default().with_color(color))
            .with_message(error.title())
            .with_label(Label::new((path, range)).with_message(error.to_string()))
            .finish()
            .write((path, Source::from(source.to_owned())), &mut *out)?;
    }
    Ok(())
}

/// Reports address characters, spans address bytes.
fn char_range(source: &str, bytes: Range<usize>) -> Range<usize> {
    let to_char = |byte: usize| source.char_indices().take_while(|&(i, _)| i < byte).count();
    to_char(bytes.start)..to_char(bytes.end)
}
