//! Debug commands: `lex` and `parse` for inspecting analysis internals.

use std::io::Write;
use std::path::Path;

use perl_ir::SharedInterner;
use perl_lexer::lex;
use perl_parse::parse;

use super::{line_of, read_source};
use crate::{AnalysisConfig, CliError};

/// Lex a file and list its tokens, trivia excluded.
pub fn lex_file(path: &Path, out: &mut dyn Write) -> Result<(), CliError> {
    let source = read_source(path)?;
    let lexed = lex(&source);
    writeln!(
        out,
        "Tokens for '{}' ({} tokens, {} trivia, {} annotations):",
        path.display(),
        lexed.tokens.len(),
        lexed.trivia.len(),
        lexed.annotations.len()
    )?;
    for token in lexed.tokens.iter() {
        writeln!(
            out,
            "  {:?} @ {} {:?}",
            token.kind,
            token.span,
            token.text(&source)
        )?;
    }
    for annotation in &lexed.annotations {
        writeln!(
            out,
            "  #@{} {:?} (line {})",
            annotation.kind.name(),
            annotation.argument.text(&source),
            line_of(&source, annotation.span.start)
        )?;
    }
    Ok(())
}

/// Parse a file and summarise its packages and errors.
pub fn parse_file(
    config: &AnalysisConfig,
    path: &Path,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let source = read_source(path)?;
    let interner = SharedInterner::new();
    let lexed = lex(&source);
    let parsed = parse(&lexed, &source, &interner, config.parse_options());
    let name = |n| interner.lookup(n);

    writeln!(out, "Parse result for '{}':", path.display())?;
    writeln!(out, "  Nodes: {}", parsed.tree.len())?;
    writeln!(out, "  Packages: {}", parsed.registry.packages().len())?;
    writeln!(out, "  Errors: {}", parsed.errors.len())?;

    for package in parsed.registry.packages() {
        writeln!(out)?;
        write!(out, "package {}", name(package.name))?;
        if let Some(version) = package.version {
            write!(out, " {version}")?;
        }
        writeln!(out)?;
        if !package.parents.is_empty() {
            let parents: Vec<&str> = package.parents.iter().map(|&p| name(p)).collect();
            writeln!(out, "  isa: {}", parents.join(", "))?;
        }
        if !package.export.is_empty() {
            let export: Vec<&str> = package.export.iter().map(|&p| name(p)).collect();
            writeln!(out, "  export: {}", export.join(" "))?;
        }
        if !package.export_ok.is_empty() {
            let export_ok: Vec<&str> = package.export_ok.iter().map(|&p| name(p)).collect();
            writeln!(out, "  export_ok: {}", export_ok.join(" "))?;
        }
        for entry in &package.uses {
            writeln!(out, "  use {}", name(entry.module))?;
        }
        for sub in package.subs() {
            write!(out, "  sub {}", name(sub.name))?;
            if !sub.flags.is_empty() {
                write!(out, " {:?}", sub.flags)?;
            }
            if let Some(returns) = &sub.returns {
                write!(out, " returns {returns}")?;
            }
            writeln!(out)?;
        }
    }

    if !parsed.errors.is_empty() {
        writeln!(out)?;
        writeln!(out, "Errors:")?;
        for error in &parsed.errors {
            writeln!(out, "  {}: {error}", error.span)?;
        }
    }
    Ok(())
}
