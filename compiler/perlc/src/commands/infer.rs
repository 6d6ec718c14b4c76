//! `infer` and `symbols`: inference results for whole files and for a
//! position.

use std::io::Write;
use std::path::Path;

use perl_infer::Cancellation;
use perl_ir::NodeKind;

use super::{file_header, line_of, load_workspace};
use crate::snapshot::SymbolKind;
use crate::{AnalysisConfig, CliError};

/// Print the inferred return value of every sub and the value of every
/// declared variable, across all `paths` analysed together.
pub fn infer_files(
    config: &AnalysisConfig,
    paths: &[String],
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let (workspace, snapshots) = load_workspace(config, paths)?;
    let view = workspace.view();
    let cancel = Cancellation::new();

    for snapshot in &snapshots {
        let engine = snapshot
            .engine()
            .with_external(&view)
            .with_cancellation(cancel.clone());
        let interner = snapshot.interner();
        let tree = snapshot.tree();
        file_header(out, snapshot.path())?;

        for sub in snapshot.registry().all_subs() {
            writeln!(
                out,
                "  sub {}::{} -> {}",
                interner.lookup(sub.package),
                interner.lookup(sub.name),
                engine.summary(sub.node)
            )?;
        }
        for decl in tree.descendants_of_kind(tree.root(), NodeKind::VarDecl) {
            for var in tree.preorder(decl).filter(|&n| {
                matches!(
                    tree.kind(n),
                    NodeKind::ScalarVar | NodeKind::ArrayVar | NodeKind::HashVar
                )
            }) {
                writeln!(
                    out,
                    "  {} (line {}) -> {}",
                    tree.text(var, snapshot.source()),
                    line_of(snapshot.source(), tree.span(var).start),
                    engine.infer(var)
                )?;
            }
        }
    }
    Ok(())
}

/// Print the pragmas and names visible at byte `offset` of `path`.
pub fn symbols_at(
    config: &AnalysisConfig,
    path: &str,
    offset: u32,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let (workspace, _) = load_workspace(config, &[path.to_owned()])?;
    let path = Path::new(path);
    let Some(snapshot) = workspace.snapshot(path) else {
        return Err(CliError::Usage("file was not analysed"));
    };
    let features = snapshot.features_at(offset);

    file_header(out, path)?;
    writeln!(out, "  package {}", snapshot.package_at(offset))?;
    writeln!(out, "  version {}", features.min_version())?;
    writeln!(
        out,
        "  pragmas {}",
        features.enabled_pragma_names().join(" ")
    )?;
    writeln!(
        out,
        "  features {}",
        features.enabled_feature_names().join(" ")
    )?;
    let labels = snapshot.labels_at(offset);
    if !labels.is_empty() {
        writeln!(out, "  labels {}", labels.join(" "))?;
    }

    let symbols = workspace.visible_symbols(path, offset).unwrap_or_default();
    for symbol in symbols {
        match symbol.kind {
            SymbolKind::Lexical => writeln!(out, "  lexical {}", symbol.name)?,
            SymbolKind::Sub => writeln!(out, "  sub {}", symbol.name)?,
            SymbolKind::Import { module } => {
                writeln!(out, "  import {} from {module}", symbol.name)?
            }
            SymbolKind::Package => writeln!(out, "  package {}", symbol.name)?,
        }
    }
    if let Some(doc) = workspace.documentation_at(path, offset, &Cancellation::new()) {
        writeln!(out)?;
        for line in doc.lines() {
            writeln!(out, "  | {line}")?;
        }
    }
    Ok(())
}
