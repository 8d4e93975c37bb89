use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tscat_core::{Diagnostic, PluralRuleTable, validate_catalog};

use crate::catalog_reader::{CatalogReadError, read_catalog};

#[derive(Debug, Error)]
pub enum CheckCommandError {
    #[error(transparent)]
    Catalog(#[from] CatalogReadError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("check failed with {0} diagnostics")]
    Failed(usize),
}

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub catalog_path: PathBuf,
    pub deny_warnings: bool,
}

/// Parses and validates one catalog, printing every finding.
pub fn run_check(
    options: &CheckOptions,
    out: &mut impl Write,
) -> Result<Vec<Diagnostic>, CheckCommandError> {
    let parsed = read_catalog(&options.catalog_path)?;
    let mut diagnostics = parsed.diagnostics;
    diagnostics.extend(validate_catalog(
        &parsed.catalog,
        &PluralRuleTable::builtin(),
    ));

    for diagnostic in &diagnostics {
        writeln!(out, "{}: {diagnostic}", options.catalog_path.display())?;
    }
    let catalog = &parsed.catalog;
    writeln!(
        out,
        "{}: {} messages in {} contexts, {} diagnostics",
        catalog.locale(),
        catalog.message_count(),
        catalog.contexts().count(),
        diagnostics.len()
    )?;

    let failing = diagnostics
        .iter()
        .filter(|diagnostic| options.deny_warnings || diagnostic.is_error())
        .count();
    if failing > 0 {
        return Err(CheckCommandError::Failed(failing));
    }
    Ok(diagnostics)
}
