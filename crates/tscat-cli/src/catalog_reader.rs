use std::fs;
use std::path::Path;

use thiserror::Error;
use tscat_core::{ParseError, ParsedCatalog, parse};

#[derive(Debug, Error)]
pub enum CatalogReadError {
    #[error("io error: {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse { path: String, source: ParseError },
}

pub fn read_catalog(path: &Path) -> Result<ParsedCatalog, CatalogReadError> {
    let bytes = fs::read(path).map_err(|source| CatalogReadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&bytes).map_err(|source| CatalogReadError::Parse {
        path: path.display().to_string(),
        source,
    })
}
