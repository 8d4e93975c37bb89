use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tscat_core::{Catalog, MessageEntry, TranslationState};

use crate::catalog_reader::{CatalogReadError, read_catalog};

#[derive(Debug, Error)]
pub enum CoverageCommandError {
    #[error(transparent)]
    Catalog(#[from] CatalogReadError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct CoverageOptions {
    pub catalog_paths: Vec<PathBuf>,
    /// Standard output when unset.
    pub out_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CoverageReport {
    total_messages: usize,
    locales: BTreeMap<String, LocaleCoverage>,
}

#[derive(Debug, Serialize)]
struct LocaleCoverage {
    translated: usize,
    unfinished: usize,
    missing: usize,
    percent: f64,
    missing_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MessageKey {
    context: String,
    source: String,
    disambiguation: Option<String>,
}

impl MessageKey {
    fn label(&self) -> String {
        match &self.disambiguation {
            Some(disambiguation) => {
                format!("{}::{} ({disambiguation})", self.context, self.source)
            }
            None => format!("{}::{}", self.context, self.source),
        }
    }
}

/// Measures every catalog against the union of live keys across all of them.
pub fn run_coverage(
    options: &CoverageOptions,
    out: &mut impl Write,
) -> Result<(), CoverageCommandError> {
    let mut catalogs = Vec::with_capacity(options.catalog_paths.len());
    for path in &options.catalog_paths {
        catalogs.push(read_catalog(path)?.catalog);
    }
    let report = coverage_report(&catalogs);
    let json = serde_json::to_string_pretty(&report)?;
    match &options.out_path {
        Some(path) => fs::write(path, json)?,
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}

fn coverage_report(catalogs: &[Catalog]) -> CoverageReport {
    let mut keys = BTreeSet::new();
    for catalog in catalogs {
        for (key, _) in live_entries(catalog) {
            keys.insert(key);
        }
    }

    let total = keys.len();
    let mut locales = BTreeMap::new();
    for catalog in catalogs {
        let entries: BTreeMap<MessageKey, &MessageEntry> = live_entries(catalog).collect();
        let mut translated = 0usize;
        let mut unfinished = 0usize;
        let mut missing_keys = Vec::new();
        for key in &keys {
            match entries.get(key) {
                Some(entry) if is_translated(entry) => translated += 1,
                Some(_) => unfinished += 1,
                None => missing_keys.push(key.label()),
            }
        }
        let percent = if total == 0 {
            100.0
        } else {
            (translated as f64 / total as f64) * 100.0
        };
        locales.insert(
            catalog.locale().normalized().to_string(),
            LocaleCoverage {
                translated,
                unfinished,
                missing: missing_keys.len(),
                percent,
                missing_keys,
            },
        );
    }

    CoverageReport {
        total_messages: total,
        locales,
    }
}

fn live_entries(catalog: &Catalog) -> impl Iterator<Item = (MessageKey, &MessageEntry)> {
    catalog.contexts().flat_map(|context| {
        context
            .messages()
            .iter()
            .filter(|entry| !entry.state().is_retired())
            .map(move |entry| {
                let key = MessageKey {
                    context: context.name().to_string(),
                    source: entry.source().to_string(),
                    disambiguation: entry.disambiguation().map(str::to_string),
                };
                (key, entry)
            })
    })
}

fn is_translated(entry: &MessageEntry) -> bool {
    let templates = entry.translation().templates();
    entry.state() == TranslationState::Finished
        && !templates.is_empty()
        && templates.iter().all(|template| !template.is_empty())
}
