use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use tscat_core::Args;
use tscat_runtime::{MessageRequest, RuntimeError, bootstrap};

#[derive(Debug, Error)]
pub enum ResolveCommandError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("named argument `{0}` must look like key=value")]
    NamedArgument(String),
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub config_path: PathBuf,
    pub context: String,
    pub source: String,
    pub disambiguation: Option<String>,
    pub locale: Option<String>,
    pub count: Option<i64>,
    pub args: Vec<String>,
    pub named: Vec<String>,
}

/// Loads the configured catalogs and resolves a single message.
pub fn run_resolve(options: &ResolveOptions) -> Result<String, ResolveCommandError> {
    let (resolver, report) = bootstrap(&options.config_path)?;
    debug!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        locale = %resolver.active_locale(),
        "catalogs ready"
    );
    if let Some(locale) = &options.locale {
        resolver.set_active_locale(locale)?;
    }

    let mut args = Args::positional(options.args.iter().map(String::as_str));
    for pair in &options.named {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| ResolveCommandError::NamedArgument(pair.clone()))?;
        args.insert(name, value);
    }

    let mut request = MessageRequest::new(&options.context, &options.source).args(&args);
    if let Some(disambiguation) = &options.disambiguation {
        request = request.disambiguation(disambiguation);
    }
    if let Some(count) = options.count {
        request = request.count(count);
    }
    Ok(resolver.resolve_request(&request))
}
