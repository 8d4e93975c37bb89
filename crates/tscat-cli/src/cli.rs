use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;

use crate::command_check::{CheckCommandError, CheckOptions, run_check};
use crate::command_coverage::{CoverageCommandError, CoverageOptions, run_coverage};
use crate::command_export::{ExportCommandError, ExportOptions, run_export};
use crate::command_resolve::{ResolveCommandError, ResolveOptions, run_resolve};

#[derive(Debug, Error)]
pub enum CliAppError {
    #[error("{0}")]
    Usage(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Check(#[from] CheckCommandError),
    #[error(transparent)]
    Coverage(#[from] CoverageCommandError),
    #[error(transparent)]
    Resolve(#[from] ResolveCommandError),
    #[error(transparent)]
    Export(#[from] ExportCommandError),
}

pub fn run() -> Result<(), CliAppError> {
    let mut args = std::env::args().skip(1);
    let command = args.next().ok_or_else(|| CliAppError::Usage(usage()))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match command.as_str() {
        "check" => {
            let options = parse_check_options(args.collect())?;
            run_check(&options, &mut out)?;
            Ok(())
        }
        "coverage" => {
            let options = parse_coverage_options(args.collect())?;
            run_coverage(&options, &mut out)?;
            Ok(())
        }
        "resolve" => {
            let options = parse_resolve_options(args.collect())?;
            let text = run_resolve(&options)?;
            writeln!(out, "{text}")?;
            Ok(())
        }
        "export" => {
            let options = parse_export_options(args.collect())?;
            run_export(&options, &mut out)?;
            Ok(())
        }
        _ => Err(CliAppError::Usage(usage())),
    }
}

fn parse_check_options(args: Vec<String>) -> Result<CheckOptions, CliAppError> {
    let mut catalog_path = None;
    let mut deny_warnings = false;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--catalog" => catalog_path = Some(PathBuf::from(next_value("--catalog", &mut iter)?)),
            "--deny-warnings" => deny_warnings = true,
            "--help" | "-h" => return Err(CliAppError::Usage(usage())),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let catalog_path = catalog_path.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(CheckOptions {
        catalog_path,
        deny_warnings,
    })
}

fn parse_coverage_options(args: Vec<String>) -> Result<CoverageOptions, CliAppError> {
    let mut catalog_paths = Vec::new();
    let mut out_path = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--catalog" => catalog_paths.push(PathBuf::from(next_value("--catalog", &mut iter)?)),
            "--out" => out_path = Some(PathBuf::from(next_value("--out", &mut iter)?)),
            "--help" | "-h" => return Err(CliAppError::Usage(usage())),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    if catalog_paths.is_empty() {
        return Err(CliAppError::Usage(usage()));
    }
    Ok(CoverageOptions {
        catalog_paths,
        out_path,
    })
}

fn parse_resolve_options(args: Vec<String>) -> Result<ResolveOptions, CliAppError> {
    let mut config_path = PathBuf::from("tscat.toml");
    let mut context = None;
    let mut source = None;
    let mut disambiguation = None;
    let mut locale = None;
    let mut count = None;
    let mut positional = Vec::new();
    let mut named = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config_path = PathBuf::from(next_value("--config", &mut iter)?),
            "--context" => context = Some(next_value("--context", &mut iter)?),
            "--source" => source = Some(next_value("--source", &mut iter)?),
            "--comment" => disambiguation = Some(next_value("--comment", &mut iter)?),
            "--locale" => locale = Some(next_value("--locale", &mut iter)?),
            "--count" => {
                let value = next_value("--count", &mut iter)?;
                let parsed = value.parse::<i64>().map_err(|_| {
                    CliAppError::Usage(format!("--count expects an integer, got `{value}`"))
                })?;
                count = Some(parsed);
            }
            "--arg" => positional.push(next_value("--arg", &mut iter)?),
            "--named" => named.push(next_value("--named", &mut iter)?),
            "--help" | "-h" => return Err(CliAppError::Usage(usage())),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let context = context.ok_or_else(|| CliAppError::Usage(usage()))?;
    let source = source.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(ResolveOptions {
        config_path,
        context,
        source,
        disambiguation,
        locale,
        count,
        args: positional,
        named,
    })
}

fn parse_export_options(args: Vec<String>) -> Result<ExportOptions, CliAppError> {
    let mut catalog_path = None;
    let mut out_path = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--catalog" => catalog_path = Some(PathBuf::from(next_value("--catalog", &mut iter)?)),
            "--out" => out_path = Some(PathBuf::from(next_value("--out", &mut iter)?)),
            "--help" | "-h" => return Err(CliAppError::Usage(usage())),
            _ => return Err(CliAppError::Usage(usage())),
        }
    }
    let catalog_path = catalog_path.ok_or_else(|| CliAppError::Usage(usage()))?;
    Ok(ExportOptions {
        catalog_path,
        out_path,
    })
}

fn next_value(flag: &str, iter: &mut impl Iterator<Item = String>) -> Result<String, CliAppError> {
    iter.next()
        .ok_or_else(|| CliAppError::Usage(format!("{flag} requires a value\n\n{}", usage())))
}

fn usage() -> String {
    "usage: tscat check --catalog <path> [--deny-warnings]\n       tscat coverage --catalog <path> [--catalog <path>...] [--out <path>]\n       tscat resolve --context <name> --source <text> [--comment <text>] [--locale <tag>] [--count <n>] [--arg <value>...] [--named <key=value>...] [--config <path>]\n       tscat export --catalog <path> [--out <path>]".to_string()
}
