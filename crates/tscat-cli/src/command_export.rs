use std::fs;
use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tscat_core::write_catalog;

use crate::catalog_reader::{CatalogReadError, read_catalog};

#[derive(Debug, Error)]
pub enum ExportCommandError {
    #[error(transparent)]
    Catalog(#[from] CatalogReadError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub catalog_path: PathBuf,
    pub out_path: Option<PathBuf>,
}

/// Re-emits a catalog in normalized form: merged contexts, one entry per key.
pub fn run_export(options: &ExportOptions, out: &mut impl Write) -> Result<(), ExportCommandError> {
    let parsed = read_catalog(&options.catalog_path)?;
    let document = write_catalog(&parsed.catalog);
    match &options.out_path {
        Some(path) => fs::write(path, document)?,
        None => out.write_all(document.as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ExportOptions, run_export};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        path.push(format!("tscat_{name}_{nanos}.ts"));
        path
    }

    #[test]
    fn exports_normalized_catalog() {
        let path = temp_path("export_in");
        fs::write(
            &path,
            "<TS language=\"ko-kr\"><context><name>Ctx</name>\
             <message><source>A</source><translation>first</translation></message></context>\
             <context><name>Ctx</name>\
             <message><source>A</source><translation>second</translation></message></context></TS>",
        )
        .expect("write");
        let mut out = Vec::new();
        let options = ExportOptions {
            catalog_path: path.clone(),
            out_path: None,
        };
        run_export(&options, &mut out).expect("export");
        let document = String::from_utf8(out).expect("utf-8");
        assert!(document.contains("language=\"ko_KR\""));
        assert_eq!(document.matches("<context>").count(), 1);
        assert!(document.contains("<translation>second</translation>"));
        assert!(!document.contains("first"));

        let out_path = temp_path("export_out");
        let options = ExportOptions {
            catalog_path: path.clone(),
            out_path: Some(out_path.clone()),
        };
        run_export(&options, &mut Vec::new()).expect("export");
        assert_eq!(fs::read_to_string(&out_path).expect("read"), document);
        fs::remove_file(&path).ok();
        fs::remove_file(&out_path).ok();
    }
}
