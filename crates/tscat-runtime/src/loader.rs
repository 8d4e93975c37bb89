use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};
use tscat_core::{CatalogParser, LanguageTag, ParsedCatalog};

use crate::config::{CatalogSource, EngineConfig, load_config_or_default, parse_locale};
use crate::error::{RuntimeError, RuntimeResult};
use crate::resolver::MessageResolver;
use crate::store::CatalogStore;

#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: RuntimeError,
}

/// Outcome of [`load_all`]: locales that were installed and catalogs that
/// failed. A failed catalog leaves whatever the store held for that locale.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<LanguageTag>,
    pub failed: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub fn parse_sha256(value: &str) -> RuntimeResult<[u8; 32]> {
    let trimmed = value.trim();
    let hex = trimmed.strip_prefix("sha256:").unwrap_or(trimmed);
    let bytes = hex::decode(hex).map_err(|_| RuntimeError::InvalidHash)?;
    if bytes.len() != 32 {
        return Err(RuntimeError::InvalidHash);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Reads and parses one catalog. `source.path` is resolved against `base`.
pub fn read_catalog(source: &CatalogSource, base: &Path) -> RuntimeResult<ParsedCatalog> {
    let path = base.join(&source.path);
    let bytes = fs::read(&path)?;
    if let Some(pin) = &source.sha256 {
        let expected = parse_sha256(pin)?;
        if sha256(&bytes) != expected {
            return Err(RuntimeError::HashMismatch(path.display().to_string()));
        }
    }
    let mut parser = CatalogParser::new();
    if let Some(locale) = &source.locale {
        parser = parser.with_locale(parse_locale(locale)?);
    }
    Ok(parser.parse(&bytes)?)
}

/// Logs the parse diagnostics and publishes the catalog.
pub fn install(store: &CatalogStore, parsed: ParsedCatalog, origin: &Path) -> LanguageTag {
    for diagnostic in &parsed.diagnostics {
        warn!(path = %origin.display(), "{diagnostic}");
    }
    let locale = parsed.catalog.locale().clone();
    store.load(parsed.catalog);
    locale
}

/// Parses every catalog on its own thread, then installs the results in
/// `sources` order. When two sources resolve to the same locale the later
/// one wins regardless of which finished parsing first.
pub fn load_all(store: &CatalogStore, sources: &[CatalogSource], base: &Path) -> LoadReport {
    let mut report = LoadReport::default();
    thread::scope(|scope| {
        let workers: Vec<_> = sources
            .iter()
            .map(|source| (source, scope.spawn(move || read_catalog(source, base))))
            .collect();

        for (source, worker) in workers {
            let outcome = worker.join().unwrap_or_else(|_| {
                Err(RuntimeError::LoaderPanicked(
                    source.path.display().to_string(),
                ))
            });
            match outcome {
                Ok(parsed) => report.loaded.push(install(store, parsed, &source.path)),
                Err(error) => {
                    warn!(
                        path = %source.path.display(),
                        error = %error,
                        "catalog load failed; previous catalog kept"
                    );
                    report.failed.push(LoadFailure {
                        path: source.path.clone(),
                        error,
                    });
                }
            }
        }
    });
    debug!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        "catalog load finished"
    );
    report
}

/// Loads the configured catalogs into `store` and applies the configured
/// active locale.
pub fn load_from_config(
    store: &CatalogStore,
    config: &EngineConfig,
    base: &Path,
) -> RuntimeResult<LoadReport> {
    store.set_active_locale(config.active_locale()?);
    Ok(load_all(store, &config.catalogs, base))
}

/// Reads `config_path` (defaults when absent), loads its catalogs into a
/// fresh store and returns a resolver over it. Use [`bootstrap_global`] to
/// populate the process-wide store instead.
pub fn bootstrap(config_path: &Path) -> RuntimeResult<(MessageResolver, LoadReport)> {
    bootstrap_with_store(config_path, Arc::new(CatalogStore::default()))
}

/// Like [`bootstrap`], but loads into [`CatalogStore::global`], so every
/// resolver built over the global store sees the configured catalogs.
pub fn bootstrap_global(config_path: &Path) -> RuntimeResult<(MessageResolver, LoadReport)> {
    bootstrap_with_store(config_path, CatalogStore::global())
}

pub fn bootstrap_with_store(
    config_path: &Path,
    store: Arc<CatalogStore>,
) -> RuntimeResult<(MessageResolver, LoadReport)> {
    let config = load_config_or_default(config_path)?;
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    let report = load_from_config(&store, &config, base)?;
    let resolver = MessageResolver::new(store, config.resolver_options()?);
    Ok((resolver, report))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use tscat_core::LanguageTag;

    use super::{load_all, parse_sha256, read_catalog, sha256};
    use crate::config::CatalogSource;
    use crate::error::RuntimeError;
    use crate::store::CatalogStore;

    const KO: &str = "<TS language=\"ko_KR\"><context><name>AskPassphraseDialog</name>\
        <message><source>OK</source><translation>선택</translation></message>\
        </context></TS>";

    fn temp_dir(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        path.push(format!("tscat_{name}_{nanos}"));
        fs::create_dir_all(&path).expect("create dir");
        path
    }

    fn source(path: &str) -> CatalogSource {
        CatalogSource {
            path: PathBuf::from(path),
            locale: None,
            sha256: None,
        }
    }

    fn tag(value: &str) -> LanguageTag {
        LanguageTag::parse(value).expect("tag")
    }

    #[test]
    fn parses_prefixed_hash() {
        let bytes = parse_sha256(
            "sha256:000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
        )
        .expect("hash");
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[31], 0x1f);
        assert!(matches!(parse_sha256("sha256:abc"), Err(RuntimeError::InvalidHash)));
    }

    #[test]
    fn verifies_pinned_hash() {
        let dir = temp_dir("pin");
        fs::write(dir.join("ko.ts"), KO).expect("write");
        let mut pinned = source("ko.ts");
        pinned.sha256 = Some(format!("sha256:{}", hex::encode(sha256(KO.as_bytes()))));
        let parsed = read_catalog(&pinned, &dir).expect("catalog");
        assert_eq!(parsed.catalog.locale().normalized(), "ko_KR");

        pinned.sha256 = Some(format!("sha256:{}", hex::encode([0u8; 32])));
        let err = read_catalog(&pinned, &dir).expect_err("mismatch");
        assert!(matches!(err, RuntimeError::HashMismatch(_)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn locale_override_applies() {
        let dir = temp_dir("override");
        fs::write(dir.join("ko.ts"), KO).expect("write");
        let mut overridden = source("ko.ts");
        overridden.locale = Some("ko".to_string());
        let parsed = read_catalog(&overridden, &dir).expect("catalog");
        assert_eq!(parsed.catalog.locale().normalized(), "ko");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_catalog_keeps_previous_and_spares_others() {
        let dir = temp_dir("load_all");
        fs::write(dir.join("ko.ts"), KO).expect("write");
        fs::write(
            dir.join("fr.ts"),
            "<TS language=\"fr\"><context><name>Ctx</name></context></TS>",
        )
        .expect("write");
        let store = CatalogStore::new(tag("ko_KR"));
        let report = load_all(&store, &[source("ko.ts"), source("fr.ts")], &dir);
        assert!(report.is_clean());
        assert_eq!(report.loaded.len(), 2);

        fs::write(dir.join("ko.ts"), "<TS language=\"ko_KR\"><context>").expect("write");
        let report = load_all(
            &store,
            &[source("ko.ts"), source("missing.ts"), source("fr.ts")],
            &dir,
        );
        assert_eq!(report.loaded, [tag("fr")]);
        assert_eq!(report.failed.len(), 2);
        assert!(matches!(report.failed[0].error, RuntimeError::Parse(_)));
        assert!(matches!(report.failed[1].error, RuntimeError::Io(_)));
        let kept = store.get(&tag("ko_KR")).expect("previous catalog");
        assert!(kept.lookup("AskPassphraseDialog", "OK", None).is_some());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn later_source_wins_for_the_same_locale() {
        let dir = temp_dir("same_locale");
        let mut slow = String::from("<TS language=\"ko_KR\"><context><name>Bulk</name>");
        for index in 0..20_000 {
            slow.push_str(&format!(
                "<message><source>m{index}</source><translation>t{index}</translation></message>"
            ));
        }
        slow.push_str(
            "</context><context><name>Ctx</name><message><source>Which</source>\
             <translation>first</translation></message></context></TS>",
        );
        fs::write(dir.join("a.ts"), slow).expect("write");
        fs::write(
            dir.join("b.ts"),
            "<TS language=\"ko\"><context><name>Ctx</name><message><source>Which</source>\
             <translation>second</translation></message></context></TS>",
        )
        .expect("write");
        let mut second = source("b.ts");
        second.locale = Some("ko_KR".to_string());

        for _ in 0..5 {
            let store = CatalogStore::new(tag("ko_KR"));
            let report = load_all(&store, &[source("a.ts"), second.clone()], &dir);
            assert_eq!(report.loaded, [tag("ko_KR"), tag("ko_KR")]);
            let catalog = store.get(&tag("ko_KR")).expect("catalog");
            let entry = catalog.lookup("Ctx", "Which", None).expect("entry");
            assert_eq!(
                entry.translation().templates().first().map(String::as_str),
                Some("second")
            );

            let store = CatalogStore::new(tag("ko_KR"));
            load_all(&store, &[second.clone(), source("a.ts")], &dir);
            let catalog = store.get(&tag("ko_KR")).expect("catalog");
            let entry = catalog.lookup("Ctx", "Which", None).expect("entry");
            assert_eq!(
                entry.translation().templates().first().map(String::as_str),
                Some("first")
            );
        }
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn absolute_paths_ignore_base() {
        let dir = temp_dir("absolute");
        let path = dir.join("ko.ts");
        fs::write(&path, KO).expect("write");
        let absolute = CatalogSource {
            path,
            locale: None,
            sha256: None,
        };
        let parsed = read_catalog(&absolute, Path::new("/nonexistent")).expect("catalog");
        assert_eq!(parsed.catalog.message_count(), 1);
        fs::remove_dir_all(&dir).ok();
    }
}
