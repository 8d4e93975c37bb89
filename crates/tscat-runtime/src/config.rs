use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tscat_core::LanguageTag;

use crate::error::{RuntimeError, RuntimeResult};
use crate::resolver::ResolverOptions;

/// Engine settings, usually read from `tscat.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub active_locale: String,
    pub strict_mode: bool,
    pub include_unfinished: bool,
    pub fallback_locales: Vec<String>,
    #[serde(rename = "catalog")]
    pub catalogs: Vec<CatalogSource>,
}

/// One `[[catalog]]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CatalogSource {
    pub path: PathBuf,
    /// Overrides the document's `language` attribute.
    pub locale: Option<String>,
    /// `sha256:<hex>` pin checked before parsing.
    pub sha256: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            active_locale: "en".to_string(),
            strict_mode: false,
            include_unfinished: true,
            fallback_locales: Vec::new(),
            catalogs: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn active_locale(&self) -> RuntimeResult<LanguageTag> {
        parse_locale(&self.active_locale)
    }

    pub fn resolver_options(&self) -> RuntimeResult<ResolverOptions> {
        let fallback_locales = self
            .fallback_locales
            .iter()
            .map(|locale| parse_locale(locale))
            .collect::<RuntimeResult<Vec<_>>>()?;
        Ok(ResolverOptions {
            strict_mode: self.strict_mode,
            include_unfinished: self.include_unfinished,
            fallback_locales,
        })
    }
}

pub(crate) fn parse_locale(value: &str) -> RuntimeResult<LanguageTag> {
    LanguageTag::parse(value).map_err(|_| RuntimeError::InvalidLocale(value.to_string()))
}

pub fn load_config(path: &Path) -> RuntimeResult<EngineConfig> {
    let contents = fs::read_to_string(path)?;
    let config = toml::from_str(&contents)?;
    Ok(config)
}

pub fn load_config_or_default(path: &Path) -> RuntimeResult<EngineConfig> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineConfig, load_config_or_default};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        path.push(format!("tscat_{name}_{nanos}.toml"));
        path
    }

    #[test]
    fn uses_default_when_missing() {
        let path = temp_path("missing");
        let config = load_config_or_default(&path).expect("config");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.active_locale, "en");
        assert!(config.include_unfinished);
    }

    #[test]
    fn loads_from_file() {
        let path = temp_path("config");
        let contents = r#"
active_locale = "ko_KR"
strict_mode = true
fallback_locales = ["en"]

[[catalog]]
path = "locale/wallet_ko_KR.ts"

[[catalog]]
path = "locale/wallet_fr.ts"
locale = "fr"
sha256 = "sha256:000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
"#;
        fs::write(&path, contents).expect("write");
        let config = load_config_or_default(&path).expect("config");
        assert_eq!(config.active_locale, "ko_KR");
        assert!(config.strict_mode);
        assert!(config.include_unfinished);
        assert_eq!(config.catalogs.len(), 2);
        assert_eq!(config.catalogs[1].locale.as_deref(), Some("fr"));
        assert!(config.catalogs[0].sha256.is_none());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn resolver_options_parse_fallbacks() {
        let config = EngineConfig {
            fallback_locales: vec!["en-US".to_string()],
            ..EngineConfig::default()
        };
        let options = config.resolver_options().expect("options");
        assert_eq!(options.fallback_locales[0].normalized(), "en_US");
        assert!(!options.strict_mode);
    }

    #[test]
    fn rejects_invalid_locale() {
        let config = EngineConfig {
            active_locale: "1".to_string(),
            ..EngineConfig::default()
        };
        assert!(config.active_locale().is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        let path = temp_path("broken");
        fs::write(&path, "active_locale = [").expect("write");
        assert!(load_config_or_default(&path).is_err());
        fs::remove_file(&path).ok();
    }
}
