use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use securitydb_market_data::ProviderSetting;

use crate::errors::{Error, Result};

/// One named database target.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Filesystem path of the SQLite database file.
    pub path: String,
}

/// Credentials and endpoint for one provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub api_key: String,
    #[serde(default)]
    pub url: String,
}

/// Application settings, loaded explicitly from a JSON file.
///
/// Nothing is read at import or construction time; callers decide when and
/// from where settings are loaded and get a typed error when the file is
/// missing or malformed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Database targets keyed by purpose, e.g. "daily" and "intraday".
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseSettings>,
    /// Provider credentials keyed by provider name, e.g. "AlphaVantage".
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigIO(format!("Cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            Error::InvalidConfigValue(format!("Cannot parse {}: {}", path.display(), e))
        })
    }

    /// Database settings for a named target.
    pub fn database(&self, name: &str) -> Result<&DatabaseSettings> {
        self.databases
            .get(name)
            .ok_or_else(|| Error::MissingConfigKey(format!("databases.{}", name)))
    }

    /// Provider settings in the shape the provider registry consumes.
    pub fn provider_settings(&self) -> Vec<ProviderSetting> {
        self.providers
            .iter()
            .map(|(name, p)| ProviderSetting {
                name: name.clone(),
                api_key: p.api_key.clone(),
                url: p.url.clone(),
            })
            .collect()
    }

    /// Names and URLs of all configured providers, for data-source rows.
    pub fn source_urls(&self) -> BTreeMap<String, String> {
        self.providers
            .iter()
            .map(|(name, p)| (name.clone(), p.url.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "databases": {
            "daily": { "path": "/var/lib/securitydb/daily.db" },
            "intraday": { "path": "/var/lib/securitydb/intraday.db" }
        },
        "providers": {
            "AlphaVantage": { "api_key": "demo", "url": "https://www.alphavantage.co" }
        }
    }"#;

    #[test]
    fn test_load_and_lookup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(
            settings.database("daily").unwrap().path,
            "/var/lib/securitydb/daily.db"
        );
        assert!(matches!(
            settings.database("weekly").unwrap_err(),
            Error::MissingConfigKey(key) if key == "databases.weekly"
        ));

        let providers = settings.provider_settings();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "AlphaVantage");
        assert_eq!(providers[0].api_key, "demo");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/nonexistent/settings.json").unwrap_err();
        assert!(matches!(err, Error::ConfigIO(_)));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue(_)));
    }
}
