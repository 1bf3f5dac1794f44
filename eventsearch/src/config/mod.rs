//! Configuration management for eventsearch
//!
//! Default config location: ./eventsearch.toml

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::query::{AutocompleteConfig, RelevanceConfig};
use crate::schema::AnalysisConfig;

pub const DEFAULT_CONFIG_FILE: &str = "eventsearch.toml";

pub const ENV_BACKEND_URL: &str = "EVENTSEARCH_BACKEND_URL";
pub const ENV_INDEX: &str = "EVENTSEARCH_INDEX";
pub const ENV_GEOCODE_API_KEY: &str = "EVENTSEARCH_GEOCODE_API_KEY";

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub relevance: RelevanceConfig,
    #[serde(default)]
    pub autocomplete: AutocompleteConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_backend_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index() -> String {
    "event_test".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            index: default_index(),
            timeout_ms: default_timeout_ms(),
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocode_endpoint")]
    pub endpoint: String,
    /// Never written by `save` so a key from the environment does not leak to disk
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_geocode_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

fn default_concurrency() -> usize {
    4
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocode_endpoint(),
            api_key: None,
            concurrency: default_concurrency(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
        Ok(home.join(rest))
    } else if s == "~" {
        dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))
    } else {
        Ok(path.to_path_buf())
    }
}

impl Config {
    /// Load config from an existing file
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", config_path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file path, or create default
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            let config = Config::default();
            if let Err(e) = config.save(config_path) {
                tracing::warn!("Could not write default config to {}: {}", config_path.display(), e);
            }
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply `EVENTSEARCH_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BACKEND_URL) {
            self.backend.url = url;
        }
        if let Some(index) = get(ENV_INDEX) {
            self.backend.index = index;
        }
        if let Some(key) = get(ENV_GEOCODE_API_KEY) {
            self.geocoding.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.index.trim().is_empty() {
            bail!("backend.index must not be empty");
        }
        if self.backend.username.is_some() != self.backend.password.is_some() {
            bail!("backend.username and backend.password must be set together");
        }
        if self.geocoding.concurrency == 0 {
            bail!("geocoding.concurrency must be at least 1");
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            bail!("logging.format must be \"pretty\" or \"json\", got {:?}", self.logging.format);
        }
        self.relevance.validate().map_err(|e| anyhow!("{}", e))?;
        if self.autocomplete.size == 0 {
            bail!("autocomplete.size must be at least 1");
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.url, "http://localhost:9200");
        assert_eq!(config.backend.index, "event_test");
        assert_eq!(config.geocoding.concurrency, 4);
        assert!(config.geocoding.api_key.is_none());
        assert_eq!(config.logging.format, "pretty");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            index = "events_staging"

            [relevance]
            name_boost = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.index, "events_staging");
        assert_eq!(config.backend.url, "http://localhost:9200");
        assert_eq!(config.relevance.name_boost, 3.0);
        assert_eq!(config.relevance.tags_boost, 1.0);
        assert_eq!(config.autocomplete.size, 5);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BACKEND_URL, "http://search:9200"),
            (ENV_INDEX, ""),
            (ENV_GEOCODE_API_KEY, "from-env"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.backend.url, "http://search:9200");
        assert_eq!(config.backend.index, "event_test");
        assert_eq!(config.geocoding.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = Config::default();
        config.geocoding.api_key = Some("secret".to_string());
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(!toml.contains("secret"));
    }

    #[test]
    fn test_validate_rejects_half_credentials() {
        let mut config = Config::default();
        config.backend.username = Some("elastic".to_string());
        assert!(config.validate().is_err());
    }
}
