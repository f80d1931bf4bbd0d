//! Engine configuration and document loading
//!
//! Configuration documents may be written in TOML, YAML or JSON; the format is
//! picked from the file extension. Environment variables prefixed with
//! `FIELDWISE_` override values loaded from files.
//!
//! Copyright (c) 2025 Fieldwise Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_CACHE_ENABLED: &str = "FIELDWISE_SCHEMA_CACHE_ENABLED";
pub const ENV_CACHE_MAX_ENTRIES: &str = "FIELDWISE_SCHEMA_CACHE_MAX_ENTRIES";
pub const ENV_CACHE_TTL_SECS: &str = "FIELDWISE_SCHEMA_CACHE_TTL_SECS";

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub schema_cache: SchemaCacheConfig,
}

/// Configuration for the schema cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaCacheConfig {
    /// Whether to cache schemas at all
    pub enabled: bool,
    /// Maximum number of cached types
    pub max_entries: usize,
    /// Time-to-live for an entry; `None` keeps entries until evicted
    pub ttl_secs: Option<u64>,
}

impl Default for SchemaCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1000,
            ttl_secs: Some(3600), // 1 hour
        }
    }
}

impl SchemaCacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl EngineConfig {
    /// Load configuration from a file, detecting the format from its extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        load_document(path.as_ref())
    }

    /// Load configuration from a file, then layer `FIELDWISE_*` overrides on top
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path.as_ref(), |key| std::env::var(key).ok())
    }

    fn load_with(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_document(content, Format::Toml)
    }

    /// Apply `FIELDWISE_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(ENV_CACHE_ENABLED) {
            self.schema_cache.enabled = parse_env(ENV_CACHE_ENABLED, &value)?;
        }
        if let Some(value) = lookup(ENV_CACHE_MAX_ENTRIES) {
            self.schema_cache.max_entries = parse_env(ENV_CACHE_MAX_ENTRIES, &value)?;
        }
        if let Some(value) = lookup(ENV_CACHE_TTL_SECS) {
            // "none" disables expiry
            self.schema_cache.ttl_secs = if value.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_env(ENV_CACHE_TTL_SECS, &value)?)
            };
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse::<T>().map_err(|e| {
        Error::configuration(
            format!("Invalid value '{value}' for {key}"),
            Some(anyhow::Error::new(e)),
        )
    })
}

/// Supported configuration document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(Format::Toml),
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(Error::configuration(
                format!(
                    "Unsupported file format for '{}'. Expected .toml, .yaml, .yml, or .json",
                    path.display()
                ),
                None,
            )),
        }
    }
}

/// Read and deserialize a configuration document
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::configuration(
            format!("Failed to read file '{}'", path.display()),
            Some(e.into()),
        )
    })?;

    tracing::debug!(path = %path.display(), ?format, "loading configuration document");
    parse_document(&content, format).map_err(|e| match e {
        Error::Configuration { message, source } => Error::Configuration {
            message: format!("{message} in '{}'", path.display()),
            source,
        },
        other => other,
    })
}

/// Deserialize a configuration document with an explicit format
pub fn parse_document<T: DeserializeOwned>(content: &str, format: Format) -> Result<T> {
    let parsed = match format {
        Format::Toml => toml::from_str(content).map_err(anyhow::Error::new),
        Format::Yaml => serde_yaml::from_str(content).map_err(anyhow::Error::new),
        Format::Json => serde_json::from_str(content).map_err(anyhow::Error::new),
    };

    parsed.map_err(|e| Error::configuration(format!("Failed to parse {format:?} document"), Some(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.schema_cache.enabled);
        assert_eq!(config.schema_cache.max_entries, 1000);
        assert_eq!(config.schema_cache.ttl(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = EngineConfig::from_toml_str(
            r#"
            [schema_cache]
            max_entries = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.schema_cache.max_entries, 16);
        assert!(config.schema_cache.enabled);
        assert_eq!(config.schema_cache.ttl_secs, Some(3600));
    }

    #[test]
    fn test_from_file_formats() {
        let dir = tempdir().unwrap();

        let yaml = dir.path().join("engine.yaml");
        fs::write(&yaml, "schema_cache:\n  enabled: false\n").unwrap();
        assert!(!EngineConfig::from_file(&yaml).unwrap().schema_cache.enabled);

        let json = dir.path().join("engine.json");
        fs::write(&json, r#"{"schema_cache": {"ttl_secs": null}}"#).unwrap();
        assert_eq!(EngineConfig::from_file(&json).unwrap().schema_cache.ttl_secs, None);
    }

    #[test]
    fn test_unsupported_format() {
        let err = EngineConfig::from_file("engine.ini").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_parse_error_mentions_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "schema_cache = [").unwrap();

        match EngineConfig::from_file(&path).unwrap_err() {
            Error::Configuration { message, source } => {
                assert!(message.contains("broken.toml"));
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_CACHE_ENABLED, "false"),
            (ENV_CACHE_MAX_ENTRIES, "42"),
            (ENV_CACHE_TTL_SECS, "none"),
        ]);
        let mut config = EngineConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert!(!config.schema_cache.enabled);
        assert_eq!(config.schema_cache.max_entries, 42);
        assert_eq!(config.schema_cache.ttl_secs, None);
    }

    #[test]
    fn test_load_layers_overrides_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "[schema_cache]\nenabled = false\nmax_entries = 8\n").unwrap();

        let config = EngineConfig::load_with(&path, |key| {
            (key == ENV_CACHE_MAX_ENTRIES).then(|| "64".to_string())
        })
        .unwrap();

        assert!(!config.schema_cache.enabled);
        assert_eq!(config.schema_cache.max_entries, 64);
        assert_eq!(config.schema_cache.ttl_secs, Some(3600));
    }

    #[test]
    fn test_load_rejects_bad_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, "{}").unwrap();

        let err = EngineConfig::load_with(&path, |key| {
            (key == ENV_CACHE_ENABLED).then(|| "sometimes".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains(ENV_CACHE_ENABLED));
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_CACHE_MAX_ENTRIES).then(|| "lots".to_string()))
            .unwrap_err();

        assert!(err.to_string().contains("Configuration error"));
    }
}
