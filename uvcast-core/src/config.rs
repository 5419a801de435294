use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::Coordinate;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const DEFAULT_LANG: &str = "tr";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "UVCAST_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// lang = "tr"
///
/// [fallback_location]
/// latitude = 41.01
/// longitude = 28.97
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Language of condition texts returned by the endpoint.
    pub lang: String,

    pub base_url: String,

    pub refresh_interval_secs: u64,

    /// Position used as the device fix on machines without a location service.
    pub fallback_location: Option<Coordinate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            lang: DEFAULT_LANG.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            fallback_location: None,
        }
    }
}

impl Config {
    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `uvcast configure` or set {API_KEY_ENV}."
            )
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// File holding the persisted key-value entries (saved places, first-launch flag).
    pub fn data_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("storage.json"))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "uvcast", "uvcast")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_public_endpoint_contract() {
        let cfg = Config::default();
        assert_eq!(cfg.lang, "tr");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(300));
        assert!(cfg.fallback_location.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"

            [fallback_location]
            latitude = 41.01
            longitude = 28.97
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.lang, DEFAULT_LANG);
        assert_eq!(cfg.fallback_location, Some(Coordinate::new(41.01, 28.97)));
    }

    #[test]
    fn toml_roundtrip_preserves_settings() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            lang: "en".into(),
            refresh_interval_secs: 60,
            ..Config::default()
        };

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let back = Config::from_toml(&text).expect("parse");
        assert_eq!(back.lang, "en");
        assert_eq!(back.refresh_interval_secs, 60);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let cfg = Config { refresh_interval_secs: 0, ..Config::default() };
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(1));
    }
}
