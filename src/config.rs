//! Configuration management for the stream-watcher client

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Watch loop configuration
    #[serde(default)]
    pub watch: WatchConfig,

    /// Local state storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Path to config file (not serialized)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// Base URL of the stream-watcher backend (e.g. "https://example.com/api")
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// How often to fetch fresh video data from the backend (seconds)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// How often to re-render the list so relative-time labels stay current (seconds)
    #[serde(default = "default_render_interval")]
    pub render_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Directory for the tracked-channel state file.
    /// Defaults to the platform data directory when unset.
    pub state_directory: Option<PathBuf>,
}

// Default value functions
fn default_refresh_interval() -> u64 {
    300 // 5 minutes between backend fetches
}

fn default_render_interval() -> u64 {
    60 // 1 minute between re-renders
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            render_interval_secs: default_render_interval(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            watch: WatchConfig::default(),
            storage: StorageConfig::default(),
            config_path: None,
        }
    }
}

impl Config {
    /// Load configuration from default location or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let mut config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

            config.config_path = Some(config_path);
            Ok(config)
        } else {
            // Create default config
            let mut config = Config::default();
            config.config_path = Some(config_path);
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = match &self.config_path {
            Some(path) => path.clone(),
            None => Self::default_config_path()?,
        };

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Get the config file path
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Self::default_config_path(),
        }
    }

    /// Get default config path
    fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = directories::ProjectDirs::from("dev", "stream-watcher", "stream-watcher")
            .context("Failed to determine config directory")?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Directory holding the tracked-channel state file
    pub fn state_directory(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.state_directory {
            return Ok(dir.clone());
        }

        let proj_dirs = directories::ProjectDirs::from("dev", "stream-watcher", "stream-watcher")
            .context("Failed to determine data directory")?;

        Ok(proj_dirs.data_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.watch.refresh_interval_secs, 300);
        assert_eq!(parsed.watch.render_interval_secs, 60);
        assert!(parsed.api.endpoint.is_none());
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let parsed: Config =
            toml::from_str("[api]\nendpoint = \"http://localhost:8080\"\n").unwrap();
        assert_eq!(parsed.api.endpoint.as_deref(), Some("http://localhost:8080"));
        assert_eq!(parsed.watch.refresh_interval_secs, 300);
    }
}
