use crate::paths::{config_dir, default_destination, CONFIG_ENV, CONFIG_FILE, CONFIG_POINTER_FILE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing the config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key: {0}. Supported keys: {keys}", keys = Config::KEYS.join(", "))]
    UnknownKey(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Directory holding manifest templates and the `require` support manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_root: Option<String>,
    /// Directories packages are resolved from, in priority order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_roots: Option<Vec<String>>,
    /// Root of the generated manifest tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl Config {
    pub const KEYS: [&'static str; 3] = ["templates-root", "search-roots", "destination"];

    pub fn path() -> PathBuf {
        // Explicit override for tests and isolated runs
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        let dir = config_dir();
        let pointer = dir.join(CONFIG_POINTER_FILE);
        if let Ok(contents) = fs::read_to_string(&pointer) {
            let trimmed = contents.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        dir.join(CONFIG_FILE)
    }

    /// Location of the pointer file that redirects [`Config::path`].
    pub fn pointer_path() -> PathBuf {
        config_dir().join(CONFIG_POINTER_FILE)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path())
    }

    /// Load from `path`, returning an empty config if it does not exist
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::path())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "templates-root" => self.templates_root.clone(),
            "search-roots" => self.search_roots.as_ref().map(|roots| roots.join(",")),
            "destination" => self.destination.clone(),
            _ => None,
        }
    }

    /// Set `key`; `search-roots` takes a comma-separated list.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "templates-root" => self.templates_root = Some(value.to_string()),
            "search-roots" => {
                self.search_roots = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|root| !root.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
            "destination" => self.destination = Some(value.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.templates_root.is_none() && self.search_roots.is_none() && self.destination.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&str, String)> {
        Self::KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn templates_root_path(&self) -> Option<PathBuf> {
        self.templates_root.as_deref().map(PathBuf::from)
    }

    pub fn search_root_paths(&self) -> Vec<PathBuf> {
        self.search_roots
            .iter()
            .flatten()
            .map(PathBuf::from)
            .collect()
    }

    /// Configured destination, or the platform cache default.
    pub fn destination_path(&self) -> PathBuf {
        self.destination
            .as_deref()
            .map_or_else(default_destination, PathBuf::from)
    }
}
