use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tether_util::errors::TetherError;

/// Global user configuration loaded from `~/.tether/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Package index settings from `[registry]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding the TOML package index.
    #[serde(default)]
    pub index: Option<PathBuf>,
}

/// Resolver behaviour from `[resolver]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Keep versions from an existing lockfile when they still satisfy the
    /// manifest, instead of jumping to the newest compatible release.
    #[serde(default = "default_prefer_locked", rename = "prefer-locked")]
    pub prefer_locked: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefer_locked: default_prefer_locked(),
        }
    }
}

fn default_prefer_locked() -> bool {
    true
}

impl GlobalConfig {
    /// Load the global configuration from `~/.tether/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            tracing::debug!("No global config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| TetherError::Config {
            message: format!("Failed to read global config: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| {
            TetherError::Config {
                message: format!("Failed to parse global config: {e}"),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the Tether data directory (`~/.tether/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".tether")
}
