use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use tether_util::errors::TetherError;
use tether_util::hash::sha256_bytes;

/// The parsed representation of a `Tether.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub package: PackageMetadata,

    /// Direct dependencies: package name to constraint text (e.g. `"^1.0.0"`).
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

/// Package identity and metadata from the `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub license: Option<String>,
}

impl Manifest {
    /// Load and parse a `Tether.toml` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TetherError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_str(&content)
    }

    /// Parse a `Tether.toml` from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> miette::Result<Self> {
        let manifest: Manifest = toml::from_str(content).map_err(|e| TetherError::Manifest {
            message: format!("Failed to parse Tether.toml: {e}"),
        })?;
        if manifest.package.name.trim().is_empty() {
            return Err(TetherError::Manifest {
                message: "package.name must not be empty".to_string(),
            }
            .into());
        }
        if manifest.dependencies.contains_key(&manifest.package.name) {
            return Err(TetherError::Manifest {
                message: format!(
                    "package '{}' cannot depend on itself",
                    manifest.package.name
                ),
            }
            .into());
        }
        Ok(manifest)
    }

    /// Fingerprint of everything that influences resolution: the package name
    /// and the dependency declarations. Metadata such as the description does
    /// not participate, so editing it keeps an existing lockfile fresh.
    pub fn digest(&self) -> String {
        let mut text = format!("package={}\n", self.package.name);
        for (name, constraint) in &self.dependencies {
            text.push_str(&format!("{name}={}\n", constraint.trim()));
        }
        sha256_bytes(text.as_bytes())
    }
}
