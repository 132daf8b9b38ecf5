//! The `Tether.lock` format.
//!
//! A lockfile is the durable snapshot of one successful resolution. It is
//! written as TOML with packages sorted by name and dependency maps stored as
//! `BTreeMap`s, so serialising an unchanged solution is byte-identical.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tether_util::errors::TetherError;

/// Current lockfile format version. Files declaring a newer version are rejected.
pub const LOCKFILE_VERSION: u32 = 1;

/// File name of the lockfile next to `Tether.toml`.
pub const LOCKFILE_NAME: &str = "Tether.lock";

/// Deterministic lockfile recording exact resolved dependency versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Lockfile {
    pub version: u32,
    /// Digest of the manifest this lockfile was resolved from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_digest: Option<String>,
    #[serde(default, rename = "package")]
    pub packages: Vec<LockedPackage>,
}

/// A single locked package with its source and checksum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    /// Canonical locator reported by the registry.
    pub resolved: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
    pub source: Source,
    /// Dependency name to the locked version of that dependency.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

/// Where a locked package comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Source {
    Registry { url: String },
    Git { url: String, commit: String },
    Path { path: String },
    Url { url: String },
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Registry { url } => write!(f, "registry+{url}"),
            Source::Git { url, commit } => write!(f, "git+{url}#{commit}"),
            Source::Path { path } => write!(f, "path+{path}"),
            Source::Url { url } => write!(f, "url+{url}"),
        }
    }
}

impl Lockfile {
    /// Build a lockfile from packages in any order.
    pub fn new(packages: Vec<LockedPackage>, manifest_digest: Option<String>) -> Self {
        let mut lockfile = Self {
            version: LOCKFILE_VERSION,
            manifest_digest,
            packages,
        };
        lockfile.normalize();
        lockfile
    }

    fn normalize(&mut self) {
        self.packages.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Render the lockfile as TOML.
    pub fn serialize(&self) -> miette::Result<String> {
        let mut sorted = self.clone();
        sorted.normalize();
        toml::to_string_pretty(&sorted).map_err(|e| {
            TetherError::Lockfile {
                message: format!("Failed to serialize lockfile: {e}"),
            }
            .into()
        })
    }

    /// Parse lockfile TOML, rejecting unknown format versions.
    pub fn deserialize(content: &str) -> miette::Result<Self> {
        let mut lockfile: Lockfile = toml::from_str(content).map_err(|e| TetherError::Lockfile {
            message: format!("Failed to parse lockfile: {e}"),
        })?;
        if lockfile.version == 0 || lockfile.version > LOCKFILE_VERSION {
            return Err(TetherError::Lockfile {
                message: format!(
                    "unsupported lockfile format version {} (this build understands up to {})",
                    lockfile.version, LOCKFILE_VERSION
                ),
            }
            .into());
        }
        lockfile.normalize();
        Ok(lockfile)
    }

    /// Load and parse a `Tether.lock` file from the given path.
    pub fn load(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TetherError::Lockfile {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::deserialize(&content)
    }

    /// Write the lockfile to `path`, replacing any previous contents atomically.
    pub fn save(&self, path: &Path) -> miette::Result<()> {
        let content = self.serialize()?;
        tether_util::fs::write_atomic(path, content.as_bytes()).map_err(|e| {
            TetherError::Lockfile {
                message: format!("Failed to write {}: {e}", path.display()),
            }
        })?;
        tracing::info!(
            "Wrote {} with {} packages",
            path.display(),
            self.packages.len()
        );
        Ok(())
    }

    /// Look up a locked package by name.
    pub fn find(&self, name: &str) -> Option<&LockedPackage> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Map of package name to locked version text.
    pub fn locked_versions(&self) -> BTreeMap<String, String> {
        self.packages
            .iter()
            .map(|p| (p.name.clone(), p.version.clone()))
            .collect()
    }

    /// Whether this lockfile was produced from a manifest with the given digest.
    pub fn is_fresh(&self, manifest_digest: &str) -> bool {
        self.manifest_digest.as_deref() == Some(manifest_digest)
    }

    /// Check internal consistency and return every problem found.
    ///
    /// A consistent lockfile names each package once, and every entry in a
    /// package's dependency map points at a locked package with that exact
    /// version.
    pub fn verify(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for pkg in &self.packages {
            if seen.insert(&pkg.name, &pkg.version).is_some() {
                problems.push(format!("package '{}' is locked more than once", pkg.name));
            }
        }
        for pkg in &self.packages {
            for (dep, version) in &pkg.dependencies {
                match seen.get(dep.as_str()) {
                    None => problems.push(format!(
                        "{}@{} depends on '{dep}', which is not locked",
                        pkg.name, pkg.version
                    )),
                    Some(locked) if *locked != version.as_str() => problems.push(format!(
                        "{}@{} expects {dep}@{version} but {dep}@{locked} is locked",
                        pkg.name, pkg.version
                    )),
                    Some(_) => {}
                }
            }
        }
        problems
    }
}
