//! Serde shapes of the index files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tether_core::lockfile::Source;

/// Contents of `index.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub url: Option<String>,
}

/// Contents of one `<name>.toml` package file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageFile {
    #[serde(default, rename = "version")]
    pub versions: Vec<VersionEntry>,
}

/// One published version of a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    #[serde(default)]
    pub checksum: Option<String>,
    /// Dependency name to constraint text.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub git: Option<GitLocation>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitLocation {
    pub url: String,
    pub commit: String,
}

impl VersionEntry {
    /// The source override declared by this entry, if any.
    ///
    /// Returns `Err` with the conflicting keys when more than one of `git`,
    /// `path`, and `url` is present.
    pub fn source_override(&self) -> Result<Option<Source>, String> {
        let mut sources = Vec::new();
        if let Some(git) = &self.git {
            sources.push(Source::Git {
                url: git.url.clone(),
                commit: git.commit.clone(),
            });
        }
        if let Some(path) = &self.path {
            sources.push(Source::Path { path: path.clone() });
        }
        if let Some(url) = &self.url {
            sources.push(Source::Url { url: url.clone() });
        }
        match sources.len() {
            0 => Ok(None),
            1 => Ok(sources.pop()),
            _ => Err("only one of `git`, `path`, or `url` may be set".to_string()),
        }
    }
}
