//! Loading an index directory into a [`Registry`].

use std::path::{Path, PathBuf};

use tether_resolver::error::RegistryError;
use tether_resolver::registry::{DependencyList, MemoryRegistry, PackageMetadata, Registry};
use tether_resolver::version::{SemanticVersion, VersionConstraint};
use tether_util::hash::integrity_string;

use crate::entry::{IndexConfig, PackageFile};

/// File name of the optional index-level settings file.
pub const INDEX_CONFIG_NAME: &str = "index.toml";

/// A registry loaded from a directory of `<name>.toml` files.
///
/// The whole index is read up front, so every later query sees the same
/// snapshot.
#[derive(Debug, Clone)]
pub struct IndexRegistry {
    root: PathBuf,
    packages: MemoryRegistry,
}

impl IndexRegistry {
    /// Load every package file in `dir`.
    pub fn open(dir: &Path) -> Result<Self, RegistryError> {
        if !dir.is_dir() {
            return Err(index_error(dir, "index directory does not exist"));
        }

        let config = read_config(dir)?;
        let url = config
            .url
            .unwrap_or_else(|| format!("file://{}", dir.display()));
        let mut packages = MemoryRegistry::new(&url);

        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| index_error(dir, &e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "toml"))
            .filter(|p| p.file_name().is_some_and(|n| n != INDEX_CONFIG_NAME))
            .collect();
        files.sort();

        for file in &files {
            load_package(file, &mut packages)?;
        }

        tracing::debug!("Loaded {} packages from {}", files.len(), dir.display());
        Ok(Self {
            root: dir.to_path_buf(),
            packages,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url(&self) -> &str {
        self.packages.url()
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.package_names()
    }
}

fn index_error(path: &Path, message: &str) -> RegistryError {
    RegistryError::Index {
        message: format!("{}: {message}", path.display()),
    }
}

fn read_config(dir: &Path) -> Result<IndexConfig, RegistryError> {
    let path = dir.join(INDEX_CONFIG_NAME);
    if !path.is_file() {
        return Ok(IndexConfig::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|e| index_error(&path, &e.to_string()))?;
    toml::from_str(&content).map_err(|e| index_error(&path, &e.to_string()))
}

fn load_package(path: &Path, packages: &mut MemoryRegistry) -> Result<(), RegistryError> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| index_error(path, "package file name is not valid UTF-8"))?;
    let content = std::fs::read_to_string(path).map_err(|e| index_error(path, &e.to_string()))?;
    let file: PackageFile =
        toml::from_str(&content).map_err(|e| index_error(path, &e.to_string()))?;

    packages.declare(name);
    for entry in &file.versions {
        let version =
            SemanticVersion::parse(&entry.version).map_err(|e| index_error(path, &e.to_string()))?;

        if packages.versions(name)?.contains(&version) {
            return Err(index_error(
                path,
                &format!(
                    "{name} {version} is listed more than once (from '{}')",
                    entry.version
                ),
            ));
        }

        let mut dependencies: DependencyList = Vec::with_capacity(entry.dependencies.len());
        for (dep, text) in &entry.dependencies {
            let constraint = VersionConstraint::parse(text).map_err(|e| {
                index_error(path, &format!("{name} {version} dependency '{dep}': {e}"))
            })?;
            dependencies.push((dep.clone(), constraint));
        }

        let source = entry
            .source_override()
            .map_err(|e| index_error(path, &format!("{name} {version}: {e}")))?;

        packages.publish(name, version, dependencies);
        if let Some(checksum) = &entry.checksum {
            packages.set_integrity(name, &version, &normalize_checksum(checksum));
        }
        if let Some(source) = source {
            packages.set_source(name, &version, source);
        }
    }
    Ok(())
}

/// Bare hex digests are taken to be SHA-256.
fn normalize_checksum(checksum: &str) -> String {
    let checksum = checksum.trim();
    if checksum.contains('-') {
        checksum.to_string()
    } else {
        integrity_string(checksum)
    }
}

impl Registry for IndexRegistry {
    fn latest_version(&self, name: &str) -> Result<SemanticVersion, RegistryError> {
        self.packages.latest_version(name)
    }

    fn versions(&self, name: &str) -> Result<Vec<SemanticVersion>, RegistryError> {
        self.packages.versions(name)
    }

    fn dependencies(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> Result<DependencyList, RegistryError> {
        self.packages.dependencies(name, version)
    }

    fn metadata(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> Result<PackageMetadata, RegistryError> {
        self.packages.metadata(name, version)
    }
}
