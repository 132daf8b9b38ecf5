//! The registry collaborator interface and an in-memory implementation.

use std::collections::BTreeMap;

use tether_core::lockfile::Source;

use crate::error::RegistryError;
use crate::version::{SemanticVersion, VersionConstraint};

/// A package's declared dependencies as reported by a registry.
pub type DependencyList = Vec<(String, VersionConstraint)>;

/// Registry-supplied lockfile metadata for one package version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Canonical locator of the package contents.
    pub resolved: String,
    /// Checksum in `sha256-<hex>` form, when the registry publishes one.
    pub integrity: Option<String>,
    pub source: Source,
}

/// Read-only view of a package registry.
///
/// The resolver treats every call as an atomic, consistent snapshot and never
/// retries or suppresses failures.
pub trait Registry {
    /// Newest published version of a package.
    fn latest_version(&self, name: &str) -> Result<SemanticVersion, RegistryError>;

    /// Every published version of a package, in any order.
    fn versions(&self, name: &str) -> Result<Vec<SemanticVersion>, RegistryError>;

    /// Declared dependencies of one version. Leaf packages return an empty list.
    fn dependencies(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> Result<DependencyList, RegistryError>;

    /// Source and checksum metadata recorded in the lockfile.
    fn metadata(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> Result<PackageMetadata, RegistryError> {
        Ok(PackageMetadata {
            resolved: format!("{name}@{version}"),
            integrity: None,
            source: Source::Registry {
                url: DEFAULT_REGISTRY_URL.to_string(),
            },
        })
    }
}

/// Source URL used by registries that do not report their own.
pub const DEFAULT_REGISTRY_URL: &str = "memory://registry";

#[derive(Debug, Clone)]
struct PublishedVersion {
    dependencies: DependencyList,
    integrity: Option<String>,
    source: Option<Source>,
}

/// A registry held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryRegistry {
    url: String,
    packages: BTreeMap<String, BTreeMap<SemanticVersion, PublishedVersion>>,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

impl MemoryRegistry {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            packages: BTreeMap::new(),
        }
    }

    /// Publish a version with its dependencies. Re-publishing replaces it.
    pub fn publish(&mut self, name: &str, version: SemanticVersion, dependencies: DependencyList) {
        self.packages.entry(name.to_string()).or_default().insert(
            version,
            PublishedVersion {
                dependencies,
                integrity: None,
                source: None,
            },
        );
    }

    /// Attach a checksum to an already published version.
    pub fn set_integrity(&mut self, name: &str, version: &SemanticVersion, integrity: &str) {
        if let Some(published) = self.published_mut(name, version) {
            published.integrity = Some(integrity.to_string());
        }
    }

    /// Override where an already published version is fetched from.
    pub fn set_source(&mut self, name: &str, version: &SemanticVersion, source: Source) {
        if let Some(published) = self.published_mut(name, version) {
            published.source = Some(source);
        }
    }

    /// Register a package name with no versions.
    pub fn declare(&mut self, name: &str) {
        self.packages.entry(name.to_string()).or_default();
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    fn published_mut(
        &mut self,
        name: &str,
        version: &SemanticVersion,
    ) -> Option<&mut PublishedVersion> {
        self.packages.get_mut(name)?.get_mut(version)
    }

    fn published(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> Result<&PublishedVersion, RegistryError> {
        self.package(name)?
            .get(version)
            .ok_or_else(|| RegistryError::VersionNotFound {
                name: name.to_string(),
                version: version.to_string(),
            })
    }

    fn package(
        &self,
        name: &str,
    ) -> Result<&BTreeMap<SemanticVersion, PublishedVersion>, RegistryError> {
        self.packages
            .get(name)
            .ok_or_else(|| RegistryError::PackageNotFound {
                name: name.to_string(),
            })
    }
}

impl Registry for MemoryRegistry {
    fn latest_version(&self, name: &str) -> Result<SemanticVersion, RegistryError> {
        self.package(name)?
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| RegistryError::NoVersionsAvailable {
                name: name.to_string(),
            })
    }

    fn versions(&self, name: &str) -> Result<Vec<SemanticVersion>, RegistryError> {
        Ok(self.package(name)?.keys().copied().collect())
    }

    fn dependencies(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> Result<DependencyList, RegistryError> {
        Ok(self.published(name, version)?.dependencies.clone())
    }

    fn metadata(
        &self,
        name: &str,
        version: &SemanticVersion,
    ) -> Result<PackageMetadata, RegistryError> {
        let published = self.published(name, version)?;
        let source = published.source.clone().unwrap_or_else(|| Source::Registry {
            url: self.url.clone(),
        });
        let resolved = match &source {
            Source::Registry { .. } => format!("{name}@{version}"),
            Source::Git { url, commit } => format!("{url}#{commit}"),
            Source::Path { path } => path.clone(),
            Source::Url { url } => url.clone(),
        };
        Ok(PackageMetadata {
            resolved,
            integrity: published.integrity.clone(),
            source,
        })
    }
}
