//! Operations behind the `tether` commands. Each `ops_*` module owns one
//! command; the helpers here load the project and drive a resolution.

pub mod ops_lock;
pub mod ops_tree;
pub mod ops_update;
pub mod ops_verify;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tether_core::lockfile::{Lockfile, LOCKFILE_NAME};
use tether_core::manifest::Manifest;
use tether_core::MANIFEST_NAME;
use tether_index::IndexRegistry;
use tether_resolver::lock::{from_resolution, preferred_versions};
use tether_resolver::{Registry, Resolution, Resolver, SemanticVersion, VersionConstraint};
use tether_util::errors::TetherError;

/// A project directory: its manifest and where its lockfile lives.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub manifest: Manifest,
}

impl Project {
    /// Load `Tether.toml` from `root`.
    pub fn load(root: &Path) -> miette::Result<Self> {
        let manifest = Manifest::from_path(&root.join(MANIFEST_NAME))?;
        Ok(Self {
            root: root.to_path_buf(),
            manifest,
        })
    }

    pub fn lockfile_path(&self) -> PathBuf {
        self.root.join(LOCKFILE_NAME)
    }

    /// The existing lockfile, if there is a readable one.
    ///
    /// An unreadable lockfile is treated as absent so that `lock` and
    /// `update` can replace it.
    pub fn existing_lockfile(&self) -> Option<Lockfile> {
        let path = self.lockfile_path();
        if !path.is_file() {
            return None;
        }
        match Lockfile::load(&path) {
            Ok(lockfile) => Some(lockfile),
            Err(e) => {
                tracing::warn!("Ignoring unreadable {}: {e}", path.display());
                None
            }
        }
    }

    /// A resolver seeded with the manifest's direct dependencies.
    pub fn resolver(&self) -> miette::Result<Resolver> {
        let root = &self.manifest.package.name;
        let mut resolver = Resolver::new().with_root(root);
        for (name, text) in &self.manifest.dependencies {
            let constraint = VersionConstraint::parse(text).map_err(|e| TetherError::Manifest {
                message: format!("dependency '{name}': {e}"),
            })?;
            resolver.add_dependency(root, name, constraint);
        }
        Ok(resolver)
    }

    /// Resolve the manifest against `registry`, preferring `preferred` versions.
    pub fn resolve<R: Registry + ?Sized>(
        &self,
        registry: &R,
        preferred: BTreeMap<String, SemanticVersion>,
    ) -> miette::Result<Resolution> {
        let resolution = self.resolver()?.prefer(preferred).resolve(registry)?;
        Ok(resolution)
    }

    /// Materialise `resolution` as a lockfile stamped with the manifest digest.
    pub fn lockfile_for<R: Registry + ?Sized>(
        &self,
        resolution: &Resolution,
        registry: &R,
    ) -> miette::Result<Lockfile> {
        let lockfile = from_resolution(resolution, registry, Some(self.manifest.digest()))?;
        Ok(lockfile)
    }
}

/// Open the package index at `path`.
pub fn open_index(path: &Path) -> miette::Result<IndexRegistry> {
    IndexRegistry::open(path).map_err(|e| {
        TetherError::Registry {
            message: e.to_string(),
        }
        .into()
    })
}

/// Locked versions of `lockfile` as resolver preferences.
pub fn locked_preferences(lockfile: &Lockfile) -> miette::Result<BTreeMap<String, SemanticVersion>> {
    preferred_versions(lockfile).map_err(|e| {
        TetherError::Lockfile {
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolver_rejects_bad_constraint() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(MANIFEST_NAME),
            "[package]\nname = \"app\"\nversion = \"0.1.0\"\n\n[dependencies]\nfoo = \"^1.x\"\n",
        )
        .unwrap();
        let project = Project::load(tmp.path()).unwrap();
        let err = project.resolver().unwrap_err();
        assert!(err.to_string().contains("Manifest error"));
    }

    #[test]
    fn missing_lockfile_is_none() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(MANIFEST_NAME),
            "[package]\nname = \"app\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        let project = Project::load(tmp.path()).unwrap();
        assert!(project.existing_lockfile().is_none());
    }
}
