//! Materialise a [`Resolution`] as a [`Lockfile`] and read one back as
//! version preferences.

use std::collections::BTreeMap;

use tether_core::lockfile::{LockedPackage, Lockfile};

use crate::error::{ResolveError, VersionError};
use crate::registry::Registry;
use crate::resolver::Resolution;
use crate::version::SemanticVersion;

/// Build a lockfile with one entry per resolved package.
///
/// `resolved`, `integrity`, and `source` are taken from the registry's
/// metadata rather than computed locally.
pub fn from_resolution<R: Registry + ?Sized>(
    resolution: &Resolution,
    registry: &R,
    manifest_digest: Option<String>,
) -> Result<Lockfile, ResolveError> {
    let chosen: BTreeMap<&str, SemanticVersion> = resolution
        .packages
        .iter()
        .map(|p| (p.name.as_str(), p.version))
        .collect();

    let mut packages = Vec::with_capacity(resolution.packages.len());
    for pkg in &resolution.packages {
        let meta = registry.metadata(&pkg.name, &pkg.version)?;
        let dependencies = pkg
            .dependencies
            .iter()
            .filter_map(|(dep, _)| {
                chosen
                    .get(dep.as_str())
                    .map(|v| (dep.clone(), v.to_string()))
            })
            .collect();
        packages.push(LockedPackage {
            name: pkg.name.clone(),
            version: pkg.version.to_string(),
            resolved: meta.resolved,
            integrity: meta.integrity,
            source: meta.source,
            dependencies,
        });
    }

    Ok(Lockfile::new(packages, manifest_digest))
}

/// Parse the locked versions of a lockfile for [`crate::resolver::Resolver::prefer`].
pub fn preferred_versions(lockfile: &Lockfile) -> Result<BTreeMap<String, SemanticVersion>, VersionError> {
    lockfile
        .packages
        .iter()
        .map(|p| SemanticVersion::parse(&p.version).map(|v| (p.name.clone(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use crate::resolver::Resolver;
    use crate::version::VersionConstraint;
    use tether_core::lockfile::Source;

    #[test]
    fn dependency_map_records_chosen_versions() {
        let mut reg = MemoryRegistry::new("https://registry.example");
        reg.publish(
            "foo",
            SemanticVersion::new(1, 0, 0),
            vec![("bar".into(), VersionConstraint::parse("^2.0.0").unwrap())],
        );
        reg.publish("bar", SemanticVersion::new(2, 4, 1), vec![]);
        reg.set_integrity("bar", &SemanticVersion::new(2, 4, 1), "sha256-bb");

        let mut resolver = Resolver::new().with_root("app");
        resolver.add_dependency("app", "foo", VersionConstraint::parse("1.0.0").unwrap());
        let resolution = resolver.resolve(&reg).unwrap();
        let lockfile = from_resolution(&resolution, &reg, Some("d".into())).unwrap();

        assert_eq!(lockfile.packages.len(), 2);
        let foo = lockfile.find("foo").unwrap();
        assert_eq!(foo.dependencies.get("bar").map(String::as_str), Some("2.4.1"));
        let bar = lockfile.find("bar").unwrap();
        assert_eq!(bar.integrity.as_deref(), Some("sha256-bb"));
        assert_eq!(
            bar.source,
            Source::Registry {
                url: "https://registry.example".into()
            }
        );
        assert!(lockfile.verify().is_empty());
    }

    #[test]
    fn preferred_versions_rejects_garbage() {
        let mut lockfile = Lockfile::new(vec![], None);
        lockfile.packages.push(LockedPackage {
            name: "foo".into(),
            version: "not-a-version".into(),
            resolved: "foo".into(),
            integrity: None,
            source: Source::Path { path: ".".into() },
            dependencies: BTreeMap::new(),
        });
        assert!(preferred_versions(&lockfile).is_err());
    }
}
