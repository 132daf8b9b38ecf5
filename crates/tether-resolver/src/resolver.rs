//! Greedy, closure-discovering dependency resolution.
//!
//! Packages are visited in dependency-first topological order. Each package
//! gets the newest version that satisfies every constraint registered for it
//! so far; its dependencies are then fetched from the registry and folded into
//! the graph. Passes repeat until one discovers no new package. Choices are
//! never revisited: a constraint that shows up after its package was already
//! selected, and rules out that selection, is reported as a conflict.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::conflict::{Conflict, ConflictReport};
use crate::error::ResolveError;
use crate::graph::DependencyGraph;
use crate::registry::{DependencyList, Registry};
use crate::version::{SemanticVersion, VersionConstraint};

/// One package with the single version chosen for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    pub name: String,
    pub version: SemanticVersion,
    /// The chosen version's own dependencies as reported by the registry.
    pub dependencies: DependencyList,
}

/// The output of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Every resolved package, sorted by name. The root is not included.
    pub packages: Vec<ResolvedVersion>,
    /// Package names in the order versions were selected.
    pub order: Vec<String>,
    /// The full graph, with selected versions recorded on each node.
    pub graph: DependencyGraph,
    pub root: Option<String>,
}

impl Resolution {
    pub fn get(&self, name: &str) -> Option<&ResolvedVersion> {
        self.packages.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn into_packages(self) -> Vec<ResolvedVersion> {
        self.packages
    }
}

/// Collects constraints and resolves them against a [`Registry`].
///
/// A resolver is single-use: [`Resolver::resolve`] consumes it, so graph,
/// constraint, and conflict state never leak between resolutions.
#[derive(Debug, Default)]
pub struct Resolver {
    graph: DependencyGraph,
    constraints: BTreeMap<String, Vec<VersionConstraint>>,
    resolved: BTreeMap<String, ResolvedVersion>,
    /// Packages that already produced a conflict, with the number of versions
    /// the registry offered; not retried in later passes.
    unresolvable: BTreeMap<String, usize>,
    conflicts: ConflictReport,
    root: Option<String>,
    preferred: BTreeMap<String, SemanticVersion>,
    order: Vec<String>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as the project being resolved. The root is part of the
    /// graph (so cycles through it are caught) but is never looked up in the
    /// registry and never appears in the result.
    pub fn with_root(mut self, name: &str) -> Self {
        self.graph.add_node(name);
        self.root = Some(name.to_string());
        self
    }

    /// Prefer these versions (typically from an existing lockfile) whenever
    /// the registry still lists them and they satisfy every constraint.
    pub fn prefer(mut self, versions: BTreeMap<String, SemanticVersion>) -> Self {
        self.preferred = versions;
        self
    }

    /// Register a package to resolve without constraining its version.
    pub fn add_package(&mut self, name: &str) {
        self.graph.add_node(name);
    }

    /// Require `constraint` to hold for `package`. Constraints accumulate;
    /// every one registered must hold simultaneously.
    pub fn add_constraint(&mut self, package: &str, constraint: VersionConstraint) {
        self.graph.add_node(package);
        self.constraints
            .entry(package.to_string())
            .or_default()
            .push(constraint);
    }

    /// Declare that `from` depends on `to` under `constraint`.
    pub fn add_dependency(&mut self, from: &str, to: &str, constraint: VersionConstraint) {
        self.graph.add_edge(from, to, constraint.clone());
        self.add_constraint(to, constraint);
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Constraints registered so far for a package.
    pub fn constraints_for(&self, package: &str) -> &[VersionConstraint] {
        self.constraints
            .get(package)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve every package reachable in the graph.
    pub fn resolve<R: Registry + ?Sized>(mut self, registry: &R) -> Result<Resolution, ResolveError> {
        let mut pass = 0usize;
        loop {
            pass += 1;
            self.check_cycles()?;

            let known = self.graph.len();
            for name in self.graph.topological_sort() {
                if self.is_settled(&name) {
                    continue;
                }
                self.select(&name, registry)?;
            }

            let discovered = self.graph.len() - known;
            debug!("Resolution pass {pass}: {discovered} new packages discovered");
            if discovered == 0 {
                break;
            }
        }
        // An edge between two already-known packages can close a cycle
        // without growing the graph.
        self.check_cycles()?;
        self.check_late_constraints();
        self.refresh_unresolvable();

        if !self.conflicts.is_empty() {
            for conflict in &self.conflicts.conflicts {
                warn!("{conflict}");
            }
            return Err(ResolveError::ConflictingDependencies {
                report: self.conflicts,
            });
        }

        info!(
            "Resolved {} packages in {pass} passes",
            self.resolved.len()
        );
        Ok(Resolution {
            packages: self.resolved.into_values().collect(),
            order: self.order,
            graph: self.graph,
            root: self.root,
        })
    }

    fn check_cycles(&self) -> Result<(), ResolveError> {
        match self.graph.detect_cycles() {
            Some(cycle) => Err(ResolveError::CircularDependency { cycle }),
            None => Ok(()),
        }
    }

    fn is_settled(&self, name: &str) -> bool {
        self.root.as_deref() == Some(name)
            || self.resolved.contains_key(name)
            || self.unresolvable.contains_key(name)
    }

    /// Pick a version for `name`, then fold its dependencies into the graph.
    fn select<R: Registry + ?Sized>(&mut self, name: &str, registry: &R) -> Result<(), ResolveError> {
        let constraints = self.constraints_for(name).to_vec();

        let chosen = if constraints.is_empty() {
            match self.preferred_version(name, &constraints, registry)? {
                Some(v) => v,
                None => registry.latest_version(name)?,
            }
        } else {
            let mut available = registry.versions(name)?;
            available.sort_by(|a, b| b.cmp(a));
            let preferred = self.preferred_version(name, &constraints, registry)?;
            match preferred.or_else(|| {
                available
                    .iter()
                    .find(|v| constraints.iter().all(|c| c.satisfies(v)))
                    .copied()
            }) {
                Some(v) => v,
                None => {
                    let conflict = Conflict::unsatisfiable(name, &constraints, available.len());
                    debug!("No candidate for {name}: {}", conflict.message);
                    self.conflicts.add(conflict);
                    self.unresolvable.insert(name.to_string(), available.len());
                    return Ok(());
                }
            }
        };

        debug!("Selected {name} {chosen}");
        let dependencies = registry.dependencies(name, &chosen)?;
        for (dep, constraint) in &dependencies {
            debug!("  {name} {chosen} -> {dep} {constraint}");
            self.add_dependency(name, dep, constraint.clone());
        }

        self.graph.set_version(name, chosen);
        self.order.push(name.to_string());
        self.resolved.insert(
            name.to_string(),
            ResolvedVersion {
                name: name.to_string(),
                version: chosen,
                dependencies,
            },
        );
        Ok(())
    }

    fn preferred_version<R: Registry + ?Sized>(
        &self,
        name: &str,
        constraints: &[VersionConstraint],
        registry: &R,
    ) -> Result<Option<SemanticVersion>, ResolveError> {
        let Some(preferred) = self.preferred.get(name) else {
            return Ok(None);
        };
        if !constraints.iter().all(|c| c.satisfies(preferred)) {
            debug!("Locked {name} {preferred} no longer satisfies its constraints");
            return Ok(None);
        }
        if !registry.versions(name)?.contains(preferred) {
            debug!("Locked {name} {preferred} is no longer published");
            return Ok(None);
        }
        Ok(Some(*preferred))
    }

    /// Rebuild the conflict of every package that had no candidate, so it
    /// lists constraints that arrived after its selection failed.
    fn refresh_unresolvable(&mut self) {
        for (name, available) in &self.unresolvable {
            let constraints = self.constraints.get(name).map(Vec::as_slice).unwrap_or_default();
            let conflict = Conflict::unsatisfiable(name, constraints, *available);
            self.conflicts.add(conflict);
        }
    }

    /// Constraints discovered after a package was selected are checked against
    /// that selection here; there is no backtracking.
    fn check_late_constraints(&mut self) {
        for (name, resolved) in &self.resolved {
            let constraints = self.constraints.get(name).cloned().unwrap_or_default();
            let violated: Vec<String> = constraints
                .iter()
                .filter(|c| !c.satisfies(&resolved.version))
                .map(|c| c.to_string())
                .collect();
            if violated.is_empty() {
                continue;
            }
            self.conflicts.add(Conflict {
                package: name.clone(),
                constraints,
                message: format!(
                    "{} was selected before {} was required; earlier selections are not revisited",
                    resolved.version,
                    violated.join(", ")
                ),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;

    fn v(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    fn c(s: &str) -> VersionConstraint {
        VersionConstraint::parse(s).unwrap()
    }

    #[test]
    fn unconstrained_package_gets_latest() {
        let mut reg = MemoryRegistry::default();
        reg.publish("solo", v("0.1.0"), vec![]);
        reg.publish("solo", v("0.3.0"), vec![]);

        let mut resolver = Resolver::new();
        resolver.add_package("solo");
        let resolution = resolver.resolve(&reg).unwrap();
        assert_eq!(resolution.get("solo").unwrap().version, v("0.3.0"));
    }

    #[test]
    fn add_dependency_records_edge_and_constraint() {
        let mut resolver = Resolver::new().with_root("app");
        resolver.add_dependency("app", "foo", c("^1.0.0"));
        resolver.add_constraint("foo", c("<1.5.0"));
        assert_eq!(resolver.constraints_for("foo").len(), 2);
        assert_eq!(resolver.graph().dependents_of("foo"), vec!["app"]);
        assert!(resolver.constraints_for("app").is_empty());
    }

    #[test]
    fn root_is_never_queried() {
        // An empty registry would fail with PackageNotFound if "app" were looked up.
        let mut reg = MemoryRegistry::default();
        reg.publish("foo", v("1.0.0"), vec![]);
        let mut resolver = Resolver::new().with_root("app");
        resolver.add_dependency("app", "foo", c("^1.0.0"));
        let resolution = resolver.resolve(&reg).unwrap();
        assert_eq!(resolution.len(), 1);
        assert!(resolution.get("app").is_none());
    }

    #[test]
    fn selection_order_is_dependency_first() {
        let mut reg = MemoryRegistry::default();
        reg.publish("a", v("1.0.0"), vec![("b".into(), c("^1.0.0"))]);
        reg.publish("b", v("1.0.0"), vec![]);
        let mut resolver = Resolver::new().with_root("app");
        resolver.add_dependency("app", "a", c("^1.0.0"));
        resolver.add_dependency("a", "b", c("^1.0.0"));
        let resolution = resolver.resolve(&reg).unwrap();
        assert_eq!(resolution.order, ["b", "a"]);
    }

    #[test]
    fn preferred_version_wins_when_still_valid() {
        let mut reg = MemoryRegistry::default();
        for ver in ["1.0.0", "1.1.0", "1.2.0"] {
            reg.publish("foo", v(ver), vec![]);
        }
        let mut locked = BTreeMap::new();
        locked.insert("foo".to_string(), v("1.1.0"));

        let mut resolver = Resolver::new().prefer(locked);
        resolver.add_constraint("foo", c("^1.0.0"));
        let resolution = resolver.resolve(&reg).unwrap();
        assert_eq!(resolution.get("foo").unwrap().version, v("1.1.0"));
    }

    #[test]
    fn preferred_version_ignored_when_constraint_moved() {
        let mut reg = MemoryRegistry::default();
        for ver in ["1.1.0", "2.0.0", "2.3.0"] {
            reg.publish("foo", v(ver), vec![]);
        }
        let mut locked = BTreeMap::new();
        locked.insert("foo".to_string(), v("1.1.0"));

        let mut resolver = Resolver::new().prefer(locked);
        resolver.add_constraint("foo", c("^2.0.0"));
        let resolution = resolver.resolve(&reg).unwrap();
        assert_eq!(resolution.get("foo").unwrap().version, v("2.3.0"));
    }

    #[test]
    fn registry_errors_abort() {
        let reg = MemoryRegistry::default();
        let mut resolver = Resolver::new().with_root("app");
        resolver.add_dependency("app", "ghost", c("^1.0.0"));
        let err = resolver.resolve(&reg).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Registry(crate::error::RegistryError::PackageNotFound { ref name }) if name == "ghost"
        ));
    }

    #[test]
    fn unconstrained_package_without_versions_aborts() {
        let mut reg = MemoryRegistry::default();
        reg.declare("empty");
        let mut resolver = Resolver::new();
        resolver.add_package("empty");
        let err = resolver.resolve(&reg).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Registry(crate::error::RegistryError::NoVersionsAvailable { ref name }) if name == "empty"
        ));
    }

    #[test]
    fn no_versions_published_is_a_conflict_when_constrained() {
        let mut reg = MemoryRegistry::default();
        reg.declare("empty");
        let mut resolver = Resolver::new();
        resolver.add_constraint("empty", c(">=0.0.0"));
        let err = resolver.resolve(&reg).unwrap_err();
        assert_eq!(err.packages(), vec!["empty".to_string()]);
    }
}
