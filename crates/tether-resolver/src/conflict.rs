//! Unsatisfiable-constraint reporting.

use std::fmt;

use crate::version::VersionConstraint;

/// Every conflict encountered during one resolution, in the order found.
#[derive(Debug, Clone, Default)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
}

/// A package for which no available version satisfies every registered
/// constraint.
#[derive(Debug, Clone)]
pub struct Conflict {
    pub package: String,
    pub constraints: Vec<VersionConstraint>,
    pub message: String,
}

impl Conflict {
    /// Conflict for a package where no available version satisfies every constraint.
    pub fn unsatisfiable(package: &str, constraints: &[VersionConstraint], available: usize) -> Self {
        Self {
            package: package.to_string(),
            constraints: constraints.to_vec(),
            message: format!(
                "none of the {available} available versions satisfies {}",
                join_constraints(constraints)
            ),
        }
    }
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a conflict. A package is reported at most once; a second report
    /// for the same package replaces the first.
    pub fn add(&mut self, conflict: Conflict) {
        if let Some(existing) = self
            .conflicts
            .iter_mut()
            .find(|c| c.package == conflict.package)
        {
            *existing = conflict;
        } else {
            self.conflicts.push(conflict);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Look up the conflict recorded for a package.
    pub fn get(&self, package: &str) -> Option<&Conflict> {
        self.conflicts.iter().find(|c| c.package == package)
    }
}

fn join_constraints(constraints: &[VersionConstraint]) -> String {
    constraints
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.package,
            join_constraints(&self.constraints),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints(list: &[&str]) -> Vec<VersionConstraint> {
        list.iter()
            .map(|s| VersionConstraint::parse(s).unwrap())
            .collect()
    }

    #[test]
    fn empty_report() {
        let report = ConflictReport::new();
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
        assert_eq!(report.to_string(), "No version conflicts.");
    }

    #[test]
    fn report_lists_every_package() {
        let mut report = ConflictReport::new();
        report.add(Conflict::unsatisfiable("foo", &constraints(&["=1.0.0", "=2.0.0"]), 3));
        report.add(Conflict::unsatisfiable("bar", &constraints(&[">=5.0.0"]), 1));
        assert_eq!(report.len(), 2);
        let s = report.to_string();
        assert!(s.contains("Version conflicts (2)"));
        assert!(s.contains("foo [=1.0.0, =2.0.0]"));
        assert!(s.contains("bar [>=5.0.0]"));
        assert!(s.contains("none of the 3 available versions"));
    }

    #[test]
    fn same_package_reported_once() {
        let mut report = ConflictReport::new();
        report.add(Conflict::unsatisfiable("foo", &constraints(&["=1.0.0"]), 2));
        report.add(Conflict::unsatisfiable("foo", &constraints(&["=1.0.0", "=2.0.0"]), 2));
        assert_eq!(report.len(), 1);
        assert_eq!(report.get("foo").unwrap().constraints.len(), 2);
    }
}
