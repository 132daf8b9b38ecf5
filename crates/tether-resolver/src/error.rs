//! Error types for version parsing, registry access, and resolution.

use miette::Diagnostic;
use thiserror::Error;

use crate::conflict::ConflictReport;

/// Malformed version or constraint text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum VersionError {
    #[error("invalid version '{0}': expected major.minor.patch")]
    InvalidVersion(String),

    #[error("invalid version constraint '{0}'")]
    #[diagnostic(help("use an operator (=, ^, ~, >=, >, <=, <) followed by major.minor.patch"))]
    InvalidConstraint(String),
}

/// Failures reported by a [`crate::registry::Registry`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum RegistryError {
    #[error("package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("package '{name}' has no published versions")]
    NoVersionsAvailable { name: String },

    #[error("version {version} of '{name}' not found in registry")]
    VersionNotFound { name: String, version: String },

    #[error("registry index error: {message}")]
    Index { message: String },
}

/// Resolution failure. There is no partial success: any of these means no
/// lockfile may be written.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("circular dependency detected: {}", .cycle.join(" -> "))]
    #[diagnostic(help("break the cycle by removing one of the listed dependency edges"))]
    CircularDependency { cycle: Vec<String> },

    #[error("conflicting dependencies\n{report}")]
    #[diagnostic(help("relax or align the listed constraints so one version satisfies all of them"))]
    ConflictingDependencies { report: ConflictReport },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),
}

impl ResolveError {
    /// Names of every package implicated by this error.
    pub fn packages(&self) -> Vec<String> {
        match self {
            ResolveError::CircularDependency { cycle } => {
                let mut names = cycle.clone();
                names.sort();
                names.dedup();
                names
            }
            ResolveError::ConflictingDependencies { report } => report
                .conflicts
                .iter()
                .map(|c| c.package.clone())
                .collect(),
            ResolveError::Registry(
                RegistryError::PackageNotFound { name }
                | RegistryError::NoVersionsAvailable { name }
                | RegistryError::VersionNotFound { name, .. },
            ) => vec![name.clone()],
            ResolveError::Registry(RegistryError::Index { .. }) => Vec::new(),
        }
    }
}
