//! Dependency resolution engine: semantic versions and constraints, the
//! package graph with cycle detection and topological ordering, greedy
//! newest-compatible selection with registry-driven closure discovery, and
//! lockfile materialisation.

pub mod conflict;
pub mod error;
pub mod graph;
pub mod lock;
pub mod registry;
pub mod resolver;
pub mod version;

pub use error::{RegistryError, ResolveError, VersionError};
pub use registry::{MemoryRegistry, PackageMetadata, Registry};
pub use resolver::{Resolution, ResolvedVersion, Resolver};
pub use version::{SemanticVersion, VersionConstraint};
