//! A package registry backed by a directory of TOML index files.
//!
//! Each `<name>.toml` in the directory describes one package:
//!
//! ```toml
//! [[version]]
//! version = "1.2.5"
//! checksum = "sha256-..."
//! dependencies = { bar = "~2.1.0" }
//! ```
//!
//! An optional `index.toml` sets the registry URL recorded in lockfiles.

pub mod entry;
pub mod index;

pub use index::IndexRegistry;
