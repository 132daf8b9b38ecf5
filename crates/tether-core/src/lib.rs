//! Core data types for Tether.
//!
//! This crate defines the on-disk shapes a Tether project deals with: the
//! `Tether.toml` manifest, the `Tether.lock` lockfile, and the global user
//! configuration.
//!
//! This crate is intentionally free of resolution logic and network I/O.

/// File name of the project manifest.
pub const MANIFEST_NAME: &str = "Tether.toml";

pub mod config;
pub mod lockfile;
pub mod manifest;
