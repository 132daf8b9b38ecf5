//! Shared utilities for Tether.
//!
//! Cross-cutting concerns used by the other Tether crates: the unified error
//! type, filesystem helpers, SHA-256 hashing, and terminal status lines.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
