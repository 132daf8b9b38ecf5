use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for Tether operations outside the resolver itself.
#[derive(Debug, Error, Diagnostic)]
pub enum TetherError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed manifest (e.g. Tether.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your Tether.toml for syntax errors"))]
    Manifest { message: String },

    /// Lockfile could not be read, parsed, or written.
    #[error("Lockfile error: {message}")]
    #[diagnostic(help("Delete Tether.lock and run `tether update` to regenerate it"))]
    Lockfile { message: String },

    /// The package index could not be loaded or queried.
    #[error("Registry error: {message}")]
    Registry { message: String },

    /// Global configuration could not be loaded.
    #[error("Config error: {message}")]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type TetherResult<T> = miette::Result<T>;
