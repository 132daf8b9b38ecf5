//! Command dispatch and handler modules.

mod lock;
mod tree;
mod update;
mod verify;

use std::path::PathBuf;

use miette::Result;
use tether_core::config::GlobalConfig;
use tether_core::MANIFEST_NAME;
use tether_util::errors::TetherError;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = Context {
        index: cli.index,
        manifest_path: cli.manifest_path,
    };
    match cli.command {
        Command::Lock { no_prefer_locked } => lock::exec(&ctx, no_prefer_locked),
        Command::Update => update::exec(&ctx),
        Command::Tree {
            depth,
            why,
            inverted,
            json,
        } => tree::exec(&ctx, depth, why, inverted, json),
        Command::Verify => verify::exec(&ctx),
    }
}

/// Global options shared by every command.
pub struct Context {
    index: Option<PathBuf>,
    manifest_path: Option<PathBuf>,
}

impl Context {
    /// Directory holding the project's `Tether.toml`.
    pub fn project_root(&self) -> Result<PathBuf> {
        if let Some(path) = &self.manifest_path {
            if !path.is_file() {
                return Err(TetherError::Manifest {
                    message: format!("{} does not exist", path.display()),
                }
                .into());
            }
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            return Ok(dir);
        }

        let cwd = std::env::current_dir().map_err(TetherError::Io)?;
        tether_util::fs::find_ancestor_with(&cwd, MANIFEST_NAME).ok_or_else(|| {
            TetherError::Manifest {
                message: format!("No {MANIFEST_NAME} found in current directory or any parent"),
            }
            .into()
        })
    }

    /// Package index directory: `--index` / `TETHER_INDEX`, then the global config.
    pub fn index(&self, config: &GlobalConfig) -> Result<PathBuf> {
        let index = self
            .index
            .clone()
            .or_else(|| config.registry.index.clone())
            .ok_or_else(|| TetherError::Config {
                message: "no package index configured; pass --index, set TETHER_INDEX, \
                          or set registry.index in ~/.tether/config.toml"
                    .to_string(),
            })?;
        tracing::debug!("Using package index at {}", index.display());
        Ok(index)
    }
}
