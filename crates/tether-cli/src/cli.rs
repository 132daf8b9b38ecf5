//! CLI argument definitions for Tether.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "tether",
    version,
    about = "Resolve package dependencies into a reproducible lockfile",
    long_about = "Tether resolves the dependencies declared in Tether.toml against a package \
                  index, picking the newest version that satisfies every constraint, and \
                  records the result in Tether.lock."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Package index directory (overrides the global config)
    #[arg(long, global = true, env = "TETHER_INDEX", value_name = "DIR")]
    pub index: Option<PathBuf>,

    /// Path to Tether.toml (defaults to the nearest one above the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve dependencies and write Tether.lock if it is out of date
    Lock {
        /// Re-resolve without keeping previously locked versions
        #[arg(long)]
        no_prefer_locked: bool,
    },

    /// Re-resolve every dependency to its newest compatible version
    Update,

    /// Print the dependency tree
    Tree {
        /// Maximum depth
        #[arg(long)]
        depth: Option<usize>,
        /// Explain why a package is included
        #[arg(long, value_name = "NAME")]
        why: Option<String>,
        /// Show the packages that depend on NAME
        #[arg(long, value_name = "NAME")]
        inverted: Option<String>,
        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check Tether.lock for internal consistency
    Verify,
}

pub fn parse() -> Cli {
    Cli::parse()
}
