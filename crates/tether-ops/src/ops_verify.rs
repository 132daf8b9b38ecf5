//! Operation: check Tether.lock for internal consistency.

use std::path::Path;

use tether_core::lockfile::{Lockfile, LOCKFILE_NAME};
use tether_util::errors::TetherError;
use tether_util::progress::{status, status_warn};

use crate::Project;

/// Verify that every dependency recorded in the lockfile is itself locked at
/// the recorded version, and that the lockfile was produced from the current
/// manifest.
///
/// Each problem is printed; any problem fails the operation.
pub fn verify(project_root: &Path) -> miette::Result<()> {
    let project = Project::load(project_root)?;
    let path = project.lockfile_path();
    if !path.is_file() {
        return Err(TetherError::Lockfile {
            message: format!("{LOCKFILE_NAME} not found; run `tether lock` first"),
        }
        .into());
    }
    let lockfile = Lockfile::load(&path)?;

    let mut problems = lockfile.verify();
    let digest = project.manifest.digest();
    if !lockfile.is_fresh(&digest) {
        problems.push("lockfile is out of date with Tether.toml".to_string());
    }
    for name in project.manifest.dependencies.keys() {
        if lockfile.find(name).is_none() {
            problems.push(format!("direct dependency '{name}' is not locked"));
        }
    }

    if problems.is_empty() {
        status(
            "Verified",
            &format!("{} locked packages", lockfile.packages.len()),
        );
        return Ok(());
    }

    for problem in &problems {
        status_warn("Problem", problem);
    }
    Err(TetherError::Lockfile {
        message: format!("{} problem(s) found in {LOCKFILE_NAME}", problems.len()),
    }
    .into())
}
