//! Operation: resolve dependencies and write Tether.lock when it is stale.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tether_util::progress::{status, status_info};

use crate::{locked_preferences, open_index, Project};

/// Options for `tether lock`.
#[derive(Debug, Clone)]
pub struct LockOptions {
    /// Directory of the package index to resolve against.
    pub index: PathBuf,
    /// Keep versions from an existing lockfile when they still satisfy the manifest.
    pub prefer_locked: bool,
}

/// What `lock` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// The lockfile already matched the manifest; nothing was resolved.
    UpToDate,
    /// A new lockfile was written with this many packages.
    Written { packages: usize },
}

/// Bring `Tether.lock` in line with `Tether.toml`.
///
/// A lockfile whose manifest digest matches is left untouched. Otherwise the
/// manifest is resolved, keeping previously locked versions where allowed,
/// and the result is written out. A failed resolution leaves any existing
/// lockfile as it was.
pub fn lock(project_root: &Path, opts: &LockOptions) -> miette::Result<LockOutcome> {
    let project = Project::load(project_root)?;
    let digest = project.manifest.digest();
    let existing = project.existing_lockfile();

    if let Some(lockfile) = &existing {
        if lockfile.is_fresh(&digest) {
            tracing::debug!("Lockfile digest {digest} matches manifest");
            status_info("Fresh", "Tether.lock is up to date");
            return Ok(LockOutcome::UpToDate);
        }
    }

    let preferred = match (&existing, opts.prefer_locked) {
        (Some(lockfile), true) => locked_preferences(lockfile)?,
        _ => BTreeMap::new(),
    };

    let registry = open_index(&opts.index)?;
    let resolution = project.resolve(&registry, preferred)?;
    let lockfile = project.lockfile_for(&resolution, &registry)?;
    lockfile.save(&project.lockfile_path())?;

    let count = lockfile.packages.len();
    status("Locking", &format!("{count} packages"));
    Ok(LockOutcome::Written { packages: count })
}
