//! Operation: re-resolve every dependency from scratch and rewrite Tether.lock.

use std::collections::BTreeMap;
use std::path::Path;

use tether_util::progress::status;

use crate::{open_index, Project};

/// A package whose locked version differs between the old and new lockfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub name: String,
    /// `None` when the package was not locked before.
    pub old: Option<String>,
    /// `None` when the package is no longer needed.
    pub new: Option<String>,
}

/// Resolve ignoring the existing lockfile, write the result, and report what moved.
pub fn update(project_root: &Path, index: &Path) -> miette::Result<Vec<VersionChange>> {
    let project = Project::load(project_root)?;
    let before = project
        .existing_lockfile()
        .map(|l| l.locked_versions())
        .unwrap_or_default();

    let registry = open_index(index)?;
    let resolution = project.resolve(&registry, BTreeMap::new())?;
    let lockfile = project.lockfile_for(&resolution, &registry)?;
    lockfile.save(&project.lockfile_path())?;

    let changes = diff(&before, &lockfile.locked_versions());
    for change in &changes {
        match (&change.old, &change.new) {
            (Some(old), Some(new)) => status("Updating", &format!("{} {old} -> {new}", change.name)),
            (None, Some(new)) => status("Adding", &format!("{} {new}", change.name)),
            (Some(old), None) => status("Removing", &format!("{} {old}", change.name)),
            (None, None) => {}
        }
    }
    if changes.is_empty() {
        status("Updated", "all dependencies at latest compatible version");
    }
    Ok(changes)
}

fn diff(before: &BTreeMap<String, String>, after: &BTreeMap<String, String>) -> Vec<VersionChange> {
    let names: std::collections::BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    names
        .into_iter()
        .filter_map(|name| {
            let old = before.get(name);
            let new = after.get(name);
            (old != new).then(|| VersionChange {
                name: name.clone(),
                old: old.cloned(),
                new: new.cloned(),
            })
        })
        .collect()
}
