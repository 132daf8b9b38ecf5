//! Operation: display the dependency tree.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tether_resolver::Resolution;
use tether_util::errors::TetherError;

use crate::{locked_preferences, open_index, Project};

/// Options for `tether tree`.
#[derive(Debug, Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Show the path from the project to this package.
    pub why: Option<String>,
    /// Show everything that depends on this package.
    pub inverted: Option<String>,
    /// Print the resolution as JSON instead of a tree.
    pub json: bool,
}

#[derive(Serialize)]
struct JsonResolution<'a> {
    root: &'a str,
    packages: Vec<JsonPackage<'a>>,
}

#[derive(Serialize)]
struct JsonPackage<'a> {
    name: &'a str,
    version: String,
    dependencies: BTreeMap<&'a str, String>,
}

/// Resolve the project and print its dependency tree to stdout.
pub fn tree(project_root: &Path, index: &Path, opts: &TreeOptions) -> miette::Result<()> {
    let output = render_tree(project_root, index, opts)?;
    print!("{output}");
    Ok(())
}

/// Resolve the project and render what `tree` prints.
///
/// Versions from an existing lockfile are preferred, so the tree matches what
/// `lock` would keep.
pub fn render_tree(project_root: &Path, index: &Path, opts: &TreeOptions) -> miette::Result<String> {
    let project = Project::load(project_root)?;
    let preferred = match project.existing_lockfile() {
        Some(lockfile) => locked_preferences(&lockfile)?,
        None => BTreeMap::new(),
    };
    let registry = open_index(index)?;
    let resolution = project.resolve(&registry, preferred)?;
    let root = project.manifest.package.name.as_str();

    if opts.json {
        return render_json(&resolution, root);
    }

    if let Some(target) = &opts.why {
        return Ok(render_why(&resolution, root, target));
    }

    if let Some(target) = &opts.inverted {
        if !resolution.graph.contains(target) {
            return Ok(not_found(target));
        }
        return Ok(resolution.graph.print_inverted_tree(target));
    }

    Ok(resolution.graph.print_tree(root, opts.depth))
}

fn render_why(resolution: &Resolution, root: &str, target: &str) -> String {
    let Some(path) = resolution.graph.find_path(root, target) else {
        return not_found(target);
    };
    let mut output = format!("Path to {target}:\n");
    for (i, node) in path.iter().enumerate() {
        output.push_str(&format!("{}{node}\n", "  ".repeat(i)));
    }
    output
}

fn render_json(resolution: &Resolution, root: &str) -> miette::Result<String> {
    let packages = resolution
        .packages
        .iter()
        .map(|p| JsonPackage {
            name: &p.name,
            version: p.version.to_string(),
            dependencies: p
                .dependencies
                .iter()
                .map(|(name, constraint)| (name.as_str(), constraint.to_string()))
                .collect(),
        })
        .collect();
    let doc = JsonResolution { root, packages };
    let mut text = serde_json::to_string_pretty(&doc).map_err(|e| TetherError::Generic {
        message: format!("Failed to render JSON: {e}"),
    })?;
    text.push('\n');
    Ok(text)
}

fn not_found(target: &str) -> String {
    format!("Package '{target}' is not in the dependency graph.\n")
}
