//! Handler for `tether tree`.

use miette::Result;

use tether_core::config::GlobalConfig;
use tether_ops::ops_tree::{self, TreeOptions};

use super::Context;

pub fn exec(
    ctx: &Context,
    depth: Option<usize>,
    why: Option<String>,
    inverted: Option<String>,
    json: bool,
) -> Result<()> {
    let project_root = ctx.project_root()?;
    let index = ctx.index(&GlobalConfig::load()?)?;
    let opts = TreeOptions {
        depth,
        why,
        inverted,
        json,
    };
    ops_tree::tree(&project_root, &index, &opts)
}
