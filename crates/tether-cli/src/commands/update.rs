//! Handler for `tether update`.

use miette::Result;

use tether_core::config::GlobalConfig;
use tether_ops::ops_update;

use super::Context;

pub fn exec(ctx: &Context) -> Result<()> {
    let project_root = ctx.project_root()?;
    let index = ctx.index(&GlobalConfig::load()?)?;
    ops_update::update(&project_root, &index)?;
    Ok(())
}
