//! Handler for `tether lock`.

use miette::Result;

use tether_core::config::GlobalConfig;
use tether_ops::ops_lock::{self, LockOptions};

use super::Context;

pub fn exec(ctx: &Context, no_prefer_locked: bool) -> Result<()> {
    let project_root = ctx.project_root()?;
    let config = GlobalConfig::load()?;
    let opts = LockOptions {
        index: ctx.index(&config)?,
        prefer_locked: config.resolver.prefer_locked && !no_prefer_locked,
    };
    ops_lock::lock(&project_root, &opts)?;
    Ok(())
}
