//! Handler for `tether verify`.

use miette::Result;

use tether_ops::ops_verify;

use super::Context;

pub fn exec(ctx: &Context) -> Result<()> {
    ops_verify::verify(&ctx.project_root()?)
}
