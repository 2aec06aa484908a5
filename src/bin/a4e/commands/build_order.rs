//! `a4e build-order` command

use anyhow::Result;

use super::GlobalArgs;
use crate::cli::BuildOrderArgs;
use ant4eclipse::ops::{build_order, BuildOrderOptions};

pub fn execute(args: BuildOrderArgs, global: &GlobalArgs) -> Result<()> {
    let (workspace, gctx) = global.open()?;

    let options = BuildOrderOptions {
        projects: args.projects,
        reference_types: args.types,
    };
    let report = build_order(&workspace, &gctx, &options)?;

    print!("{}", report.format(global.format)?);
    Ok(())
}
