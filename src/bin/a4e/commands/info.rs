//! `a4e info` command

use anyhow::Result;

use super::GlobalArgs;
use ant4eclipse::ops::info;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (workspace, gctx) = global.open()?;
    print!("{}", info(&workspace, &gctx).format(global.format)?);
    Ok(())
}
