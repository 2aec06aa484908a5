//! `a4e classpath` command

use std::collections::BTreeMap;

use anyhow::{bail, Result};

use super::GlobalArgs;
use crate::cli::ClasspathArgs;
use ant4eclipse::classpath::target_platform::TARGET_PLATFORM_ARGUMENT;
use ant4eclipse::classpath::ResolveOptions;
use ant4eclipse::ops::{classpath, ClasspathOptions};

pub fn execute(args: ClasspathArgs, global: &GlobalArgs) -> Result<()> {
    let (workspace, gctx) = global.open()?;

    let mut arguments = BTreeMap::new();
    for argument in &args.arguments {
        let Some((key, value)) = argument.split_once('=') else {
            bail!("invalid container argument `{}`, expected KEY=VALUE", argument);
        };
        arguments.insert(key.trim().to_string(), value.trim().to_string());
    }
    if let Some(platform) = args.target_platform {
        arguments.insert(TARGET_PLATFORM_ARGUMENT.to_string(), platform);
    }

    let options = ClasspathOptions {
        project: args.project,
        resolve: ResolveOptions {
            workspace_relative: args.relative,
            runtime_classpath: args.runtime,
        },
        arguments,
        path_string: args.path,
    };
    let report = classpath(&workspace, &gctx, &options)?;

    print!("{}", report.format(global.format)?);
    Ok(())
}
