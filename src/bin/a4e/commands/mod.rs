//! Command implementations

pub mod build_order;
pub mod classpath;
pub mod info;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::Cli;
use ant4eclipse::core::Workspace;
use ant4eclipse::ops::{self, OutputFormat};
use ant4eclipse::util::GlobalContext;

/// Flags shared by every command.
pub struct GlobalArgs {
    pub workspace: PathBuf,
    pub format: OutputFormat,
    pub verbose: bool,
    pub color: bool,
}

impl GlobalArgs {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let format: OutputFormat = cli
            .format
            .parse()
            .with_context(|| format!("invalid output format: {}", cli.format))?;

        let workspace = match &cli.workspace {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("failed to get current directory")?,
        };

        Ok(GlobalArgs {
            workspace,
            format,
            verbose: cli.verbose,
            color: !cli.no_color,
        })
    }

    pub fn open(&self) -> Result<(Workspace, GlobalContext)> {
        ops::open_workspace(&self.workspace, self.verbose, self.color)
    }
}
