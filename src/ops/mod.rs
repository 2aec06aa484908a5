//! High-level operations.
//!
//! This module contains the implementation of the `a4e` commands: each
//! operation loads what it needs, runs the resolver and returns a report
//! that can be rendered as text or JSON.

pub mod build_order;
pub mod classpath;
pub mod info;

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::workspace::Workspace;
use crate::util::context::GlobalContext;

pub use build_order::{build_order, BuildOrderOptions, BuildOrderReport};
pub use classpath::{classpath, ClasspathOptions, ClasspathReport};
pub use info::{info, WorkspaceInfo};

/// How a report is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Text,
    /// Machine-readable JSON output
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "human" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(OutputFormatParseError(s.to_string())),
        }
    }
}

/// Error parsing output format option.
#[derive(Debug, Clone)]
pub struct OutputFormatParseError(pub String);

impl std::fmt::Display for OutputFormatParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid output format '{}', valid values: text, json", self.0)
    }
}

impl std::error::Error for OutputFormatParseError {}

/// Load the workspace at `root` and a context configured for it.
pub fn open_workspace(root: &Path, verbose: bool, color: bool) -> Result<(Workspace, GlobalContext)> {
    let root = root
        .canonicalize()
        .with_context(|| format!("workspace directory not found: {}", root.display()))?;

    let mut gctx = GlobalContext::new()?
        .configure_for_workspace(&root)
        .context("failed to configure ant4eclipse")?;
    gctx.set_verbose(verbose);
    gctx.set_color(color);

    let workspace = Workspace::load(&root)?;
    Ok((workspace, gctx))
}

/// Render a serializable report as pretty JSON.
pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    json.push('\n');
    Ok(json)
}
