//! Build order operation.

use anyhow::Result;
use serde::Serialize;

use crate::core::workspace::Workspace;
use crate::ops::{to_json, OutputFormat};
use crate::resolver::{resolve_build_order, ReferenceContext};
use crate::util::context::GlobalContext;

/// Options for ordering projects.
#[derive(Debug, Clone, Default)]
pub struct BuildOrderOptions {
    /// Projects to order; empty means every project of the workspace.
    pub projects: Vec<String>,

    /// Reference types to follow; empty means all registered types.
    pub reference_types: Vec<String>,
}

/// Result of a build order run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOrderReport {
    pub order: Vec<String>,
    pub reference_types: Vec<String>,
}

impl BuildOrderReport {
    pub fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => to_json(self),
            OutputFormat::Text => Ok(self.order.iter().map(|p| format!("{}\n", p)).collect()),
        }
    }
}

/// Compute the build order of the selected projects.
pub fn build_order(workspace: &Workspace, gctx: &GlobalContext, options: &BuildOrderOptions) -> Result<BuildOrderReport> {
    let projects = if options.projects.is_empty() {
        workspace.project_names()
    } else {
        options.projects.clone()
    };
    let types = (!options.reference_types.is_empty()).then_some(options.reference_types.as_slice());

    let context = ReferenceContext::new(workspace, gctx);
    let order = resolve_build_order(workspace, &projects, types, &context)?;

    let reference_types = match types {
        Some(types) => types.to_vec(),
        None => gctx
            .referenced_projects_resolvers()
            .reference_types()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };
    Ok(BuildOrderReport { order, reference_types })
}
