//! Workspace summary.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::project::EclipseProject;
use crate::core::workspace::Workspace;
use crate::ops::{to_json, OutputFormat};
use crate::util::context::GlobalContext;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    pub location: PathBuf,
    pub roles: Vec<&'static str>,
    pub natures: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrokenProjectInfo {
    pub name: String,
    pub message: String,
}

/// What `a4e info` reports.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceInfo {
    pub root: PathBuf,
    pub projects: Vec<ProjectInfo>,
    pub broken: Vec<BrokenProjectInfo>,
    pub reference_types: Vec<String>,
    pub container_resolvers: Vec<String>,
    pub java_runtimes: Vec<String>,
    pub default_runtime: Option<String>,
    pub target_platforms: Vec<String>,
}

impl WorkspaceInfo {
    pub fn format(&self, format: OutputFormat) -> Result<String> {
        if format == OutputFormat::Json {
            return to_json(self);
        }

        let mut out = format!("workspace: {}\n", self.root.display());
        out.push_str(&format!("projects ({}):\n", self.projects.len()));
        for project in &self.projects {
            out.push_str(&format!("  {} [{}]\n", project.name, project.roles.join(", ")));
        }
        if !self.broken.is_empty() {
            out.push_str(&format!("broken projects ({}):\n", self.broken.len()));
            for broken in &self.broken {
                out.push_str(&format!("  {}: {}\n", broken.name, broken.message));
            }
        }
        out.push_str(&format!("reference types: {}\n", self.reference_types.join(", ")));
        out.push_str(&format!("container resolvers: {}\n", self.container_resolvers.join(", ")));
        if !self.java_runtimes.is_empty() {
            out.push_str(&format!(
                "java runtimes: {} (default: {})\n",
                self.java_runtimes.join(", "),
                self.default_runtime.as_deref().unwrap_or("none")
            ));
        }
        if !self.target_platforms.is_empty() {
            out.push_str(&format!("target platforms: {}\n", self.target_platforms.join(", ")));
        }
        Ok(out)
    }
}

fn roles(project: &EclipseProject) -> Vec<&'static str> {
    let mut roles = Vec::new();
    if project.java_role().is_some() {
        roles.push("java");
    }
    if project.plugin_role().is_some() {
        roles.push("plugin");
    }
    if let Some(c) = project.c_role() {
        roles.push(if c.cpp { "c++" } else { "c" });
    }
    if project.python_role().is_some() {
        roles.push("python");
    }
    roles
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

/// Summarise the workspace and the configured resolvers.
pub fn info(workspace: &Workspace, gctx: &GlobalContext) -> WorkspaceInfo {
    WorkspaceInfo {
        root: workspace.root().to_path_buf(),
        projects: workspace
            .all_projects()
            .map(|project| ProjectInfo {
                name: project.name().to_string(),
                location: project.location().to_path_buf(),
                roles: roles(project),
                natures: project.natures().to_vec(),
            })
            .collect(),
        broken: workspace
            .broken_projects()
            .map(|(name, broken)| BrokenProjectInfo {
                name: name.to_string(),
                message: broken.message.clone(),
            })
            .collect(),
        reference_types: owned(gctx.referenced_projects_resolvers().reference_types()),
        container_resolvers: owned(gctx.container_resolvers().keys()),
        java_runtimes: gctx.java_runtimes().runtimes().map(|r| r.id().to_string()).collect(),
        default_runtime: gctx.java_runtimes().default_runtime().map(|r| r.id().to_string()),
        target_platforms: gctx.target_platforms().names().map(str::to_string).collect(),
    }
}
