//! Plug-in projects: `Fragment-Host` and `Require-Bundle` matched against the
//! bundles living in the workspace.

use std::collections::BTreeSet;

use crate::core::bundle::BundleRequirement;
use crate::core::project::EclipseProject;
use crate::core::workspace::Workspace;
use crate::resolver::errors::ResolveError;
use crate::resolver::{without_self, ReferenceContext, ReferencedProjectsResolver};

pub const REFERENCE_TYPE: &str = "pde";

#[derive(Debug, Clone, Copy, Default)]
pub struct PdeReferencedProjectsResolver;

impl ReferencedProjectsResolver for PdeReferencedProjectsResolver {
    fn reference_type(&self) -> &'static str {
        REFERENCE_TYPE
    }

    fn can_handle(&self, project: &EclipseProject) -> bool {
        project.plugin_role().is_some()
    }

    fn resolve_referenced_projects(
        &self,
        project: &EclipseProject,
        context: &ReferenceContext<'_>,
    ) -> Result<BTreeSet<String>, ResolveError> {
        let Some(plugin) = project.plugin_role() else {
            return Ok(BTreeSet::new());
        };
        let bundle = plugin.bundle();

        let names = bundle
            .fragment_host
            .iter()
            .chain(&bundle.required_bundles)
            .filter_map(|requirement| workspace_provider(context.workspace(), requirement))
            .collect();
        Ok(without_self(project, names))
    }
}

/// The workspace project with the highest bundle version satisfying
/// `requirement`.
fn workspace_provider(workspace: &Workspace, requirement: &BundleRequirement) -> Option<String> {
    let provider = workspace
        .projects_with_bundle(&requirement.symbolic_name)
        .filter_map(|project| project.plugin_role().map(|role| (project, role.bundle())))
        .filter(|(_, bundle)| requirement.is_satisfied_by(bundle))
        .max_by(|(_, a), (_, b)| a.version.cmp(&b.version))
        .map(|(project, _)| project.name().to_string());

    if provider.is_none() {
        tracing::debug!("bundle `{}` is not provided by the workspace", requirement.symbolic_name);
    }
    provider
}
