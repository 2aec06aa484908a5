//! Java projects: `.classpath` project entries plus the projects implied by
//! classpath containers.

use std::collections::BTreeSet;

use crate::classpath::context::{ClasspathResolverContext, ResolveOptions};
use crate::core::classpath_entry::EntryKind;
use crate::core::project::EclipseProject;
use crate::resolver::errors::ResolveError;
use crate::resolver::{without_self, ReferenceContext, ReferencedProjectsResolver};

pub const REFERENCE_TYPE: &str = "jdt";

#[derive(Debug, Clone, Copy, Default)]
pub struct JdtReferencedProjectsResolver;

impl ReferencedProjectsResolver for JdtReferencedProjectsResolver {
    fn reference_type(&self) -> &'static str {
        REFERENCE_TYPE
    }

    fn can_handle(&self, project: &EclipseProject) -> bool {
        project.java_role().is_some()
    }

    fn resolve_referenced_projects(
        &self,
        project: &EclipseProject,
        context: &ReferenceContext<'_>,
    ) -> Result<BTreeSet<String>, ResolveError> {
        let Some(java) = project.java_role() else {
            return Ok(BTreeSet::new());
        };

        let mut names: BTreeSet<String> = java
            .entries_of_kind(EntryKind::Project)
            .map(|entry| entry.path.clone())
            .collect();

        let containers = context.gctx().container_resolvers();
        let mut scratch = ClasspathResolverContext::new(context.workspace(), context.gctx(), ResolveOptions::default())
            .with_arguments(context.arguments())
            .entered(project.name());

        for entry in java.entries_of_kind(EntryKind::Container) {
            let Some(resolver) = containers.resolver_for(entry, &scratch) else {
                tracing::debug!("no resolver for container `{}` of `{}`", entry.path, project.name());
                continue;
            };
            if resolver.implies_referenced_projects() {
                tracing::debug!("collecting projects implied by container `{}`", entry.path);
                resolver.resolve_container(entry, &mut scratch)?;
            }
        }
        names.extend(scratch.referenced_projects().iter().cloned());

        Ok(without_self(project, names))
    }
}
