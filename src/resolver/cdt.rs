//! C/C++ projects.
//!
//! CDT keeps its project references in build configurations this crate does
//! not read; the resolver reports that and contributes nothing.

use std::collections::BTreeSet;

use crate::core::project::EclipseProject;
use crate::resolver::errors::ResolveError;
use crate::resolver::{ReferenceContext, ReferencedProjectsResolver};

pub const REFERENCE_TYPE: &str = "cdt";

#[derive(Debug, Clone, Copy, Default)]
pub struct CdtReferencedProjectsResolver;

impl ReferencedProjectsResolver for CdtReferencedProjectsResolver {
    fn reference_type(&self) -> &'static str {
        REFERENCE_TYPE
    }

    fn can_handle(&self, project: &EclipseProject) -> bool {
        project.c_role().is_some()
    }

    fn resolve_referenced_projects(
        &self,
        project: &EclipseProject,
        _context: &ReferenceContext<'_>,
    ) -> Result<BTreeSet<String>, ResolveError> {
        tracing::warn!(
            "reference type `{}` is not supported, ignoring references of `{}`",
            REFERENCE_TYPE,
            project.name()
        );
        Ok(BTreeSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{global_context, WorkspaceBuilder};

    #[test]
    fn test_contributes_nothing() {
        let ws = WorkspaceBuilder::new().c_project("native").build();
        let gctx = global_context(ws.root());
        let project = ws.project("native").unwrap();

        assert!(CdtReferencedProjectsResolver.can_handle(project));
        let names = CdtReferencedProjectsResolver
            .resolve_referenced_projects(project, &ReferenceContext::new(&ws, &gctx))
            .unwrap();
        assert!(names.is_empty());
    }
}
