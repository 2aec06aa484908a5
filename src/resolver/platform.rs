//! References declared in the `<projects>` list of `.project`.

use std::collections::BTreeSet;

use crate::core::project::EclipseProject;
use crate::resolver::errors::ResolveError;
use crate::resolver::{without_self, ReferenceContext, ReferencedProjectsResolver};

pub const REFERENCE_TYPE: &str = "platform";

#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformReferencedProjectsResolver;

impl ReferencedProjectsResolver for PlatformReferencedProjectsResolver {
    fn reference_type(&self) -> &'static str {
        REFERENCE_TYPE
    }

    fn can_handle(&self, _project: &EclipseProject) -> bool {
        true
    }

    fn resolve_referenced_projects(
        &self,
        project: &EclipseProject,
        _context: &ReferenceContext<'_>,
    ) -> Result<BTreeSet<String>, ResolveError> {
        let names = project.referenced_projects().iter().cloned().collect();
        Ok(without_self(project, names))
    }
}
