//! Python projects: DLTK `prj` build path entries and PyDev project
//! references.

use std::collections::BTreeSet;

use crate::core::project::EclipseProject;
use crate::core::roles::PathEntryKind;
use crate::resolver::errors::ResolveError;
use crate::resolver::{without_self, ReferenceContext, ReferencedProjectsResolver};

pub const REFERENCE_TYPE: &str = "pydt";

#[derive(Debug, Clone, Copy, Default)]
pub struct PythonReferencedProjectsResolver;

impl ReferencedProjectsResolver for PythonReferencedProjectsResolver {
    fn reference_type(&self) -> &'static str {
        REFERENCE_TYPE
    }

    fn can_handle(&self, project: &EclipseProject) -> bool {
        project.python_role().is_some()
    }

    fn resolve_referenced_projects(
        &self,
        project: &EclipseProject,
        _context: &ReferenceContext<'_>,
    ) -> Result<BTreeSet<String>, ResolveError> {
        let Some(python) = project.python_role() else {
            return Ok(BTreeSet::new());
        };

        let names = python
            .raw_path_entries()
            .iter()
            .filter(|entry| entry.kind == PathEntryKind::Project)
            .map(|entry| entry.path.trim_start_matches('/').to_string())
            .filter(|name| !name.is_empty())
            .collect();
        Ok(without_self(project, names))
    }
}
