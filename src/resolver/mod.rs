//! Referenced-project resolution and build ordering.
//!
//! Each project nature knows which other projects it depends on. The
//! resolvers here answer that question one hop at a time; the build-order
//! resolver walks the answers transitively, builds a dependency graph and
//! sorts it.

pub mod build_order;
pub mod cdt;
pub mod errors;
pub mod jdt;
pub mod pde;
pub mod platform;
pub mod python;
pub mod service;

use std::collections::{BTreeMap, BTreeSet};

use crate::classpath::context::NO_ARGUMENTS;
use crate::core::project::EclipseProject;
use crate::core::workspace::Workspace;
use crate::util::context::GlobalContext;

pub use build_order::resolve_build_order;
pub use errors::ResolveError;
pub use service::ReferencedProjectsResolverService;

/// Finds the projects a project directly depends on.
pub trait ReferencedProjectsResolver: Send + Sync {
    /// The reference type this resolver answers for.
    fn reference_type(&self) -> &'static str;

    /// Whether `project` carries the metadata this resolver reads.
    fn can_handle(&self, project: &EclipseProject) -> bool;

    /// Names of the projects `project` directly references.
    ///
    /// Never contains `project` itself and does not recurse.
    fn resolve_referenced_projects(
        &self,
        project: &EclipseProject,
        context: &ReferenceContext<'_>,
    ) -> Result<BTreeSet<String>, ResolveError>;
}

/// What a referenced-projects resolver may consult.
#[derive(Clone, Copy)]
pub struct ReferenceContext<'a> {
    workspace: &'a Workspace,
    gctx: &'a GlobalContext,
    arguments: &'a BTreeMap<String, String>,
}

impl<'a> ReferenceContext<'a> {
    pub fn new(workspace: &'a Workspace, gctx: &'a GlobalContext) -> Self {
        ReferenceContext {
            workspace,
            gctx,
            arguments: &NO_ARGUMENTS,
        }
    }

    /// Attach container arguments (e.g. the target platform).
    pub fn with_arguments(mut self, arguments: &'a BTreeMap<String, String>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn workspace(&self) -> &'a Workspace {
        self.workspace
    }

    pub fn gctx(&self) -> &'a GlobalContext {
        self.gctx
    }

    pub fn arguments(&self) -> &'a BTreeMap<String, String> {
        self.arguments
    }
}

/// Drop self references from a resolver's answer.
pub(crate) fn without_self(project: &EclipseProject, mut names: BTreeSet<String>) -> BTreeSet<String> {
    names.remove(project.name());
    names
}
