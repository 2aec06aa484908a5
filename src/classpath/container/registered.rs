//! Containers declared in the classpath elements registry.

use crate::classpath::container::ClasspathContainerResolver;
use crate::classpath::context::ClasspathResolverContext;
use crate::classpath::entry::ResolvedClasspathEntry;
use crate::core::classpath_entry::RawClasspathEntry;
use crate::resolver::errors::ResolveError;

pub const IDENTIFIER: &str = "registered";

/// Resolves any container registered by name, without access restrictions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisteredContainerResolver;

impl ClasspathContainerResolver for RegisteredContainerResolver {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn can_resolve_container(&self, entry: &RawClasspathEntry, context: &ClasspathResolverContext<'_>) -> bool {
        context.gctx().elements().has_container(&entry.path)
    }

    fn resolve_container(
        &self,
        entry: &RawClasspathEntry,
        context: &mut ClasspathResolverContext<'_>,
    ) -> Result<(), ResolveError> {
        if let Some(container) = context.gctx().elements().container(&entry.path) {
            context.add_classpath_entry(ResolvedClasspathEntry::new(container.paths().iter().cloned()));
        }
        Ok(())
    }
}
