//! The JRE container: the boot classpath of the root project.

use crate::classpath::container::ClasspathContainerResolver;
use crate::classpath::context::ClasspathResolverContext;
use crate::classpath::entry::{AccessRestrictions, ResolvedClasspathEntry};
use crate::core::classpath_entry::RawClasspathEntry;
use crate::resolver::errors::ResolveError;

pub const IDENTIFIER: &str = "jre";

/// Path of the JRE container.
pub const JRE_CONTAINER: &str = "org.eclipse.jdt.launching.JRE_CONTAINER";

/// Resolves `JRE_CONTAINER` and `JRE_CONTAINER/<vm type>/<name>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JreContainerResolver;

impl ClasspathContainerResolver for JreContainerResolver {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn can_resolve_container(&self, entry: &RawClasspathEntry, _context: &ClasspathResolverContext<'_>) -> bool {
        entry.path == JRE_CONTAINER
            || entry
                .path
                .strip_prefix(JRE_CONTAINER)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    fn resolve_container(
        &self,
        entry: &RawClasspathEntry,
        context: &mut ClasspathResolverContext<'_>,
    ) -> Result<(), ResolveError> {
        if !context.is_current_project_root() {
            tracing::debug!(
                "ignoring JRE container of referenced project `{}`",
                context.current_project_name().unwrap_or_default()
            );
            return Ok(());
        }

        let key = entry
            .path
            .strip_prefix(JRE_CONTAINER)
            .unwrap_or_default()
            .trim_start_matches('/');

        let runtimes = context.gctx().java_runtimes();
        let Some(runtime) = runtimes.resolve(key) else {
            tracing::warn!("no Java runtime available for `{}`, boot classpath left empty", entry.path);
            return Ok(());
        };

        let mut boot = ResolvedClasspathEntry::new(runtime.libraries().iter().cloned());
        if let Some(profile) = runtime.profile().and_then(|name| runtimes.profile(name)) {
            let public = std::iter::once("java".to_string()).chain(profile.system_packages().iter().cloned());
            boot = boot.with_access_restrictions(AccessRestrictions::new(public));
        }

        tracing::debug!("boot classpath from Java runtime `{}`", runtime.id());
        context.set_boot_classpath_entry(boot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::context::ResolveOptions;
    use crate::classpath::runtime::JavaRuntime;
    use crate::test_support::{global_context, WorkspaceBuilder};
    use std::path::PathBuf;

    fn runtime(id: &str, version: Option<&str>) -> JavaRuntime {
        let runtime = JavaRuntime::new(id, format!("/jvm/{}", id), vec![PathBuf::from(format!("/jvm/{}/rt.jar", id))]);
        match version {
            Some(v) => runtime.with_version(v),
            None => runtime,
        }
    }

    #[test]
    fn test_claims_jre_paths() {
        let ws = WorkspaceBuilder::new().build();
        let gctx = global_context(ws.root());
        let context = ClasspathResolverContext::new(&ws, &gctx, ResolveOptions::default());

        let claims = |path: &str| JreContainerResolver.can_resolve_container(&RawClasspathEntry::container(path), &context);
        assert!(claims(JRE_CONTAINER));
        assert!(claims(
            "org.eclipse.jdt.launching.JRE_CONTAINER/org.eclipse.jdt.internal.debug.ui.launcher.StandardVMType/JavaSE-17"
        ));
        assert!(!claims("org.eclipse.jdt.launching.JRE_CONTAINERX"));
    }

    #[test]
    fn test_only_root_contributes() {
        let ws = WorkspaceBuilder::new().build();
        let mut gctx = global_context(ws.root());
        gctx.java_runtimes_mut().register(runtime("jdk17", Some("17.0.2")));
        let entry = RawClasspathEntry::container(JRE_CONTAINER);

        let mut nested = ClasspathResolverContext::new(&ws, &gctx, ResolveOptions::default());
        JreContainerResolver.resolve_container(&entry, &mut nested).unwrap();
        assert!(!nested.has_boot_classpath_entry());

        let mut root = ClasspathResolverContext::new(&ws, &gctx, ResolveOptions::default()).entered("app");
        JreContainerResolver.resolve_container(&entry, &mut root).unwrap();
        let classpath = root.into_classpath();
        let boot = classpath.boot_classpath().unwrap();

        assert_eq!(boot.locations(), [PathBuf::from("/jvm/jdk17/rt.jar")]);
        let restrictions = boot.access_restrictions().unwrap();
        assert!(restrictions.public_packages().contains("java"));
        assert!(restrictions.public_packages().contains("javax.xml.parsers"));
    }

    #[test]
    fn test_unknown_profile_has_no_restrictions() {
        let ws = WorkspaceBuilder::new().build();
        let mut gctx = global_context(ws.root());
        gctx.java_runtimes_mut().register(runtime("custom", None).with_profile("Exotic-1"));

        let mut context = ClasspathResolverContext::new(&ws, &gctx, ResolveOptions::default()).entered("app");
        JreContainerResolver
            .resolve_container(&RawClasspathEntry::container(JRE_CONTAINER), &mut context)
            .unwrap();

        let classpath = context.into_classpath();
        assert!(!classpath.boot_classpath().unwrap().has_access_restrictions());
    }

    #[test]
    fn test_no_runtime_is_a_warning() {
        let ws = WorkspaceBuilder::new().build();
        let gctx = global_context(ws.root());

        let mut context = ClasspathResolverContext::new(&ws, &gctx, ResolveOptions::default()).entered("app");
        JreContainerResolver
            .resolve_container(&RawClasspathEntry::container(JRE_CONTAINER), &mut context)
            .unwrap();
        assert!(!context.has_boot_classpath_entry());
    }
}
