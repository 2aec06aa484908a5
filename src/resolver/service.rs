//! Registry and dispatcher of referenced-projects resolvers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use crate::core::project::EclipseProject;
use crate::resolver::errors::ResolveError;
use crate::resolver::{cdt, jdt, pde, platform, python, ReferenceContext, ReferencedProjectsResolver};

/// Built-in resolver table: reference type -> identifier.
pub const DEFAULT_REFERENCED_PROJECTS_RESOLVERS: &[(&str, &str)] = &[
    (platform::REFERENCE_TYPE, platform::REFERENCE_TYPE),
    (jdt::REFERENCE_TYPE, jdt::REFERENCE_TYPE),
    (pde::REFERENCE_TYPE, pde::REFERENCE_TYPE),
    (cdt::REFERENCE_TYPE, cdt::REFERENCE_TYPE),
    (python::REFERENCE_TYPE, python::REFERENCE_TYPE),
];

/// Instantiate a built-in resolver by identifier.
pub fn referenced_projects_resolver(identifier: &str) -> Option<Box<dyn ReferencedProjectsResolver>> {
    match identifier {
        platform::REFERENCE_TYPE => Some(Box::new(platform::PlatformReferencedProjectsResolver)),
        jdt::REFERENCE_TYPE => Some(Box::new(jdt::JdtReferencedProjectsResolver)),
        pde::REFERENCE_TYPE => Some(Box::new(pde::PdeReferencedProjectsResolver)),
        cdt::REFERENCE_TYPE => Some(Box::new(cdt::CdtReferencedProjectsResolver)),
        python::REFERENCE_TYPE => Some(Box::new(python::PythonReferencedProjectsResolver)),
        _ => None,
    }
}

type Registered = BTreeMap<String, Box<dyn ReferencedProjectsResolver>>;

/// Maps reference types to resolvers and unions their answers.
pub struct ReferencedProjectsResolverService {
    table: Option<BTreeMap<String, String>>,
    resolvers: OnceLock<Registered>,
}

impl ReferencedProjectsResolverService {
    /// Create a service from a type -> identifier table; `None` selects the
    /// built-in table. The resolvers are instantiated on first use.
    pub fn new(table: Option<BTreeMap<String, String>>) -> Self {
        ReferencedProjectsResolverService {
            table,
            resolvers: OnceLock::new(),
        }
    }

    fn resolvers(&self) -> &Registered {
        self.resolvers.get_or_init(|| {
            let table: BTreeMap<String, String> = match &self.table {
                Some(table) => table.clone(),
                None => DEFAULT_REFERENCED_PROJECTS_RESOLVERS
                    .iter()
                    .map(|(key, id)| (key.to_string(), id.to_string()))
                    .collect(),
            };

            let mut resolvers = BTreeMap::new();
            for (key, identifier) in table {
                match referenced_projects_resolver(&identifier) {
                    Some(resolver) => {
                        resolvers.insert(key, resolver);
                    }
                    None => tracing::warn!(
                        "unknown referenced projects resolver `{}` configured for `{}`",
                        identifier,
                        key
                    ),
                }
            }
            if resolvers.is_empty() {
                tracing::warn!("no referenced projects resolvers configured, no references will be found");
            }
            resolvers
        })
    }

    /// The registered reference types.
    pub fn reference_types(&self) -> Vec<&str> {
        self.resolvers().keys().map(String::as_str).collect()
    }

    /// Union of the direct references of `project` over `types`.
    ///
    /// `None` or an empty list means every registered type. Unknown types
    /// are reported and contribute nothing; types whose resolver cannot
    /// handle the project are skipped.
    pub fn resolve_referenced_projects(
        &self,
        project: &EclipseProject,
        types: Option<&[String]>,
        context: &ReferenceContext<'_>,
    ) -> Result<BTreeSet<String>, ResolveError> {
        let resolvers = self.resolvers();
        let selected: Vec<&str> = match types {
            Some(types) if !types.is_empty() => types.iter().map(String::as_str).collect(),
            _ => resolvers.keys().map(String::as_str).collect(),
        };

        let mut names = BTreeSet::new();
        for reference_type in selected {
            let Some(resolver) = resolvers.get(reference_type) else {
                tracing::warn!(
                    "unsupported reference type `{}`, known types: [{}]",
                    reference_type,
                    self.reference_types().join(", ")
                );
                continue;
            };
            if !resolver.can_handle(project) {
                continue;
            }

            let found = resolver.resolve_referenced_projects(project, context)?;
            tracing::debug!(
                "`{}` references [{}] ({})",
                project.name(),
                found.iter().cloned().collect::<Vec<_>>().join(", "),
                reference_type
            );
            names.extend(found);
        }

        names.remove(project.name());
        Ok(names)
    }
}

impl fmt::Debug for ReferencedProjectsResolverService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferencedProjectsResolverService")
            .field("table", &self.table)
            .field("initialized", &self.resolvers.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{global_context, WorkspaceBuilder};

    fn types(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_table() {
        let service = ReferencedProjectsResolverService::new(None);
        assert_eq!(service.reference_types(), vec!["cdt", "jdt", "pde", "platform", "pydt"]);
    }

    #[test]
    fn test_unions_all_types() {
        let ws = WorkspaceBuilder::new()
            .java_project("core", &[])
            .java_project("extra", &[])
            .java_project_with("app", |p| p.source("src").project_entry("core").reference("extra"))
            .build();
        let gctx = global_context(ws.root());
        let context = ReferenceContext::new(&ws, &gctx);
        let service = ReferencedProjectsResolverService::new(None);
        let app = ws.project("app").unwrap();

        let all = service.resolve_referenced_projects(app, None, &context).unwrap();
        assert_eq!(all.iter().map(String::as_str).collect::<Vec<_>>(), vec!["core", "extra"]);

        let jdt_only = service
            .resolve_referenced_projects(app, Some(types(&["jdt"]).as_slice()), &context)
            .unwrap();
        assert_eq!(jdt_only.iter().map(String::as_str).collect::<Vec<_>>(), vec!["core"]);

        let empty_means_all = service.resolve_referenced_projects(app, Some(&[][..]), &context).unwrap();
        assert_eq!(empty_means_all, all);
    }

    #[test]
    fn test_idempotent() {
        let ws = WorkspaceBuilder::new()
            .java_project("core", &[])
            .java_project("app", &["core"])
            .build();
        let gctx = global_context(ws.root());
        let context = ReferenceContext::new(&ws, &gctx);
        let service = ReferencedProjectsResolverService::new(None);
        let app = ws.project("app").unwrap();

        let first = service.resolve_referenced_projects(app, None, &context).unwrap();
        let second = service.resolve_referenced_projects(app, None, &context).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_type_contributes_nothing() {
        let ws = WorkspaceBuilder::new()
            .java_project("core", &[])
            .java_project("app", &["core"])
            .build();
        let gctx = global_context(ws.root());
        let context = ReferenceContext::new(&ws, &gctx);
        let service = ReferencedProjectsResolverService::new(None);

        let names = service
            .resolve_referenced_projects(ws.project("app").unwrap(), Some(types(&["nonexistent"]).as_slice()), &context)
            .unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_python_references_under_pydt() {
        let ws = WorkspaceBuilder::new()
            .dltk_project("shared", &[])
            .dltk_project("scripts", &["shared"])
            .build();
        let gctx = global_context(ws.root());
        let context = ReferenceContext::new(&ws, &gctx);
        let service = ReferencedProjectsResolverService::new(None);

        let names = service
            .resolve_referenced_projects(ws.project("scripts").unwrap(), Some(types(&["pydt"]).as_slice()), &context)
            .unwrap();
        assert_eq!(names.iter().map(String::as_str).collect::<Vec<_>>(), vec!["shared"]);
    }

    #[test]
    fn test_empty_configuration() {
        let ws = WorkspaceBuilder::new()
            .java_project("core", &[])
            .java_project("app", &["core"])
            .build();
        let gctx = global_context(ws.root());
        let context = ReferenceContext::new(&ws, &gctx);
        let service = ReferencedProjectsResolverService::new(Some(BTreeMap::new()));

        assert!(service.reference_types().is_empty());
        let names = service
            .resolve_referenced_projects(ws.project("app").unwrap(), None, &context)
            .unwrap();
        assert!(names.is_empty());
    }
}
