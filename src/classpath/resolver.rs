//! Resolution of JDT raw classpaths into concrete locations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::classpath::context::{ClasspathResolverContext, ResolveOptions};
use crate::classpath::entry::{ResolvedClasspath, ResolvedClasspathEntry};
use crate::core::classpath_entry::{EntryKind, RawClasspathEntry};
use crate::core::project::EclipseProject;
use crate::core::roles::JAVA_NATURE;
use crate::core::workspace::Workspace;
use crate::resolver::errors::ResolveError;
use crate::util::context::GlobalContext;
use crate::util::fs::join_eclipse_path;

/// Resolve the classpath of a Java project.
pub fn resolve_jdt_classpath(
    workspace: &Workspace,
    gctx: &GlobalContext,
    project: &str,
    options: ResolveOptions,
    arguments: &BTreeMap<String, String>,
) -> Result<ResolvedClasspath, ResolveError> {
    let mut context = ClasspathResolverContext::new(workspace, gctx, options).with_arguments(arguments);
    context.resolve_project_classpath(project)?;

    let classpath = context.into_classpath();
    tracing::info!(
        "resolved classpath of `{}`: {} entries{}",
        project,
        classpath.entries().len(),
        if classpath.boot_classpath().is_some() { " plus boot classpath" } else { "" }
    );
    Ok(classpath)
}

/// Add the entries of `project` to the context, recursing into referenced
/// projects. Only the root project contributes its non-exported entries.
pub(crate) fn resolve_project_entries(
    context: &mut ClasspathResolverContext<'_>,
    project: &EclipseProject,
) -> Result<(), ResolveError> {
    let is_root = context.is_current_project_root();

    let Some(java) = project.java_role() else {
        if is_root {
            return Err(ResolveError::MalformedConfiguration {
                project: project.name().to_string(),
                path: None,
                message: format!("not a Java project (missing {})", JAVA_NATURE),
            });
        }
        tracing::debug!("`{}` is not a Java project, nothing to add", project.name());
        return Ok(());
    };

    tracing::debug!("resolving classpath entries of `{}` (root: {})", project.name(), is_root);

    for entry in java.raw_classpath_entries() {
        let visible = is_root || entry.exported;

        match entry.kind {
            EntryKind::Source => {
                if is_root && !context.is_runtime_classpath() {
                    continue;
                }
                let output = join_eclipse_path(project.location(), java.output_folder_for(entry));
                context.add_classpath_entry(ResolvedClasspathEntry::single(output));
            }
            EntryKind::Library if visible => {
                let location = library_location(context.workspace(), project, &entry.path);
                context.add_classpath_entry(ResolvedClasspathEntry::single(location));
            }
            EntryKind::Variable if visible => {
                if let Some(location) = variable_location(context, project, &entry.path) {
                    context.add_classpath_entry(ResolvedClasspathEntry::single(location));
                }
            }
            EntryKind::Project if visible => {
                let start = context.entries().len();
                context.resolve_project_classpath(&entry.path)?;
                // combineaccessrules="false": the referenced project's
                // restrictions do not carry over
                if !entry.combine_access_rules {
                    context.clear_access_restrictions_since(start);
                }
            }
            EntryKind::Container if visible => resolve_container(context, project, entry)?,
            _ => {}
        }
    }

    Ok(())
}

fn resolve_container(
    context: &mut ClasspathResolverContext<'_>,
    project: &EclipseProject,
    entry: &RawClasspathEntry,
) -> Result<(), ResolveError> {
    let service = context.gctx().container_resolvers();
    match service.resolver_for(entry, context) {
        Some(resolver) => {
            tracing::debug!("container `{}` handled by `{}`", entry.path, resolver.identifier());
            resolver.resolve_container(entry, context)
        }
        None => Err(ResolveError::ContainerNotHandled {
            project: project.name().to_string(),
            container: entry.path.clone(),
        }),
    }
}

/// Locate a library entry.
///
/// `/other/lib/a.jar` points into the workspace project `other` when it
/// exists and is an absolute filesystem path otherwise. Relative paths are
/// relative to the project.
fn library_location(workspace: &Workspace, project: &EclipseProject, path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('/') {
        let (owner, remainder) = rest.split_once('/').unwrap_or((rest, ""));
        if let Ok(owner) = workspace.project(owner) {
            return join_eclipse_path(owner.location(), remainder);
        }
        return PathBuf::from(path);
    }

    if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        join_eclipse_path(project.location(), path)
    }
}

fn variable_location(
    context: &ClasspathResolverContext<'_>,
    project: &EclipseProject,
    path: &str,
) -> Option<PathBuf> {
    let (name, rest) = path.split_once('/').unwrap_or((path, ""));
    match context.gctx().elements().variable(name) {
        Some(variable) => Some(join_eclipse_path(variable.path(), rest)),
        None => {
            tracing::warn!(
                "unbound classpath variable `{}` in project `{}`, skipping `{}`",
                name,
                project.name(),
                path
            );
            None
        }
    }
}
