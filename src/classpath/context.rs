//! The per-pass accumulator threaded through classpath resolution.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::marker::PhantomData;

use crate::classpath::entry::{ResolvedClasspath, ResolvedClasspathEntry};
use crate::classpath::resolver::resolve_project_entries;
use crate::core::project::EclipseProject;
use crate::core::workspace::Workspace;
use crate::graph::GraphError;
use crate::resolver::errors::ResolveError;
use crate::util::context::GlobalContext;

/// How a classpath is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Render locations relative to the workspace root.
    pub workspace_relative: bool,
    /// Resolve the runtime classpath (includes the root project's own output).
    pub runtime_classpath: bool,
}

pub(crate) static NO_ARGUMENTS: BTreeMap<String, String> = BTreeMap::new();

/// Mutable state of one top-level classpath resolution.
///
/// Created for a single request and dropped once its entries are taken. The
/// context is neither `Send` nor `Sync`.
pub struct ClasspathResolverContext<'a> {
    workspace: &'a Workspace,
    gctx: &'a GlobalContext,
    options: ResolveOptions,
    arguments: &'a BTreeMap<String, String>,
    root: Option<String>,
    current: Option<String>,
    entries: Vec<ResolvedClasspathEntry>,
    boot: Option<ResolvedClasspathEntry>,
    referenced_projects: BTreeSet<String>,
    /// Projects currently being resolved, outermost first.
    stack: Vec<String>,
    resolved: HashSet<String>,
    _not_send_sync: PhantomData<*const ()>,
}

impl<'a> ClasspathResolverContext<'a> {
    pub fn new(workspace: &'a Workspace, gctx: &'a GlobalContext, options: ResolveOptions) -> Self {
        ClasspathResolverContext {
            workspace,
            gctx,
            options,
            arguments: &NO_ARGUMENTS,
            root: None,
            current: None,
            entries: Vec::new(),
            boot: None,
            referenced_projects: BTreeSet::new(),
            stack: Vec::new(),
            resolved: HashSet::new(),
            _not_send_sync: PhantomData,
        }
    }

    /// Attach caller-supplied container arguments.
    pub fn with_arguments(mut self, arguments: &'a BTreeMap<String, String>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Make `project` the root and current project without resolving it.
    pub(crate) fn entered(mut self, project: &str) -> Self {
        self.root = Some(project.to_string());
        self.current = Some(project.to_string());
        self
    }

    pub fn workspace(&self) -> &'a Workspace {
        self.workspace
    }

    pub fn gctx(&self) -> &'a GlobalContext {
        self.gctx
    }

    pub fn current_project_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_project(&self) -> Option<&'a EclipseProject> {
        let name = self.current.as_deref()?;
        self.workspace.project(name).ok()
    }

    /// Whether the project being resolved is the one the request started from.
    pub fn is_current_project_root(&self) -> bool {
        self.current.is_some() && self.current == self.root
    }

    pub fn is_runtime_classpath(&self) -> bool {
        self.options.runtime_classpath
    }

    /// Look up a container argument. Absent keys yield `None`.
    pub fn container_argument(&self, key: &str) -> Option<&'a str> {
        self.arguments.get(key).map(String::as_str)
    }

    /// Append a regular entry. Identical entries are only kept once.
    pub fn add_classpath_entry(&mut self, entry: ResolvedClasspathEntry) {
        if self.entries.contains(&entry) {
            tracing::debug!("skipping duplicate classpath entry {:?}", entry.locations());
            return;
        }
        self.entries.push(entry);
    }

    /// Drop the access restrictions of the entries added since `start`.
    pub(crate) fn clear_access_restrictions_since(&mut self, start: usize) {
        for entry in self.entries.iter_mut().skip(start) {
            entry.clear_access_restrictions();
        }
    }

    /// Set the boot classpath. Only the first one is kept.
    pub fn set_boot_classpath_entry(&mut self, entry: ResolvedClasspathEntry) {
        if self.boot.is_some() {
            tracing::warn!(
                "ignoring second boot classpath contributed by `{}`",
                self.current.as_deref().unwrap_or("<none>")
            );
            return;
        }
        self.boot = Some(entry);
    }

    pub fn has_boot_classpath_entry(&self) -> bool {
        self.boot.is_some()
    }

    pub fn entries(&self) -> &[ResolvedClasspathEntry] {
        &self.entries
    }

    /// Record projects a container implies a dependency on.
    pub fn add_referenced_projects(&mut self, projects: impl IntoIterator<Item = impl Into<String>>) {
        self.referenced_projects.extend(projects.into_iter().map(Into::into));
    }

    pub fn referenced_projects(&self) -> &BTreeSet<String> {
        &self.referenced_projects
    }

    /// Resolve the classpath of a workspace project into this context.
    ///
    /// The first project resolved becomes the root. A project that is
    /// reached again while it is still being resolved is a cycle; a project
    /// that was already resolved is skipped.
    pub fn resolve_project_classpath(&mut self, name: &str) -> Result<(), ResolveError> {
        if let Some(start) = self.stack.iter().position(|p| p == name) {
            let mut cycle = self.stack[start..].to_vec();
            cycle.push(name.to_string());
            return Err(GraphError::CyclicDependency { cycle }.into());
        }
        if self.resolved.contains(name) {
            tracing::debug!("classpath of `{}` already resolved", name);
            return Ok(());
        }

        let project = self.workspace.project(name)?;
        if self.root.is_none() {
            self.root = Some(name.to_string());
        }
        let previous = self.current.replace(name.to_string());
        self.stack.push(name.to_string());

        let result = resolve_project_entries(self, project);

        self.stack.pop();
        self.current = previous;
        self.resolved.insert(name.to_string());
        result
    }

    /// Finish the pass.
    pub fn into_classpath(self) -> ResolvedClasspath {
        let entries = if self.options.workspace_relative {
            let root = self.workspace.root();
            self.entries.into_iter().map(|e| e.relative_to(root)).collect()
        } else {
            self.entries
        };
        ResolvedClasspath::new(self.boot, entries)
    }
}
