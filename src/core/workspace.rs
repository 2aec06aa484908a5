//! Workspace - the set of projects all resolution starts from.
//!
//! A workspace is a directory whose (nested up to one level) subdirectories
//! carry a `.project` file. Projects with unreadable metadata do not fail the
//! workspace: they are recorded as broken and only fail the lookups that
//! actually touch them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::project::{EclipseProject, ProjectError, PROJECT_FILE};
use crate::resolver::errors::ResolveError;

/// Directory Eclipse keeps its own workspace state in.
pub const METADATA_DIR: &str = ".metadata";

/// A project whose metadata could not be read.
#[derive(Debug, Clone)]
pub struct BrokenProject {
    pub location: PathBuf,
    pub path: Option<PathBuf>,
    pub message: String,
}

/// An Eclipse workspace.
#[derive(Debug, Default)]
pub struct Workspace {
    root: PathBuf,
    projects: BTreeMap<String, EclipseProject>,
    broken: BTreeMap<String, BrokenProject>,
}

impl Workspace {
    /// Scan `root` for projects.
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("workspace directory does not exist: {}", root.display());
        }

        let mut ws = Workspace {
            root: root.to_path_buf(),
            ..Default::default()
        };

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(3)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != METADATA_DIR && e.file_name() != ".git");

        for entry in walker {
            let entry = entry.with_context(|| format!("failed to scan workspace {}", root.display()))?;
            if entry.file_type().is_file() && entry.file_name() == PROJECT_FILE {
                if let Some(dir) = entry.path().parent() {
                    ws.load_project(dir);
                }
            }
        }

        tracing::info!(
            "loaded workspace {} ({} projects, {} broken)",
            root.display(),
            ws.projects.len(),
            ws.broken.len()
        );
        Ok(ws)
    }

    fn load_project(&mut self, dir: &Path) {
        match EclipseProject::load(dir) {
            Ok(project) => self.insert(project),
            Err(err) => {
                let name = dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| dir.display().to_string());
                tracing::warn!("project `{}` has malformed metadata: {}", name, error_chain(&err));
                self.broken.insert(
                    name,
                    BrokenProject {
                        location: dir.to_path_buf(),
                        path: err.path().map(Path::to_path_buf),
                        message: error_chain(&err),
                    },
                );
            }
        }
    }

    /// Build a workspace from already constructed projects.
    pub fn from_projects(root: impl Into<PathBuf>, projects: impl IntoIterator<Item = EclipseProject>) -> Self {
        let mut ws = Workspace {
            root: root.into(),
            ..Default::default()
        };
        for project in projects {
            ws.insert(project);
        }
        ws
    }

    fn insert(&mut self, project: EclipseProject) {
        if let Some(existing) = self.projects.get(project.name()) {
            tracing::warn!(
                "duplicate project `{}` at {} (keeping {})",
                project.name(),
                project.location().display(),
                existing.location().display()
            );
            return;
        }
        self.projects.insert(project.name().to_string(), project);
    }

    /// The workspace directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check whether a healthy project with this name exists.
    pub fn has_project(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    /// Look up a project.
    pub fn project(&self, name: &str) -> Result<&EclipseProject, ResolveError> {
        if let Some(project) = self.projects.get(name) {
            return Ok(project);
        }

        if let Some(broken) = self.broken.get(name) {
            return Err(ResolveError::MalformedConfiguration {
                project: name.to_string(),
                path: broken.path.clone(),
                message: broken.message.clone(),
            });
        }

        Err(ResolveError::UnknownProject {
            name: name.to_string(),
            suggestions: self.similar_names(name),
        })
    }

    /// Look up several projects. Missing ones either fail the call or are
    /// skipped with a warning.
    pub fn projects(&self, names: &[String], fail_on_missing: bool) -> Result<Vec<&EclipseProject>, ResolveError> {
        let mut found = Vec::with_capacity(names.len());
        for name in names {
            match self.project(name) {
                Ok(project) => found.push(project),
                Err(err) if fail_on_missing => return Err(err),
                Err(err) => tracing::warn!("skipping project `{}`: {}", name, err),
            }
        }
        Ok(found)
    }

    /// All healthy projects, ordered by name.
    pub fn all_projects(&self) -> impl Iterator<Item = &EclipseProject> + '_ {
        self.projects.values()
    }

    /// Names of all healthy projects, ordered.
    pub fn project_names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    /// Projects that could not be loaded.
    pub fn broken_projects(&self) -> impl Iterator<Item = (&str, &BrokenProject)> + '_ {
        self.broken.iter().map(|(name, broken)| (name.as_str(), broken))
    }

    /// Plug-in projects whose bundle has the given symbolic name.
    pub fn projects_with_bundle(&self, symbolic_name: &str) -> impl Iterator<Item = &EclipseProject> + '_ {
        let symbolic_name = symbolic_name.to_string();
        self.projects.values().filter(move |p| {
            p.plugin_role()
                .is_some_and(|role| role.bundle().symbolic_name == symbolic_name)
        })
    }

    fn similar_names(&self, name: &str) -> Vec<String> {
        let wanted = name.to_lowercase();
        self.projects
            .keys()
            .filter(|candidate| {
                let candidate = candidate.to_lowercase();
                candidate == wanted || candidate.starts_with(&wanted) || wanted.starts_with(&candidate)
            })
            .cloned()
            .collect()
    }
}

fn error_chain(err: &ProjectError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
