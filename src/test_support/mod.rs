//! Test utilities for unit tests.
//!
//! Workspaces are written as real Eclipse metadata into a temporary
//! directory and loaded through [`Workspace::load`], so tests exercise the
//! same parsing path as the binary.
//!
//! # Example
//!
//! ```rust,ignore
//! let ws = WorkspaceBuilder::new()
//!     .java_project("core", &[])
//!     .java_project_with("app", |p| p.source("src").project_entry("core"))
//!     .build();
//! let gctx = global_context(ws.root());
//! ```

pub mod fixtures;

use std::ops::Deref;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::workspace::Workspace;
use crate::util::config::Config;
use crate::util::context::GlobalContext;

pub use fixtures::ProjectFixture;

/// Collects project fixtures and writes them into a fresh workspace.
#[derive(Debug, Default)]
pub struct WorkspaceBuilder {
    projects: Vec<ProjectFixture>,
    raw_files: Vec<(String, PathBuf, String)>,
}

impl WorkspaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A Java project with a `src` folder and project entries for `dependencies`.
    pub fn java_project(self, name: &str, dependencies: &[&str]) -> Self {
        let project = dependencies
            .iter()
            .fold(ProjectFixture::java(name).source("src"), |p, d| p.project_entry(d));
        self.project(project)
    }

    /// A Java project whose `.classpath` is built by `f`.
    pub fn java_project_with(self, name: &str, f: impl FnOnce(ProjectFixture) -> ProjectFixture) -> Self {
        self.project(f(ProjectFixture::java(name)))
    }

    /// A plug-in project; `manifest_body` follows `Manifest-Version`.
    pub fn plugin_project(self, name: &str, manifest_body: &str) -> Self {
        self.project(ProjectFixture::plugin(name, manifest_body))
    }

    pub fn c_project(self, name: &str) -> Self {
        self.project(ProjectFixture::c(name))
    }

    pub fn dltk_project(self, name: &str, projects: &[&str]) -> Self {
        self.project(ProjectFixture::dltk(name, projects))
    }

    pub fn pydev_project(self, name: &str, references: &[&str]) -> Self {
        self.project(ProjectFixture::pydev(name, references))
    }

    pub fn project(mut self, project: ProjectFixture) -> Self {
        self.projects.push(project);
        self
    }

    /// Write `contents` to `<project>/<path>` verbatim, after all fixtures.
    pub fn raw_file(mut self, project: &str, path: &str, contents: &str) -> Self {
        self.raw_files
            .push((project.to_string(), PathBuf::from(path), contents.to_string()));
        self
    }

    pub fn build(self) -> TestWorkspace {
        let dir = TempDir::new().expect("create temp workspace");
        for project in &self.projects {
            project.write_to(dir.path()).expect("write project fixture");
        }
        for (project, path, contents) in &self.raw_files {
            let path = dir.path().join(project).join(path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("create fixture directory");
            }
            std::fs::write(path, contents).expect("write raw fixture");
        }

        let workspace = Workspace::load(dir.path()).expect("load workspace");
        TestWorkspace { _dir: dir, workspace }
    }
}

/// A loaded workspace that owns its temporary directory.
#[derive(Debug)]
pub struct TestWorkspace {
    _dir: TempDir,
    workspace: Workspace,
}

impl Deref for TestWorkspace {
    type Target = Workspace;

    fn deref(&self) -> &Workspace {
        &self.workspace
    }
}

/// A context rooted at `root` with no runtime detection and the built-in
/// resolver tables.
pub fn global_context(root: &Path) -> GlobalContext {
    let mut config = Config::default();
    config.jre.detect = false;
    GlobalContext::with_cwd(root.to_path_buf())
        .with_config(config)
        .expect("build test context")
}
