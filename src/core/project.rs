//! Eclipse projects: the `.project` description plus nature roles.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::roles::{
    CProjectRole, JavaProjectRole, PluginProjectRole, PythonProjectRole, CPP_NATURE, C_NATURE,
    DLTK_PYTHON_NATURE, JAVA_NATURE, PLUGIN_NATURE, PYDEV_NATURE,
};
use crate::xquery::{XQueryError, XQueryHandler};

/// Name of the project description file.
pub const PROJECT_FILE: &str = ".project";

/// Errors raised while reading project metadata.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed metadata in `{}`: {message}", .path.display())]
    Metadata { path: PathBuf, message: String },

    #[error("malformed bundle manifest `{}`: {message}", .path.display())]
    Manifest { path: PathBuf, message: String },

    #[error(transparent)]
    Query(#[from] XQueryError),
}

impl ProjectError {
    /// Attribute a query failure to the file it was evaluated on.
    pub(crate) fn at(path: &Path, err: XQueryError) -> Self {
        match err {
            XQueryError::Xml { source, .. } => ProjectError::Metadata {
                path: path.to_path_buf(),
                message: source.to_string(),
            },
            XQueryError::Io { path, source } => ProjectError::Io { path, source },
            other => ProjectError::Query(other),
        }
    }

    /// The metadata file the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ProjectError::Io { path, .. }
            | ProjectError::Metadata { path, .. }
            | ProjectError::Manifest { path, .. } => Some(path),
            ProjectError::Query(_) => None,
        }
    }
}

/// A project of an Eclipse workspace.
#[derive(Debug, Clone)]
pub struct EclipseProject {
    name: String,
    location: PathBuf,
    comment: String,
    natures: Vec<String>,
    referenced_projects: Vec<String>,
    java: Option<JavaProjectRole>,
    plugin: Option<PluginProjectRole>,
    c: Option<CProjectRole>,
    python: Option<PythonProjectRole>,
}

impl EclipseProject {
    /// Create a project without natures or roles.
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        EclipseProject {
            name: name.into(),
            location: location.into(),
            comment: String::new(),
            natures: Vec::new(),
            referenced_projects: Vec::new(),
            java: None,
            plugin: None,
            c: None,
            python: None,
        }
    }

    /// Load a project from its directory, reading `.project` and the
    /// metadata of every recognised nature.
    pub fn load(dir: &Path) -> Result<Self, ProjectError> {
        let description = dir.join(PROJECT_FILE);

        let mut handler = XQueryHandler::new();
        let name = handler.add_query("/projectDescription/name")?;
        let comment = handler.add_query("/projectDescription/comment")?;
        let projects = handler.add_query("/projectDescription/projects/project")?;
        let natures = handler.add_query("/projectDescription/natures/nature")?;

        let results = handler
            .query_file(&description)
            .map_err(|e| ProjectError::at(&description, e))?;

        let name = results
            .single(name)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ProjectError::Metadata {
                path: description.clone(),
                message: "missing <name> element".to_string(),
            })?;

        let mut project = EclipseProject::new(name, dir);
        project.comment = results.single(comment).unwrap_or_default().to_string();
        project.referenced_projects = results.values(projects).map(str::to_string).collect();
        project.natures = results.values(natures).map(str::to_string).collect();

        if project.has_nature(JAVA_NATURE) {
            project.java = Some(JavaProjectRole::load(dir)?);
        }
        if project.has_nature(PLUGIN_NATURE) {
            project.plugin = Some(PluginProjectRole::load(dir)?);
        }
        if project.has_nature(C_NATURE) || project.has_nature(CPP_NATURE) {
            project.c = Some(CProjectRole {
                cpp: project.has_nature(CPP_NATURE),
            });
        }
        if project.has_nature(DLTK_PYTHON_NATURE) {
            project.python = Some(PythonProjectRole::load_dltk(dir)?);
        } else if project.has_nature(PYDEV_NATURE) {
            project.python = Some(PythonProjectRole::load_pydev(dir, &project.referenced_projects)?);
        }

        tracing::debug!(
            "loaded project `{}` with natures [{}]",
            project.name,
            project.natures.join(", ")
        );
        Ok(project)
    }

    pub fn with_nature(mut self, nature: impl Into<String>) -> Self {
        self.natures.push(nature.into());
        self
    }

    pub fn with_referenced_project(mut self, name: impl Into<String>) -> Self {
        self.referenced_projects.push(name.into());
        self
    }

    pub fn with_java_role(mut self, role: JavaProjectRole) -> Self {
        if !self.has_nature(JAVA_NATURE) {
            self.natures.push(JAVA_NATURE.to_string());
        }
        self.java = Some(role);
        self
    }

    pub fn with_plugin_role(mut self, role: PluginProjectRole) -> Self {
        if !self.has_nature(PLUGIN_NATURE) {
            self.natures.push(PLUGIN_NATURE.to_string());
        }
        self.plugin = Some(role);
        self
    }

    pub fn with_c_role(mut self, role: CProjectRole) -> Self {
        let nature = if role.cpp { CPP_NATURE } else { C_NATURE };
        if !self.has_nature(nature) {
            self.natures.push(nature.to_string());
        }
        self.c = Some(role);
        self
    }

    pub fn with_python_role(mut self, role: PythonProjectRole) -> Self {
        self.python = Some(role);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory containing the project.
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn natures(&self) -> &[String] {
        &self.natures
    }

    pub fn has_nature(&self, nature: &str) -> bool {
        self.natures.iter().any(|n| n == nature)
    }

    /// Projects listed in the `<projects>` element of `.project`.
    pub fn referenced_projects(&self) -> &[String] {
        &self.referenced_projects
    }

    pub fn java_role(&self) -> Option<&JavaProjectRole> {
        self.java.as_ref()
    }

    pub fn plugin_role(&self) -> Option<&PluginProjectRole> {
        self.plugin.as_ref()
    }

    pub fn c_role(&self) -> Option<&CProjectRole> {
        self.c.as_ref()
    }

    pub fn python_role(&self) -> Option<&PythonProjectRole> {
        self.python.as_ref()
    }

    /// Resolve a project-relative path.
    pub fn child(&self, relative: &str) -> PathBuf {
        crate::util::fs::join_eclipse_path(&self.location, relative)
    }
}

impl PartialEq for EclipseProject {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.location == other.location
    }
}

impl Eq for EclipseProject {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_java_project() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(".project"),
            r#"<?xml version="1.0" encoding="UTF-8"?>
<projectDescription>
	<name>app</name>
	<comment></comment>
	<projects>
		<project>core</project>
	</projects>
	<buildSpec/>
	<natures>
		<nature>org.eclipse.jdt.core.javanature</nature>
	</natures>
</projectDescription>"#,
        )
        .unwrap();
        std::fs::write(
            tmp.path().join(".classpath"),
            r#"<classpath><classpathentry kind="src" path="src"/></classpath>"#,
        )
        .unwrap();

        let project = EclipseProject::load(tmp.path()).unwrap();
        assert_eq!(project.name(), "app");
        assert_eq!(project.referenced_projects(), ["core".to_string()]);
        assert!(project.java_role().is_some());
        assert!(project.plugin_role().is_none());
        assert_eq!(project.child("src/Main.java"), tmp.path().join("src").join("Main.java"));
    }

    #[test]
    fn test_missing_classpath_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(".project"),
            "<projectDescription><name>broken</name><natures>\
             <nature>org.eclipse.jdt.core.javanature</nature></natures></projectDescription>",
        )
        .unwrap();

        let err = EclipseProject::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::Io { .. }));
        assert!(err.path().unwrap().ends_with(".classpath"));
    }

    #[test]
    fn test_builder_adds_natures() {
        let project = EclipseProject::new("c-lib", "/ws/c-lib").with_c_role(CProjectRole { cpp: true });
        assert!(project.has_nature(CPP_NATURE));
        assert!(project.c_role().unwrap().cpp);
    }
}
