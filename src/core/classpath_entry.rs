//! Raw classpath entries as written in a project's `.classpath`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::core::project::ProjectError;
use crate::xquery::XQueryHandler;

/// Name of the JDT classpath description file.
pub const CLASSPATH_FILE: &str = ".classpath";

/// Kind of a raw classpath entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Source,
    Library,
    Project,
    Container,
    Variable,
    Output,
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "src" => Ok(EntryKind::Source),
            "lib" => Ok(EntryKind::Library),
            "con" => Ok(EntryKind::Container),
            "var" => Ok(EntryKind::Variable),
            "output" => Ok(EntryKind::Output),
            other => Err(format!("unknown classpath entry kind `{}`", other)),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryKind::Source => "src",
            EntryKind::Library => "lib",
            EntryKind::Project => "project",
            EntryKind::Container => "con",
            EntryKind::Variable => "var",
            EntryKind::Output => "output",
        };
        write!(f, "{}", s)
    }
}

/// One `<classpathentry>` of a `.classpath` file.
///
/// In the file, project references are `kind="src"` entries whose path
/// starts with `/`; they are normalised to [`EntryKind::Project`] here and
/// the leading slash is dropped from the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawClasspathEntry {
    pub kind: EntryKind,
    pub path: String,
    pub output: Option<String>,
    pub exported: bool,
    pub combine_access_rules: bool,
}

impl RawClasspathEntry {
    pub fn new(kind: EntryKind, path: impl Into<String>) -> Self {
        RawClasspathEntry {
            kind,
            path: path.into(),
            output: None,
            exported: false,
            combine_access_rules: true,
        }
    }

    pub fn source(path: impl Into<String>) -> Self {
        Self::new(EntryKind::Source, path)
    }

    pub fn library(path: impl Into<String>) -> Self {
        Self::new(EntryKind::Library, path)
    }

    pub fn project(name: impl Into<String>) -> Self {
        Self::new(EntryKind::Project, name)
    }

    pub fn container(path: impl Into<String>) -> Self {
        Self::new(EntryKind::Container, path)
    }

    pub fn variable(path: impl Into<String>) -> Self {
        Self::new(EntryKind::Variable, path)
    }

    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// First segment of the path: the variable name of a variable entry,
    /// the container id of a container entry.
    pub fn first_segment(&self) -> &str {
        self.path.split('/').next().unwrap_or_default()
    }
}

/// Parse the contents of a `.classpath` file.
pub fn parse_classpath(contents: &str, origin: &Path) -> Result<Vec<RawClasspathEntry>, ProjectError> {
    let mut handler = XQueryHandler::new();
    let kinds = handler.add_query("/classpath/classpathentry/@kind")?;
    let paths = handler.add_query("/classpath/classpathentry/@path")?;
    let outputs = handler.add_query("/classpath/classpathentry/@output")?;
    let exported = handler.add_query("/classpath/classpathentry/@exported")?;
    let combine = handler.add_query("/classpath/classpathentry/@combineaccessrules")?;

    let results = handler.query_str(contents).map_err(|e| ProjectError::at(origin, e))?;

    let malformed = |message: String| ProjectError::Metadata {
        path: origin.to_path_buf(),
        message,
    };

    let mut entries = Vec::with_capacity(results.count(kinds));
    for i in 0..results.count(kinds) {
        let kind = results.get(kinds)[i]
            .as_deref()
            .ok_or_else(|| malformed(format!("classpath entry #{} has no kind", i + 1)))?;
        let path = results.get(paths)[i]
            .as_deref()
            .ok_or_else(|| malformed(format!("classpath entry #{} has no path", i + 1)))?;

        let mut kind: EntryKind = kind.parse().map_err(malformed)?;
        let mut path = path.to_string();
        if kind == EntryKind::Source && path.starts_with('/') {
            kind = EntryKind::Project;
            path = path.trim_start_matches('/').to_string();
        }

        entries.push(RawClasspathEntry {
            kind,
            path,
            output: results.get(outputs)[i].clone(),
            exported: results.get(exported)[i].as_deref() == Some("true"),
            combine_access_rules: results.get(combine)[i].as_deref() != Some("false"),
        });
    }

    Ok(entries)
}
