//! Nature-specific project roles.
//!
//! A role carries the metadata one technology (Java, PDE, CDT, Python) keeps
//! about a project. Roles are derived from the natures in `.project` and
//! parsed eagerly when the project is loaded.

use std::path::Path;

use serde::Serialize;

use crate::core::bundle::BundleDescription;
use crate::core::classpath_entry::{parse_classpath, EntryKind, RawClasspathEntry, CLASSPATH_FILE};
use crate::core::project::ProjectError;
use crate::util::properties::Properties;
use crate::xquery::XQueryHandler;

pub const JAVA_NATURE: &str = "org.eclipse.jdt.core.javanature";
pub const PLUGIN_NATURE: &str = "org.eclipse.pde.PluginNature";
pub const C_NATURE: &str = "org.eclipse.cdt.core.cnature";
pub const CPP_NATURE: &str = "org.eclipse.cdt.core.ccnature";
pub const PYDEV_NATURE: &str = "org.python.pydev.pythonNature";
pub const DLTK_PYTHON_NATURE: &str = "org.eclipse.dltk.python.core.nature";

/// Default JDT output folder when `.classpath` declares none.
pub const DEFAULT_OUTPUT_FOLDER: &str = "bin";

fn read(path: &Path) -> Result<String, ProjectError> {
    std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Java (JDT) role: the raw classpath.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JavaProjectRole {
    entries: Vec<RawClasspathEntry>,
}

impl JavaProjectRole {
    pub fn new(entries: Vec<RawClasspathEntry>) -> Self {
        JavaProjectRole { entries }
    }

    pub fn load(project_dir: &Path) -> Result<Self, ProjectError> {
        let path = project_dir.join(CLASSPATH_FILE);
        let contents = read(&path)?;
        Ok(JavaProjectRole::new(parse_classpath(&contents, &path)?))
    }

    pub fn raw_classpath_entries(&self) -> &[RawClasspathEntry] {
        &self.entries
    }

    pub fn entries_of_kind(&self, kind: EntryKind) -> impl Iterator<Item = &RawClasspathEntry> + '_ {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// The project-relative default output folder.
    pub fn default_output_folder(&self) -> &str {
        self.entries_of_kind(EntryKind::Output)
            .next()
            .map(|e| e.path.as_str())
            .unwrap_or(DEFAULT_OUTPUT_FOLDER)
    }

    /// Output folder of a source entry.
    pub fn output_folder_for<'a>(&'a self, source: &'a RawClasspathEntry) -> &'a str {
        source.output.as_deref().unwrap_or_else(|| self.default_output_folder())
    }

    /// All distinct output folders, in classpath order.
    pub fn output_folders(&self) -> Vec<&str> {
        let mut folders: Vec<&str> = Vec::new();
        for source in self.entries_of_kind(EntryKind::Source) {
            let folder = self.output_folder_for(source);
            if !folders.contains(&folder) {
                folders.push(folder);
            }
        }
        if folders.is_empty() {
            folders.push(self.default_output_folder());
        }
        folders
    }
}

/// PDE plug-in role: bundle manifest plus `build.properties`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginProjectRole {
    bundle: BundleDescription,
    build_properties: Properties,
}

impl PluginProjectRole {
    pub fn new(bundle: BundleDescription, build_properties: Properties) -> Self {
        PluginProjectRole {
            bundle,
            build_properties,
        }
    }

    pub fn load(project_dir: &Path) -> Result<Self, ProjectError> {
        let bundle = BundleDescription::from_directory(project_dir)?;

        let properties_path = project_dir.join("build.properties");
        let build_properties = if properties_path.exists() {
            Properties::parse(&read(&properties_path)?)
        } else {
            Properties::new()
        };

        Ok(PluginProjectRole::new(bundle, build_properties))
    }

    pub fn bundle(&self) -> &BundleDescription {
        &self.bundle
    }

    pub fn build_properties(&self) -> &Properties {
        &self.build_properties
    }

    /// Output folders `build.properties` assigns to a bundle classpath library.
    pub fn library_output(&self, library: &str) -> Vec<String> {
        self.build_properties.get_list(&format!("output.{}", library))
    }
}

/// C/C++ (CDT) role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CProjectRole {
    pub cpp: bool,
}

/// Python tooling that owns a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PythonFlavour {
    PyDev,
    Dltk,
}

/// Kind of a Python path entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathEntryKind {
    Source,
    Library,
    Project,
    Container,
}

/// A raw Python path entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    pub kind: PathEntryKind,
    pub path: String,
}

/// Python (PyDev or DLTK) role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonProjectRole {
    flavour: PythonFlavour,
    entries: Vec<PathEntry>,
}

impl PythonProjectRole {
    pub fn new(flavour: PythonFlavour, entries: Vec<PathEntry>) -> Self {
        PythonProjectRole { flavour, entries }
    }

    /// Read a DLTK `.buildpath`.
    pub fn load_dltk(project_dir: &Path) -> Result<Self, ProjectError> {
        let path = project_dir.join(".buildpath");
        let mut handler = XQueryHandler::new();
        let kinds = handler.add_query("/buildpath/buildpathentry/@kind")?;
        let paths = handler.add_query("/buildpath/buildpathentry/@path")?;
        let results = handler
            .query_file(&path)
            .map_err(|e| ProjectError::at(&path, e))?;

        let mut entries = Vec::new();
        for (kind, entry_path) in results.get(kinds).iter().zip(results.get(paths)) {
            let (Some(kind), Some(entry_path)) = (kind.as_deref(), entry_path.as_deref()) else {
                continue;
            };
            let kind = match kind {
                "src" => PathEntryKind::Source,
                "lib" => PathEntryKind::Library,
                "prj" => PathEntryKind::Project,
                "con" => PathEntryKind::Container,
                other => {
                    tracing::debug!("ignoring build path entry of kind `{}` in {}", other, path.display());
                    continue;
                }
            };
            entries.push(PathEntry {
                kind,
                path: entry_path.trim_start_matches('/').to_string(),
            });
        }

        Ok(PythonProjectRole::new(PythonFlavour::Dltk, entries))
    }

    /// Read a PyDev `.pydevproject`. PyDev keeps project references in
    /// `.project`, so they are passed in.
    pub fn load_pydev(project_dir: &Path, referenced_projects: &[String]) -> Result<Self, ProjectError> {
        let path = project_dir.join(".pydevproject");
        let mut entries = Vec::new();

        if path.exists() {
            let mut handler = XQueryHandler::new();
            let sources = handler.add_query(
                "//pydev_pathproperty[@name='org.python.pydev.PROJECT_SOURCE_PATH']/path",
            )?;
            let libraries = handler.add_query(
                "//pydev_pathproperty[@name='org.python.pydev.PROJECT_EXTERNAL_SOURCE_PATH']/path",
            )?;
            let results = handler
                .query_file(&path)
                .map_err(|e| ProjectError::at(&path, e))?;

            entries.extend(results.values(sources).map(|p| PathEntry {
                kind: PathEntryKind::Source,
                path: strip_pydev_project_prefix(p),
            }));
            entries.extend(results.values(libraries).map(|p| PathEntry {
                kind: PathEntryKind::Library,
                path: p.to_string(),
            }));
        }

        entries.extend(referenced_projects.iter().map(|name| PathEntry {
            kind: PathEntryKind::Project,
            path: name.clone(),
        }));

        Ok(PythonProjectRole::new(PythonFlavour::PyDev, entries))
    }

    pub fn flavour(&self) -> PythonFlavour {
        self.flavour
    }

    pub fn raw_path_entries(&self) -> &[PathEntry] {
        &self.entries
    }
}

/// `/${PROJECT_DIR_NAME}/src` → `src`
fn strip_pydev_project_prefix(path: &str) -> String {
    path.strip_prefix("/${PROJECT_DIR_NAME}")
        .unwrap_or(path)
        .trim_start_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_folders() {
        let role = JavaProjectRole::new(vec![
            RawClasspathEntry::source("src"),
            RawClasspathEntry::source("test").with_output("bin-test"),
            RawClasspathEntry::source("gen"),
            RawClasspathEntry::new(EntryKind::Output, "classes"),
        ]);

        assert_eq!(role.default_output_folder(), "classes");
        assert_eq!(role.output_folders(), vec!["classes", "bin-test"]);
        assert_eq!(JavaProjectRole::default().output_folders(), vec!["bin"]);
    }

    #[test]
    fn test_dltk_buildpath() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(".buildpath"),
            r#"<buildpath>
  <buildpathentry kind="src" path="src"/>
  <buildpathentry combineaccessrules="false" kind="prj" path="/pylib"/>
  <buildpathentry kind="con" path="org.eclipse.dltk.launching.INTERPRETER_CONTAINER"/>
</buildpath>"#,
        )
        .unwrap();

        let role = PythonProjectRole::load_dltk(tmp.path()).unwrap();
        assert_eq!(role.flavour(), PythonFlavour::Dltk);
        assert_eq!(role.raw_path_entries().len(), 3);
        assert_eq!(
            role.raw_path_entries()[1],
            PathEntry {
                kind: PathEntryKind::Project,
                path: "pylib".to_string()
            }
        );
    }

    #[test]
    fn test_pydev_project() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(".pydevproject"),
            r#"<?eclipse-pydev version="1.0"?><pydev_project>
<pydev_pathproperty name="org.python.pydev.PROJECT_SOURCE_PATH">
<path>/${PROJECT_DIR_NAME}/src</path>
</pydev_pathproperty>
</pydev_project>"#,
        )
        .unwrap();

        let role = PythonProjectRole::load_pydev(tmp.path(), &["shared".to_string()]).unwrap();
        let kinds: Vec<_> = role.raw_path_entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![PathEntryKind::Source, PathEntryKind::Project]);
        assert_eq!(role.raw_path_entries()[0].path, "src");
    }

    #[test]
    fn test_plugin_role_library_output() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("META-INF")).unwrap();
        std::fs::write(
            tmp.path().join("META-INF/MANIFEST.MF"),
            "Bundle-SymbolicName: org.example\nBundle-Version: 1.0.0\n",
        )
        .unwrap();
        std::fs::write(tmp.path().join("build.properties"), "output.. = bin/\n").unwrap();

        let role = PluginProjectRole::load(tmp.path()).unwrap();
        assert_eq!(role.bundle().symbolic_name, "org.example");
        assert_eq!(role.library_output("."), vec!["bin/"]);
    }
}
