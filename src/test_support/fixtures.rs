//! Project fixtures written as real Eclipse metadata.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::classpath::container::pde::PDE_CONTAINER;
use crate::core::roles::{C_NATURE, DLTK_PYTHON_NATURE, JAVA_NATURE, PLUGIN_NATURE, PYDEV_NATURE};

/// One project of a test workspace.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    name: String,
    natures: Vec<String>,
    references: Vec<String>,
    /// `<classpathentry>` lines; `None` writes no `.classpath`.
    classpath: Option<Vec<String>>,
    /// Extra files (path relative to the project -> content).
    files: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// A project with a `.project` file only.
    pub fn new(name: impl Into<String>) -> Self {
        ProjectFixture {
            name: name.into(),
            natures: Vec::new(),
            references: Vec::new(),
            classpath: None,
            files: BTreeMap::new(),
        }
    }

    /// A Java project with an empty `.classpath`.
    pub fn java(name: impl Into<String>) -> Self {
        let mut project = Self::new(name).nature(JAVA_NATURE);
        project.classpath = Some(Vec::new());
        project
    }

    /// A plug-in project compiling `src` against its required plug-ins.
    pub fn plugin(name: impl Into<String>, manifest_body: &str) -> Self {
        Self::java(name)
            .nature(PLUGIN_NATURE)
            .source("src")
            .container(PDE_CONTAINER)
            .file("META-INF/MANIFEST.MF", format!("Manifest-Version: 1.0\n{}", manifest_body))
            .file("build.properties", "source.. = src/\noutput.. = bin/\n")
    }

    pub fn c(name: impl Into<String>) -> Self {
        Self::new(name).nature(C_NATURE)
    }

    /// A DLTK Python project with `src` and the given `prj` entries.
    pub fn dltk(name: impl Into<String>, projects: &[&str]) -> Self {
        let mut buildpath = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<buildpath>\n");
        buildpath.push_str("\t<buildpathentry kind=\"src\" path=\"src\"/>\n");
        for project in projects {
            buildpath.push_str(&format!("\t<buildpathentry kind=\"prj\" path=\"{}\"/>\n", project));
        }
        buildpath.push_str("</buildpath>\n");

        Self::new(name).nature(DLTK_PYTHON_NATURE).file(".buildpath", buildpath)
    }

    /// A PyDev project; PyDev keeps its references in `.project`.
    pub fn pydev(name: impl Into<String>, references: &[&str]) -> Self {
        let pydevproject = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<?eclipse-pydev version="1.0"?><pydev_project>
<pydev_pathproperty name="org.python.pydev.PROJECT_SOURCE_PATH">
<path>/${PROJECT_DIR_NAME}/src</path>
</pydev_pathproperty>
</pydev_project>
"#;
        references
            .iter()
            .fold(Self::new(name).nature(PYDEV_NATURE), |p, r| p.reference(*r))
            .file(".pydevproject", pydevproject)
    }

    pub fn nature(mut self, nature: impl Into<String>) -> Self {
        self.natures.push(nature.into());
        self
    }

    /// A `<project>` reference in `.project`.
    pub fn reference(mut self, name: impl Into<String>) -> Self {
        self.references.push(name.into());
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    fn entry(mut self, kind: &str, path: &str, exported: bool) -> Self {
        let exported = if exported { " exported=\"true\"" } else { "" };
        self.classpath
            .get_or_insert_with(Vec::new)
            .push(format!("<classpathentry kind=\"{}\" path=\"{}\"{}/>", kind, path, exported));
        self
    }

    pub fn source(self, path: &str) -> Self {
        self.entry("src", path, false)
    }

    pub fn library(self, path: &str) -> Self {
        self.entry("lib", path, false)
    }

    pub fn exported_library(self, path: &str) -> Self {
        self.entry("lib", path, true)
    }

    pub fn variable(self, path: &str) -> Self {
        self.entry("var", path, false)
    }

    pub fn project_entry(self, name: &str) -> Self {
        self.entry("src", &format!("/{}", name), false)
    }

    /// A project entry with `combineaccessrules="false"`.
    pub fn project_entry_without_access_rules(mut self, name: &str) -> Self {
        self.classpath.get_or_insert_with(Vec::new).push(format!(
            "<classpathentry combineaccessrules=\"false\" kind=\"src\" path=\"/{}\"/>",
            name
        ));
        self
    }

    pub fn exported_project_entry(self, name: &str) -> Self {
        self.entry("src", &format!("/{}", name), true)
    }

    pub fn container(self, path: &str) -> Self {
        self.entry("con", path, false)
    }

    pub fn exported_container(self, path: &str) -> Self {
        self.entry("con", path, true)
    }

    /// Write the project below `base` and return its directory.
    pub fn write_to(&self, base: &Path) -> std::io::Result<PathBuf> {
        let dir = base.join(&self.name);
        std::fs::create_dir_all(&dir)?;

        let mut description = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<projectDescription>\n");
        description.push_str(&format!("\t<name>{}</name>\n\t<comment></comment>\n\t<projects>\n", self.name));
        for reference in &self.references {
            description.push_str(&format!("\t\t<project>{}</project>\n", reference));
        }
        description.push_str("\t</projects>\n\t<natures>\n");
        for nature in &self.natures {
            description.push_str(&format!("\t\t<nature>{}</nature>\n", nature));
        }
        description.push_str("\t</natures>\n</projectDescription>\n");
        std::fs::write(dir.join(".project"), description)?;

        if let Some(entries) = &self.classpath {
            let mut classpath = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<classpath>\n");
            for entry in entries {
                classpath.push('\t');
                classpath.push_str(entry);
                classpath.push('\n');
            }
            classpath.push_str("\t<classpathentry kind=\"output\" path=\"bin\"/>\n</classpath>\n");
            std::fs::write(dir.join(".classpath"), classpath)?;
        }

        for (path, contents) in &self.files {
            let path = dir.join(path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents)?;
        }

        Ok(dir)
    }
}
