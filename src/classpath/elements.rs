//! Manually declared classpath containers and variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::Config;
use crate::xquery::XQueryHandler;

/// Container name prefix of Eclipse user libraries.
pub const USER_LIBRARY_PREFIX: &str = "org.eclipse.jdt.USER_LIBRARY";

/// A named set of classpath files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPathContainer {
    name: String,
    paths: Vec<PathBuf>,
}

impl ClassPathContainer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// A named path, referenced from `.classpath` as `VAR/rest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPathVariable {
    name: String,
    path: PathBuf,
}

impl ClassPathVariable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Registry of containers and variables declared outside the workspace.
///
/// Filled at configuration time and only read while resolving.
#[derive(Debug, Clone, Default)]
pub struct ClassPathElementsRegistry {
    containers: BTreeMap<String, ClassPathContainer>,
    variables: BTreeMap<String, ClassPathVariable>,
}

impl ClassPathElementsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from configuration, including user libraries.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        for (name, paths) in &config.containers {
            registry.register_container(name, paths.clone());
        }
        for (name, path) in &config.variables {
            registry.register_variable(name, path);
        }
        if let Some(path) = &config.user_libraries {
            registry.load_user_libraries(path)?;
        }
        Ok(registry)
    }

    /// Register a container, replacing any previous one of that name.
    pub fn register_container(&mut self, name: impl Into<String>, paths: impl IntoIterator<Item = PathBuf>) {
        let name = name.into();
        let container = ClassPathContainer {
            name: name.clone(),
            paths: paths.into_iter().collect(),
        };
        if self.containers.insert(name.clone(), container).is_some() {
            tracing::debug!("replaced classpath container `{}`", name);
        }
    }

    pub fn has_container(&self, name: &str) -> bool {
        self.containers.contains_key(name)
    }

    pub fn container(&self, name: &str) -> Option<&ClassPathContainer> {
        self.containers.get(name)
    }

    pub fn containers(&self) -> impl Iterator<Item = &ClassPathContainer> + '_ {
        self.containers.values()
    }

    /// Register a variable, replacing any previous one of that name.
    pub fn register_variable(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        let name = name.into();
        let variable = ClassPathVariable {
            name: name.clone(),
            path: path.into(),
        };
        self.variables.insert(name, variable);
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variable(&self, name: &str) -> Option<&ClassPathVariable> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &ClassPathVariable> + '_ {
        self.variables.values()
    }

    /// Register every library of an Eclipse `.userlibraries` export as the
    /// container `org.eclipse.jdt.USER_LIBRARY/<name>`. Returns the number of
    /// libraries read.
    pub fn load_user_libraries(&mut self, path: &Path) -> Result<usize> {
        let mut names_query = XQueryHandler::new();
        let names = names_query.add_query("/eclipse-userlibraries/library/@name")?;
        let results = names_query
            .query_file(path)
            .with_context(|| format!("failed to read user libraries: {}", path.display()))?;

        let library_names: Vec<Option<String>> = results.get(names).to_vec();

        let mut archives_query = XQueryHandler::new();
        let archive_ids = (1..=library_names.len())
            .map(|index| archives_query.add_query(&format!("/eclipse-userlibraries/library[{}]/archive/@path", index)))
            .collect::<Result<Vec<_>, _>>()?;
        let archives = archives_query
            .query_file(path)
            .with_context(|| format!("failed to read user libraries: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut count = 0;
        for (name, id) in library_names.into_iter().zip(archive_ids) {
            let Some(name) = name else {
                tracing::warn!("skipping unnamed user library in {}", path.display());
                continue;
            };
            let paths: Vec<PathBuf> = archives.values(id).map(|archive| base.join(archive)).collect();
            tracing::debug!("user library `{}` with {} archives", name, paths.len());
            self.register_container(format!("{}/{}", USER_LIBRARY_PREFIX, name), paths);
            count += 1;
        }

        Ok(count)
    }
}
