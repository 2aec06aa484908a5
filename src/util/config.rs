//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.ant4eclipse/config.toml` - user-wide defaults (runtimes, variables)
//! - Workspace: `<workspace>/.ant4eclipse/config.toml` - workspace-specific overrides
//!
//! Workspace config takes precedence over global config. Relative paths are
//! resolved against the directory holding the `.ant4eclipse` folder.
//!
//! Next to each `config.toml`, a `resolvers.properties` file may register
//! resolvers as `referencedprojectsresolver.<key> = <identifier>` and
//! `containerresolver.<key> = <identifier>`. Tables declared there replace
//! the ones from the `config.toml` beside it.
//!
//! ```toml
//! user-libraries = "eclipse.userlibraries"
//!
//! [resolvers.referenced-projects]
//! jdt = "jdt"
//! pde = "pde"
//!
//! [jre]
//! default = "jdk17"
//!
//! [[jre.runtimes]]
//! id = "jdk17"
//! location = "/usr/lib/jvm/java-17"
//!
//! [containers]
//! "org.example.LIBS" = ["lib/a.jar", "lib/b.jar"]
//!
//! [variables]
//! M2_REPO = "/home/me/.m2/repository"
//!
//! [target-platforms.eclipse]
//! locations = ["/opt/eclipse/plugins"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::properties::Properties;

/// Name of the per-user and per-workspace configuration directory.
pub const CONFIG_DIR: &str = ".ant4eclipse";

/// Property prefix of referenced-projects resolver entries.
pub const REFERENCED_PROJECTS_PREFIX: &str = "referencedprojectsresolver";

/// Property prefix of container resolver entries.
pub const CONTAINER_RESOLVER_PREFIX: &str = "containerresolver";

/// Resolver registrations in properties form, next to `config.toml`.
pub const RESOLVER_PROPERTIES: &str = "resolvers.properties";

/// Resolver configuration plus classpath elements and runtimes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Which resolver implementations are registered under which key
    pub resolvers: ResolverConfig,

    /// Java runtimes
    pub jre: JreConfig,

    /// Manually declared classpath containers (name -> files)
    pub containers: BTreeMap<String, Vec<PathBuf>>,

    /// Classpath variables (name -> path)
    pub variables: BTreeMap<String, PathBuf>,

    /// Eclipse `.userlibraries` export to register as containers
    pub user_libraries: Option<PathBuf>,

    /// Named target platforms
    pub target_platforms: BTreeMap<String, TargetPlatformConfig>,
}

/// Resolver registration tables: key -> implementation identifier.
///
/// `None` means "use the built-in table"; an explicit empty table registers
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolverConfig {
    pub referenced_projects: Option<BTreeMap<String, String>>,
    pub containers: Option<BTreeMap<String, String>>,
}

/// Java runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JreConfig {
    /// Id of the default runtime
    pub default: Option<String>,

    /// Detect a runtime from `JAVA_HOME` or `PATH` when none is configured
    pub detect: bool,

    /// Installed runtimes
    pub runtimes: Vec<RuntimeConfig>,

    /// Additional execution environment profiles
    pub profiles: Vec<ProfileConfig>,
}

/// One installed Java runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    pub id: String,
    pub location: PathBuf,
    /// Java version, e.g. `1.8.0_292` or `17.0.2`
    #[serde(default)]
    pub version: Option<String>,
    /// Execution environment, e.g. `JavaSE-17`; derived from the version if absent
    #[serde(default)]
    pub profile: Option<String>,
    /// Boot libraries; discovered under `location` if empty
    #[serde(default)]
    pub libraries: Vec<PathBuf>,
}

/// An execution environment profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProfileConfig {
    pub name: String,
    #[serde(default)]
    pub system_packages: Vec<String>,
}

/// Locations a target platform is assembled from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetPlatformConfig {
    pub locations: Vec<PathBuf>,
}

impl Default for JreConfig {
    fn default() -> Self {
        JreConfig {
            default: None,
            detect: true,
            runtimes: Vec::new(),
            profiles: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Read resolver tables from `prefix.<key> = <identifier>` properties.
    ///
    /// A table whose prefix never occurs stays unset.
    pub fn from_properties(properties: &Properties) -> Self {
        fn table(properties: &Properties, prefix: &str) -> Option<BTreeMap<String, String>> {
            let entries: BTreeMap<String, String> = properties
                .with_prefix(prefix)
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            let declared = properties.iter().any(|(key, _)| key == prefix) || !entries.is_empty();
            declared.then_some(entries)
        }

        ResolverConfig {
            referenced_projects: table(properties, REFERENCED_PROJECTS_PREFIX),
            containers: table(properties, CONTAINER_RESOLVER_PREFIX),
        }
    }

    fn merge(&mut self, other: ResolverConfig) {
        if other.referenced_projects.is_some() {
            self.referenced_projects = other.referenced_projects;
        }
        if other.containers.is_some() {
            self.containers = other.containers;
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.resolvers.merge(other.resolvers);

        if other.jre.default.is_some() {
            self.jre.default = other.jre.default;
        }
        if !other.jre.detect {
            self.jre.detect = false;
        }
        for runtime in other.jre.runtimes {
            self.jre.runtimes.retain(|r| r.id != runtime.id);
            self.jre.runtimes.push(runtime);
        }
        for profile in other.jre.profiles {
            self.jre.profiles.retain(|p| p.name != profile.name);
            self.jre.profiles.push(profile);
        }

        self.containers.extend(other.containers);
        self.variables.extend(other.variables);
        if other.user_libraries.is_some() {
            self.user_libraries = other.user_libraries;
        }
        self.target_platforms.extend(other.target_platforms);
    }

    /// Make every relative path absolute against `base`.
    pub fn rebase(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        for runtime in &mut self.jre.runtimes {
            rebase(&mut runtime.location);
            runtime.libraries.iter_mut().for_each(rebase);
        }
        self.containers.values_mut().flatten().for_each(rebase);
        self.variables.values_mut().for_each(rebase);
        if let Some(path) = self.user_libraries.as_mut() {
            rebase(path);
        }
        for platform in self.target_platforms.values_mut() {
            platform.locations.iter_mut().for_each(rebase);
        }
    }
}

/// Load merged configuration from global and workspace locations.
///
/// Order of precedence (highest to lowest):
/// 1. Workspace config (<workspace>/.ant4eclipse/config.toml)
/// 2. Global config (~/.ant4eclipse/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, workspace_path: &Path) -> Config {
    let mut config = Config::default();

    for path in [global_path, workspace_path] {
        let properties = path.with_file_name(RESOLVER_PROPERTIES);
        if !path.exists() && !properties.exists() {
            continue;
        }
        let mut loaded = Config::load_or_default(path);
        // <base>/.ant4eclipse/config.toml
        if let Some(base) = path.parent().and_then(Path::parent) {
            loaded.rebase(base);
        }
        if properties.exists() {
            match Properties::load(&properties) {
                Ok(properties) => loaded.resolvers.merge(ResolverConfig::from_properties(&properties)),
                Err(e) => tracing::warn!("failed to load {}: {:#}", properties.display(), e),
            }
        }
        config.merge(loaded);
    }

    config
}

/// Get the global config directory (~/.ant4eclipse).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the workspace config path (<workspace>/.ant4eclipse/config.toml).
pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(CONFIG_DIR).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
user-libraries = "libs.userlibraries"

[resolvers.referenced-projects]
jdt = "jdt"

[jre]
default = "jdk17"

[[jre.runtimes]]
id = "jdk17"
location = "/usr/lib/jvm/java-17"
version = "17.0.2"

[[jre.profiles]]
name = "Custom-1"
system-packages = ["javax.xml"]

[containers]
"org.example.LIBS" = ["lib/a.jar"]

[variables]
M2_REPO = "/repo"

[target-platforms.eclipse]
locations = ["/opt/eclipse/plugins"]
"#,
        )
        .unwrap();

        let referenced = config.resolvers.referenced_projects.as_ref().unwrap();
        assert_eq!(referenced.get("jdt").map(String::as_str), Some("jdt"));
        assert!(config.resolvers.containers.is_none());
        assert_eq!(config.jre.default.as_deref(), Some("jdk17"));
        assert_eq!(config.jre.runtimes[0].version.as_deref(), Some("17.0.2"));
        assert_eq!(config.jre.profiles[0].system_packages, vec!["javax.xml"]);
        assert_eq!(config.containers["org.example.LIBS"], vec![PathBuf::from("lib/a.jar")]);
        assert_eq!(config.variables["M2_REPO"], PathBuf::from("/repo"));
        assert_eq!(config.target_platforms["eclipse"].locations.len(), 1);
    }

    #[test]
    fn test_empty_table_differs_from_missing() {
        let config: Config = toml::from_str("[resolvers.referenced-projects]\n").unwrap();
        assert_eq!(config.resolvers.referenced_projects, Some(BTreeMap::new()));
        assert_eq!(config.resolvers.containers, None);
    }

    #[test]
    fn test_from_properties() {
        let props = Properties::parse(
            "referencedprojectsresolver.jdt = jdt\n\
             referencedprojectsresolver.pde = pde\n\
             unrelated.key = value\n",
        );
        let config = ResolverConfig::from_properties(&props);

        let referenced = config.referenced_projects.unwrap();
        assert_eq!(referenced.len(), 2);
        assert_eq!(referenced["pde"], "pde");
        assert!(config.containers.is_none());
    }

    #[test]
    fn test_resolver_properties_replace_toml_tables() {
        let ws = TempDir::new().unwrap();
        let local = workspace_config_path(ws.path());
        std::fs::create_dir_all(local.parent().unwrap()).unwrap();
        std::fs::write(&local, "[resolvers.referenced-projects]\nplatform = \"platform\"\n").unwrap();
        std::fs::write(
            local.with_file_name(RESOLVER_PROPERTIES),
            "referencedprojectsresolver.jdt = jdt\ncontainerresolver.jre = jre\n",
        )
        .unwrap();

        let config = load_config(Path::new("/nonexistent/config.toml"), &local);
        let referenced = config.resolvers.referenced_projects.unwrap();
        assert_eq!(referenced.keys().collect::<Vec<_>>(), vec!["jdt"]);
        assert_eq!(config.resolvers.containers.unwrap()["jre"], "jre");
    }

    #[test]
    fn test_resolver_properties_without_toml() {
        let ws = TempDir::new().unwrap();
        let dir = ws.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(RESOLVER_PROPERTIES), "referencedprojectsresolver.pde = pde\n").unwrap();

        let config = load_config(Path::new("/nonexistent/config.toml"), &workspace_config_path(ws.path()));
        assert_eq!(config.resolvers.referenced_projects.unwrap().len(), 1);
        assert!(config.resolvers.containers.is_none());
    }

    #[test]
    fn test_workspace_overrides_global() {
        let home = TempDir::new().unwrap();
        let ws = TempDir::new().unwrap();

        let global = home.path().join(CONFIG_DIR).join("config.toml");
        std::fs::create_dir_all(global.parent().unwrap()).unwrap();
        std::fs::write(
            &global,
            "[jre]\ndefault = \"a\"\n[variables]\nM2_REPO = \"repo\"\nJUNIT = \"/junit\"\n",
        )
        .unwrap();

        let local = workspace_config_path(ws.path());
        std::fs::create_dir_all(local.parent().unwrap()).unwrap();
        std::fs::write(&local, "[variables]\nM2_REPO = \"/other\"\n").unwrap();

        let config = load_config(&global, &local);
        assert_eq!(config.jre.default.as_deref(), Some("a"));
        assert_eq!(config.variables["M2_REPO"], PathBuf::from("/other"));
        assert_eq!(config.variables["JUNIT"], PathBuf::from("/junit"));
    }

    #[test]
    fn test_relative_paths_are_rebased() {
        let ws = TempDir::new().unwrap();
        let local = workspace_config_path(ws.path());
        std::fs::create_dir_all(local.parent().unwrap()).unwrap();
        std::fs::write(&local, "[containers]\nLIBS = [\"lib/a.jar\"]\n").unwrap();

        let config = load_config(Path::new("/nonexistent/config.toml"), &local);
        assert_eq!(config.containers["LIBS"], vec![ws.path().join("lib/a.jar")]);
    }
}
