//! Global context for resolution runs.
//!
//! Owns everything that is configured once per run and only read while
//! resolving: the merged configuration, the classpath elements registry, the
//! Java runtimes, the target platforms and the resolver services. It is passed
//! explicitly to every entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::classpath::container::ContainerResolverService;
use crate::classpath::elements::ClassPathElementsRegistry;
use crate::classpath::runtime::JavaRuntimeRegistry;
use crate::classpath::target_platform::TargetPlatformRegistry;
use crate::resolver::service::ReferencedProjectsResolverService;
use crate::util::config::{self, Config, CONFIG_DIR};

/// Global context containing configuration, registries and paths.
#[derive(Debug)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global data (~/.ant4eclipse/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,

    config: Config,
    elements: ClassPathElementsRegistry,
    java_runtimes: JavaRuntimeRegistry,
    target_platforms: TargetPlatformRegistry,
    referenced_projects_resolvers: ReferencedProjectsResolverService,
    container_resolvers: ContainerResolverService,
}

impl GlobalContext {
    /// Create a new GlobalContext with an empty configuration.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = config::global_config_dir().unwrap_or_else(|| PathBuf::from(CONFIG_DIR));
        let config = Config::default();

        GlobalContext {
            cwd,
            home,
            verbose: false,
            color: true,
            elements: ClassPathElementsRegistry::new(),
            java_runtimes: JavaRuntimeRegistry::new(),
            target_platforms: TargetPlatformRegistry::new(),
            referenced_projects_resolvers: ReferencedProjectsResolverService::new(
                config.resolvers.referenced_projects.clone(),
            ),
            container_resolvers: ContainerResolverService::new(config.resolvers.containers.clone()),
            config,
        }
    }

    /// Replace the configuration and rebuild every registry from it.
    pub fn with_config(mut self, config: Config) -> Result<Self> {
        self.elements = ClassPathElementsRegistry::from_config(&config)?;
        self.java_runtimes = JavaRuntimeRegistry::from_config(&config.jre);
        self.target_platforms = TargetPlatformRegistry::from_config(&config.target_platforms);
        self.referenced_projects_resolvers =
            ReferencedProjectsResolverService::new(config.resolvers.referenced_projects.clone());
        self.container_resolvers = ContainerResolverService::new(config.resolvers.containers.clone());
        self.config = config;
        Ok(self)
    }

    /// Load the global and workspace configuration files.
    pub fn configure_for_workspace(self, workspace_root: &Path) -> Result<Self> {
        let global = self.config_path();
        let local = config::workspace_config_path(workspace_root);
        let config = config::load_config(&global, &local);
        self.with_config(config)
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the home directory (~/.ant4eclipse/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn elements(&self) -> &ClassPathElementsRegistry {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut ClassPathElementsRegistry {
        &mut self.elements
    }

    pub fn java_runtimes(&self) -> &JavaRuntimeRegistry {
        &self.java_runtimes
    }

    pub fn java_runtimes_mut(&mut self) -> &mut JavaRuntimeRegistry {
        &mut self.java_runtimes
    }

    pub fn target_platforms(&self) -> &TargetPlatformRegistry {
        &self.target_platforms
    }

    pub fn target_platforms_mut(&mut self) -> &mut TargetPlatformRegistry {
        &mut self.target_platforms
    }

    pub fn referenced_projects_resolvers(&self) -> &ReferencedProjectsResolverService {
        &self.referenced_projects_resolvers
    }

    pub fn container_resolvers(&self) -> &ContainerResolverService {
        &self.container_resolvers
    }
}
