//! Installed Java runtimes and execution environment profiles.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::util::config::{JreConfig, ProfileConfig, RuntimeConfig};
use crate::util::fs::glob_files;
use crate::util::properties::Properties;

/// An execution environment profile, e.g. `JavaSE-17`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaProfile {
    name: String,
    system_packages: Vec<String>,
}

impl JavaProfile {
    pub fn new(name: impl Into<String>, system_packages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        JavaProfile {
            name: name.into(),
            system_packages: system_packages.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-`java.*` packages the runtime exports.
    pub fn system_packages(&self) -> &[String] {
        &self.system_packages
    }
}

impl From<&ProfileConfig> for JavaProfile {
    fn from(config: &ProfileConfig) -> Self {
        JavaProfile::new(&config.name, &config.system_packages)
    }
}

const PACKAGES_1_4: &[&str] = &[
    "javax.accessibility",
    "javax.crypto",
    "javax.crypto.interfaces",
    "javax.crypto.spec",
    "javax.imageio",
    "javax.naming",
    "javax.net",
    "javax.net.ssl",
    "javax.print",
    "javax.security.auth",
    "javax.security.cert",
    "javax.sound.midi",
    "javax.sound.sampled",
    "javax.sql",
    "javax.swing",
    "javax.transaction.xa",
    "javax.xml.parsers",
    "javax.xml.transform",
    "org.ietf.jgss",
    "org.w3c.dom",
    "org.xml.sax",
];

const PACKAGES_1_5: &[&str] = &[
    "javax.management",
    "javax.rmi.ssl",
    "javax.xml.datatype",
    "javax.xml.namespace",
    "javax.xml.validation",
    "javax.xml.xpath",
];

const PACKAGES_1_6: &[&str] = &[
    "javax.annotation",
    "javax.jws",
    "javax.lang.model",
    "javax.script",
    "javax.tools",
    "javax.xml.bind",
    "javax.xml.crypto",
    "javax.xml.stream",
    "javax.xml.ws",
];

/// Removed together with the Java EE modules.
const REMOVED_IN_11: &[&str] = &["javax.annotation", "javax.jws", "javax.xml.bind", "javax.xml.ws"];

/// Latest execution environment with a built-in profile.
const LATEST_FEATURE_RELEASE: u32 = 21;

/// Profiles of every known execution environment.
pub fn builtin_profiles() -> Vec<JavaProfile> {
    let mut profiles = Vec::new();
    let mut packages: Vec<&str> = PACKAGES_1_4.to_vec();

    profiles.push(JavaProfile::new("J2SE-1.4", packages.iter().copied()));
    packages.extend_from_slice(PACKAGES_1_5);
    profiles.push(JavaProfile::new("J2SE-1.5", packages.iter().copied()));
    packages.extend_from_slice(PACKAGES_1_6);

    for feature in 6..=LATEST_FEATURE_RELEASE {
        if feature == 11 {
            packages.retain(|p| !REMOVED_IN_11.contains(p));
        }
        let mut sorted = packages.clone();
        sorted.sort_unstable();
        profiles.push(JavaProfile::new(profile_name(feature), sorted));
    }

    profiles
}

fn profile_name(feature: u32) -> String {
    match feature {
        0..=5 => format!("J2SE-1.{}", feature),
        6..=8 => format!("JavaSE-1.{}", feature),
        _ => format!("JavaSE-{}", feature),
    }
}

/// Derive the execution environment of a Java version string.
///
/// `1.8.0_292` gives `JavaSE-1.8`, `17.0.2` gives `JavaSE-17`.
pub fn profile_for_version(version: &str) -> Option<String> {
    let mut numbers = version
        .split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>());

    let feature = match numbers.next()?.ok()? {
        1 => numbers.next()?.ok()?,
        major => major,
    };

    (feature >= 4).then(|| profile_name(feature))
}

/// An installed Java runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaRuntime {
    id: String,
    location: PathBuf,
    version: Option<String>,
    profile: Option<String>,
    libraries: Vec<PathBuf>,
}

impl JavaRuntime {
    pub fn new(id: impl Into<String>, location: impl Into<PathBuf>, libraries: Vec<PathBuf>) -> Self {
        JavaRuntime {
            id: id.into(),
            location: location.into(),
            version: None,
            profile: None,
            libraries,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        if self.profile.is_none() {
            self.profile = profile_for_version(&version);
        }
        self.version = Some(version);
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Build a runtime from configuration, discovering what is left out.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        if !config.location.is_dir() {
            anyhow::bail!(
                "Java runtime `{}` does not exist: {}",
                config.id,
                config.location.display()
            );
        }

        let libraries = if config.libraries.is_empty() {
            discover_libraries(&config.location)?
        } else {
            config.libraries.clone()
        };

        let mut runtime = JavaRuntime::new(&config.id, &config.location, libraries);
        if let Some(profile) = &config.profile {
            runtime = runtime.with_profile(profile);
        }
        if let Some(version) = config.version.clone().or_else(|| read_release_version(&config.location)) {
            runtime = runtime.with_version(version);
        }
        Ok(runtime)
    }

    /// Find a runtime through `JAVA_HOME` or the `java` executable on `PATH`.
    pub fn detect() -> Option<Self> {
        let home = std::env::var_os("JAVA_HOME")
            .map(PathBuf::from)
            .filter(|home| home.is_dir())
            .or_else(|| {
                let java = which::which("java").ok()?;
                let java = java.canonicalize().unwrap_or(java);
                // <home>/bin/java
                java.parent()?.parent().map(Path::to_path_buf)
            })?;

        let config = RuntimeConfig {
            id: "default".to_string(),
            location: home,
            version: None,
            profile: None,
            libraries: Vec::new(),
        };

        match JavaRuntime::from_config(&config) {
            Ok(runtime) if !runtime.libraries.is_empty() => {
                tracing::info!("detected Java runtime at {}", runtime.location.display());
                Some(runtime)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("ignoring detected Java runtime: {:#}", e);
                None
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Execution environment the runtime provides.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Boot classpath libraries.
    pub fn libraries(&self) -> &[PathBuf] {
        &self.libraries
    }
}

fn discover_libraries(location: &Path) -> Result<Vec<PathBuf>> {
    let patterns: &[&str] = if location.join("jre/lib/rt.jar").is_file() {
        &["jre/lib/*.jar"]
    } else if location.join("lib/rt.jar").is_file() {
        &["lib/*.jar"]
    } else if location.join("lib/jrt-fs.jar").is_file() {
        &["lib/jrt-fs.jar"]
    } else {
        &["jre/lib/*.jar", "lib/*.jar"]
    };

    glob_files(location, patterns)
        .with_context(|| format!("failed to list libraries of {}", location.display()))
}

fn read_release_version(location: &Path) -> Option<String> {
    let release = location.join("release");
    if !release.is_file() {
        return None;
    }
    let properties = Properties::load(&release).ok()?;
    properties
        .get("JAVA_VERSION")
        .map(|v| v.trim_matches('"').to_string())
}

/// Known runtimes and profiles, plus the memo of fallback decisions.
#[derive(Debug, Default)]
pub struct JavaRuntimeRegistry {
    runtimes: BTreeMap<String, Arc<JavaRuntime>>,
    default: Option<String>,
    profiles: BTreeMap<String, JavaProfile>,
    fallbacks: Mutex<HashMap<String, String>>,
}

impl JavaRuntimeRegistry {
    /// An empty registry knowing the built-in profiles.
    pub fn new() -> Self {
        let mut registry = JavaRuntimeRegistry::default();
        for profile in builtin_profiles() {
            registry.register_profile(profile);
        }
        registry
    }

    /// Build the registry from configuration. Unusable runtimes are skipped
    /// with a warning.
    pub fn from_config(config: &JreConfig) -> Self {
        let mut registry = Self::new();

        for profile in &config.profiles {
            registry.register_profile(JavaProfile::from(profile));
        }

        for runtime in &config.runtimes {
            match JavaRuntime::from_config(runtime) {
                Ok(runtime) => registry.register(runtime),
                Err(e) => tracing::warn!("skipping Java runtime `{}`: {:#}", runtime.id, e),
            }
        }

        if let Some(default) = &config.default {
            if !registry.set_default(default) {
                tracing::warn!("default Java runtime `{}` is not configured", default);
            }
        }

        if registry.runtimes.is_empty() && config.detect {
            if let Some(runtime) = JavaRuntime::detect() {
                registry.register(runtime);
            }
        }

        registry
    }

    /// Register a runtime. The first registered runtime becomes the default
    /// unless one is set explicitly.
    pub fn register(&mut self, runtime: JavaRuntime) {
        let id = runtime.id.clone();
        self.runtimes.insert(id.clone(), Arc::new(runtime));
        if self.default.is_none() {
            self.default = Some(id);
        }
    }

    pub fn register_profile(&mut self, profile: JavaProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Make a registered runtime the default.
    pub fn set_default(&mut self, id: &str) -> bool {
        if self.has_runtime(id) {
            self.default = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn has_runtime(&self, id: &str) -> bool {
        self.runtimes.contains_key(id)
    }

    pub fn runtime(&self, id: &str) -> Option<Arc<JavaRuntime>> {
        self.runtimes.get(id).cloned()
    }

    pub fn runtimes(&self) -> impl Iterator<Item = &JavaRuntime> + '_ {
        self.runtimes.values().map(|r| r.as_ref())
    }

    pub fn default_runtime(&self) -> Option<Arc<JavaRuntime>> {
        self.default.as_deref().and_then(|id| self.runtime(id))
    }

    pub fn profile(&self, name: &str) -> Option<&JavaProfile> {
        self.profiles.get(name)
    }

    /// Find the runtime for a JRE container key.
    ///
    /// The key is matched as a runtime id, then its last segment as a runtime
    /// id or execution environment. Anything else falls back to the default
    /// runtime; the fallback is remembered so it is only reported once.
    pub fn resolve(&self, key: &str) -> Option<Arc<JavaRuntime>> {
        if key.is_empty() {
            return self.default_runtime();
        }

        if let Some(runtime) = self.runtime(key) {
            return Some(runtime);
        }

        let mut fallbacks = self.fallbacks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = fallbacks.get(key) {
            return self.runtime(id);
        }

        let suffix = key.rsplit('/').next().unwrap_or(key);
        if let Some(runtime) = self.runtime(suffix) {
            return Some(runtime);
        }
        if let Some(runtime) = self.runtime_for_profile(suffix) {
            return Some(runtime);
        }

        let default = self.default_runtime()?;
        tracing::warn!(
            "no Java runtime matches `{}`, falling back to `{}`",
            key,
            default.id()
        );
        fallbacks.insert(key.to_string(), default.id().to_string());
        Some(default)
    }

    fn runtime_for_profile(&self, profile: &str) -> Option<Arc<JavaRuntime>> {
        if let Some(default) = self.default_runtime() {
            if default.profile() == Some(profile) {
                return Some(default);
            }
        }
        self.runtimes
            .values()
            .find(|runtime| runtime.profile() == Some(profile))
            .cloned()
    }
}
