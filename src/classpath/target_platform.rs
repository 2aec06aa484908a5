//! Target platforms: the installed bundles plug-in projects compile against.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::core::bundle::{BundleDescription, BundleRequirement, MANIFEST_PATH};
use crate::util::config::TargetPlatformConfig;

/// Container argument naming the target platform to resolve against.
pub const TARGET_PLATFORM_ARGUMENT: &str = "target.platform";

/// A scanned set of bundles.
#[derive(Debug, Clone, Default)]
pub struct TargetPlatform {
    name: String,
    bundles: Vec<BundleDescription>,
}

impl TargetPlatform {
    pub fn new(name: impl Into<String>, bundles: Vec<BundleDescription>) -> Self {
        TargetPlatform {
            name: name.into(),
            bundles,
        }
    }

    /// Scan bundle locations.
    ///
    /// A location is either a bundle itself, or a directory whose entries (or
    /// whose `plugins/` entries) are directory bundles and bundle jars.
    /// Unreadable bundles are skipped with a warning.
    pub fn load(name: impl Into<String>, locations: &[PathBuf]) -> Self {
        let name = name.into();
        let mut bundles = Vec::new();

        for location in locations {
            if !location.exists() {
                tracing::warn!(
                    "target platform `{}`: location does not exist: {}",
                    name,
                    location.display()
                );
                continue;
            }

            if location.join(MANIFEST_PATH).is_file() || is_jar(location) {
                bundles.extend(read_bundle(location));
                continue;
            }

            let plugins = location.join("plugins");
            let dir = if plugins.is_dir() { plugins } else { location.clone() };
            match sorted_entries(&dir) {
                Ok(entries) => bundles.extend(entries.iter().filter_map(|entry| read_bundle(entry))),
                Err(e) => tracing::warn!("failed to scan {}: {}", dir.display(), e),
            }
        }

        tracing::info!("target platform `{}`: {} bundles", name, bundles.len());
        TargetPlatform { name, bundles }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bundles(&self) -> &[BundleDescription] {
        &self.bundles
    }

    /// The highest version satisfying `requirement`.
    pub fn find_bundle(&self, requirement: &BundleRequirement) -> Option<&BundleDescription> {
        self.bundles
            .iter()
            .filter(|bundle| requirement.is_satisfied_by(bundle))
            .max_by(|a, b| a.version.cmp(&b.version))
    }

    /// Fragments attached to the bundle `host`.
    pub fn fragments_of<'a>(&'a self, host: &'a BundleDescription) -> impl Iterator<Item = &'a BundleDescription> + 'a {
        self.bundles.iter().filter(move |bundle| {
            bundle
                .fragment_host
                .as_ref()
                .is_some_and(|requirement| requirement.is_satisfied_by(host))
        })
    }
}

fn is_jar(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}

fn read_bundle(path: &Path) -> Option<BundleDescription> {
    let result = if path.is_dir() {
        if !path.join(MANIFEST_PATH).is_file() {
            return None;
        }
        BundleDescription::from_directory(path).map(Some)
    } else if is_jar(path) {
        BundleDescription::from_jar(path)
    } else {
        return None;
    };

    match result {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::warn!("skipping bundle {}: {}", path.display(), e);
            None
        }
    }
}

/// Named target platforms, scanned on first use.
#[derive(Debug, Default)]
pub struct TargetPlatformRegistry {
    platforms: BTreeMap<String, (Vec<PathBuf>, OnceLock<TargetPlatform>)>,
}

impl TargetPlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BTreeMap<String, TargetPlatformConfig>) -> Self {
        let mut registry = Self::new();
        for (name, platform) in config {
            registry.register(name, platform.locations.clone());
        }
        registry
    }

    /// Declare a target platform; it is scanned on first lookup.
    pub fn register(&mut self, name: impl Into<String>, locations: Vec<PathBuf>) {
        self.platforms.insert(name.into(), (locations, OnceLock::new()));
    }

    pub fn has_platform(&self, name: &str) -> bool {
        self.platforms.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.platforms.keys().map(String::as_str)
    }

    /// Look up a target platform, scanning it if needed.
    pub fn get(&self, name: &str) -> Option<&TargetPlatform> {
        let (locations, platform) = self.platforms.get(name)?;
        Some(platform.get_or_init(|| TargetPlatform::load(name, locations)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bundle::{BundleVersion, VersionRange};
    use crate::util::jar::tests::write_zip;
    use tempfile::TempDir;

    fn write_bundle_dir(dir: &Path, name: &str, version: &str) {
        let meta = dir.join("META-INF");
        std::fs::create_dir_all(&meta).unwrap();
        std::fs::write(
            meta.join("MANIFEST.MF"),
            format!(
                "Manifest-Version: 1.0\nBundle-SymbolicName: {}\nBundle-Version: {}\n",
                name, version
            ),
        )
        .unwrap();
    }

    fn requirement(name: &str, range: Option<&str>) -> BundleRequirement {
        BundleRequirement {
            symbolic_name: name.to_string(),
            version_range: range.map(|r| r.parse::<VersionRange>().unwrap()),
            optional: false,
            reexport: false,
        }
    }

    #[test]
    fn test_scan_directory_and_jar_bundles() {
        let tmp = TempDir::new().unwrap();
        let plugins = tmp.path().join("plugins");
        write_bundle_dir(&plugins.join("org.example.a_1.0.0"), "org.example.a", "1.0.0");
        write_bundle_dir(&plugins.join("org.example.a_2.0.0"), "org.example.a", "2.0.0");
        write_zip(
            &plugins.join("org.example.b_1.0.0.jar"),
            &[(
                "META-INF/MANIFEST.MF",
                b"Manifest-Version: 1.0\nBundle-SymbolicName: org.example.b;singleton:=true\nBundle-Version: 1.0.0\n",
            )],
            false,
        );
        std::fs::write(plugins.join("readme.txt"), "not a bundle").unwrap();

        let platform = TargetPlatform::load("test", &[tmp.path().to_path_buf()]);
        assert_eq!(platform.bundles().len(), 3);

        let best = platform.find_bundle(&requirement("org.example.a", None)).unwrap();
        assert_eq!(best.version, BundleVersion::new(2, 0, 0));

        let ranged = platform
            .find_bundle(&requirement("org.example.a", Some("[1.0.0,2.0.0)")))
            .unwrap();
        assert_eq!(ranged.version, BundleVersion::new(1, 0, 0));

        let jarred = platform.find_bundle(&requirement("org.example.b", None)).unwrap();
        assert!(jarred.is_jarred());
    }

    #[test]
    fn test_registry_scans_lazily() {
        let tmp = TempDir::new().unwrap();
        write_bundle_dir(&tmp.path().join("bundle"), "org.example.c", "1.0.0");

        let mut registry = TargetPlatformRegistry::new();
        registry.register("eclipse", vec![tmp.path().to_path_buf()]);

        assert!(registry.has_platform("eclipse"));
        assert!(registry.get("other").is_none());
        assert_eq!(registry.get("eclipse").unwrap().bundles().len(), 1);
    }
}
