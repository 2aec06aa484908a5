//! Resolved classpath entries and OSGi-style access restrictions.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Package visibility rules attached to a resolved entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessRestrictions {
    /// Fully accessible packages
    public_packages: BTreeSet<String>,
    /// Accessible but not exported to the requester (discouraged)
    private_packages: BTreeSet<String>,
}

impl AccessRestrictions {
    /// Restrictions that forbid everything except `public_packages`.
    pub fn new(public_packages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        AccessRestrictions {
            public_packages: public_packages.into_iter().map(Into::into).collect(),
            private_packages: BTreeSet::new(),
        }
    }

    pub fn with_private_packages(mut self, packages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.private_packages.extend(packages.into_iter().map(Into::into));
        self
    }

    pub fn public_packages(&self) -> &BTreeSet<String> {
        &self.public_packages
    }

    pub fn private_packages(&self) -> &BTreeSet<String> {
        &self.private_packages
    }

    /// Render as compiler access rules, e.g. `+java/**;~org/internal/*;-**`.
    ///
    /// `java` stands for the whole `java.*` tree.
    pub fn as_access_rules(&self) -> String {
        let pattern = |package: &str| {
            if package == "java" {
                "java/**".to_string()
            } else {
                format!("{}/*", package.replace('.', "/"))
            }
        };
        let mut rules: Vec<String> = Vec::new();
        rules.extend(self.public_packages.iter().map(|p| format!("+{}", pattern(p))));
        rules.extend(
            self.private_packages
                .iter()
                .filter(|p| !self.public_packages.contains(*p))
                .map(|p| format!("~{}", pattern(p))),
        );
        rules.push("-**".to_string());
        rules.join(";")
    }
}

/// Concrete filesystem locations produced by resolving one raw entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedClasspathEntry {
    locations: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_restrictions: Option<AccessRestrictions>,
}

impl ResolvedClasspathEntry {
    pub fn new(locations: impl IntoIterator<Item = PathBuf>) -> Self {
        ResolvedClasspathEntry {
            locations: locations.into_iter().collect(),
            access_restrictions: None,
        }
    }

    pub fn single(location: impl Into<PathBuf>) -> Self {
        Self::new([location.into()])
    }

    pub fn with_access_restrictions(mut self, restrictions: AccessRestrictions) -> Self {
        self.access_restrictions = Some(restrictions);
        self
    }

    pub fn locations(&self) -> &[PathBuf] {
        &self.locations
    }

    pub fn access_restrictions(&self) -> Option<&AccessRestrictions> {
        self.access_restrictions.as_ref()
    }

    pub fn has_access_restrictions(&self) -> bool {
        self.access_restrictions.is_some()
    }

    pub(crate) fn clear_access_restrictions(&mut self) {
        self.access_restrictions = None;
    }

    /// Rewrite every location relative to `base`.
    pub(crate) fn relative_to(mut self, base: &Path) -> Self {
        self.locations = self
            .locations
            .iter()
            .map(|location| crate::util::fs::relative_path(base, location))
            .collect();
        self
    }
}

/// The outcome of a classpath resolution: regular entries plus at most one
/// boot entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedClasspath {
    boot: Option<ResolvedClasspathEntry>,
    entries: Vec<ResolvedClasspathEntry>,
}

impl ResolvedClasspath {
    pub(crate) fn new(boot: Option<ResolvedClasspathEntry>, entries: Vec<ResolvedClasspathEntry>) -> Self {
        ResolvedClasspath { boot, entries }
    }

    pub fn boot_classpath(&self) -> Option<&ResolvedClasspathEntry> {
        self.boot.as_ref()
    }

    pub fn entries(&self) -> &[ResolvedClasspathEntry] {
        &self.entries
    }

    /// All regular locations in order, without duplicates.
    pub fn classpath_files(&self) -> Vec<&Path> {
        let mut seen = BTreeSet::new();
        self.entries
            .iter()
            .flat_map(|e| e.locations.iter())
            .map(PathBuf::as_path)
            .filter(|location| seen.insert(*location))
            .collect()
    }

    /// The regular classpath as a platform path string.
    pub fn to_path_string(&self) -> String {
        join_paths(self.classpath_files())
    }

    /// The boot classpath as a platform path string (empty if none).
    pub fn boot_path_string(&self) -> String {
        self.boot
            .as_ref()
            .map(|boot| join_paths(boot.locations.iter().map(PathBuf::as_path)))
            .unwrap_or_default()
    }
}

/// Platform path-list separator.
pub const PATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

fn join_paths<'a>(paths: impl IntoIterator<Item = &'a Path>) -> String {
    paths
        .into_iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_rules_rendering() {
        let restrictions = AccessRestrictions::new(["java", "javax.xml"])
            .with_private_packages(["org.example.internal"]);

        assert_eq!(
            restrictions.as_access_rules(),
            "+java/**;+javax/xml/*;~org/example/internal/*;-**"
        );
    }

    #[test]
    fn test_private_package_also_public_stays_public() {
        let restrictions = AccessRestrictions::new(["a"]).with_private_packages(["a", "b"]);

        assert_eq!(restrictions.as_access_rules(), "+a/*;~b/*;-**");
    }

    #[test]
    fn test_classpath_files_deduplicated() {
        let classpath = ResolvedClasspath::new(
            Some(ResolvedClasspathEntry::new([PathBuf::from("/jre/rt.jar")])),
            vec![
                ResolvedClasspathEntry::single("/ws/a/bin"),
                ResolvedClasspathEntry::new([PathBuf::from("/ws/b/bin"), PathBuf::from("/ws/a/bin")]),
            ],
        );

        assert_eq!(
            classpath.classpath_files(),
            vec![Path::new("/ws/a/bin"), Path::new("/ws/b/bin")]
        );
        assert_eq!(classpath.boot_path_string(), "/jre/rt.jar");
        assert_eq!(
            classpath.to_path_string(),
            format!("/ws/a/bin{}/ws/b/bin", PATH_SEPARATOR)
        );
    }
}
