//! OSGi bundle descriptions read from `META-INF/MANIFEST.MF`.
//!
//! Only the headers that drive classpath computation are interpreted:
//! `Bundle-SymbolicName`, `Bundle-Version`, `Require-Bundle`,
//! `Fragment-Host`, `Export-Package` and `Bundle-ClassPath`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::project::ProjectError;
use crate::util::jar;

/// Location of the manifest inside a bundle.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// An OSGi version: `major.minor.micro.qualifier`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BundleVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub qualifier: String,
}

impl BundleVersion {
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        BundleVersion {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }
}

impl FromStr for BundleVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.splitn(4, '.');
        let number = |part: Option<&str>| -> Result<u32, String> {
            match part {
                None => Ok(0),
                Some(p) => p.parse().map_err(|_| format!("invalid version `{}`", s)),
            }
        };

        let major = number(parts.next())?;
        let minor = number(parts.next())?;
        let micro = number(parts.next())?;
        let qualifier = parts.next().unwrap_or_default().to_string();

        Ok(BundleVersion {
            major,
            minor,
            micro,
            qualifier,
        })
    }
}

impl Ord for BundleVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.micro, &self.qualifier).cmp(&(
            other.major,
            other.minor,
            other.micro,
            &other.qualifier,
        ))
    }
}

impl PartialOrd for BundleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BundleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

/// An OSGi version range such as `[1.0,2.0)` or a bare minimum `1.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub min: BundleVersion,
    pub min_inclusive: bool,
    pub max: Option<BundleVersion>,
    pub max_inclusive: bool,
}

impl VersionRange {
    /// Check whether `version` lies inside the range.
    pub fn includes(&self, version: &BundleVersion) -> bool {
        let above_min = if self.min_inclusive {
            version >= &self.min
        } else {
            version > &self.min
        };
        let below_max = match &self.max {
            None => true,
            Some(max) if self.max_inclusive => version <= max,
            Some(max) => version < max,
        };
        above_min && below_max
    }
}

impl FromStr for VersionRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bracketed = s.starts_with('[') || s.starts_with('(');
        if !bracketed {
            return Ok(VersionRange {
                min: s.parse()?,
                min_inclusive: true,
                max: None,
                max_inclusive: false,
            });
        }

        let min_inclusive = s.starts_with('[');
        let max_inclusive = match s.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(format!("invalid version range `{}`", s)),
        };
        let (min, max) = s[1..s.len() - 1]
            .split_once(',')
            .ok_or_else(|| format!("invalid version range `{}`", s))?;

        Ok(VersionRange {
            min: min.parse()?,
            min_inclusive,
            max: Some(max.parse()?),
            max_inclusive,
        })
    }
}

/// One clause of a manifest header, e.g. `org.foo;bundle-version="1.0";resolution:=optional`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderClause {
    pub names: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub directives: BTreeMap<String, String>,
}

/// Parse an OSGi header value into its clauses.
pub fn parse_header(value: &str) -> Vec<HeaderClause> {
    split_outside_quotes(value, ',')
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .map(|clause| {
            let mut parsed = HeaderClause::default();
            for part in split_outside_quotes(&clause, ';') {
                let part = part.trim();
                if let Some((key, val)) = part.split_once(":=") {
                    parsed
                        .directives
                        .insert(key.trim().to_string(), unquote(val.trim()));
                } else if let Some((key, val)) = part.split_once('=') {
                    parsed
                        .attributes
                        .insert(key.trim().to_string(), unquote(val.trim()));
                } else if !part.is_empty() {
                    parsed.names.push(part.to_string());
                }
            }
            parsed
        })
        .collect()
}

fn split_outside_quotes(value: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in value.chars() {
        if c == '"' {
            quoted = !quoted;
            current.push(c);
        } else if c == separator && !quoted {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

/// Parse the main section of a manifest into header name → value.
///
/// Header names are matched case-insensitively.
pub fn parse_manifest(contents: &str) -> Result<HashMap<String, String>, String> {
    let mut headers = HashMap::new();
    let mut current: Option<(String, String)> = None;

    for line in contents.lines() {
        if let Some(continuation) = line.strip_prefix(' ') {
            match current.as_mut() {
                Some((_, value)) => value.push_str(continuation),
                None => return Err("continuation line without a header".to_string()),
            }
            continue;
        }

        if let Some((name, value)) = current.take() {
            headers.insert(name, value);
        }

        if line.trim().is_empty() {
            // the main section ends at the first blank line
            if !headers.is_empty() {
                break;
            }
            continue;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| format!("malformed manifest line `{}`", line))?;
        current = Some((name.trim().to_ascii_lowercase(), value.trim_start().to_string()));
    }

    if let Some((name, value)) = current {
        headers.insert(name, value);
    }
    Ok(headers)
}

/// A `Require-Bundle` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequirement {
    pub symbolic_name: String,
    pub version_range: Option<VersionRange>,
    pub optional: bool,
    pub reexport: bool,
}

impl BundleRequirement {
    /// Check whether a bundle satisfies this requirement.
    pub fn is_satisfied_by(&self, bundle: &BundleDescription) -> bool {
        bundle.symbolic_name == self.symbolic_name
            && self
                .version_range
                .as_ref()
                .map_or(true, |range| range.includes(&bundle.version))
    }
}

/// An `Export-Package` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPackage {
    pub name: String,
    /// `x-internal:=true`
    pub internal: bool,
    /// `x-friends:="a,b"`
    pub friends: Vec<String>,
}

impl ExportedPackage {
    /// Whether the package is fully accessible to the bundle `requester`.
    pub fn is_public_for(&self, requester: Option<&str>) -> bool {
        if self.internal {
            return false;
        }
        if self.friends.is_empty() {
            return true;
        }
        requester.is_some_and(|r| self.friends.iter().any(|f| f == r))
    }
}

/// The interpreted manifest of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDescription {
    pub symbolic_name: String,
    pub version: BundleVersion,
    pub required_bundles: Vec<BundleRequirement>,
    pub fragment_host: Option<BundleRequirement>,
    pub exported_packages: Vec<ExportedPackage>,
    pub bundle_classpath: Vec<String>,
    /// Directory or jar the bundle was read from.
    pub location: PathBuf,
}

impl BundleDescription {
    /// Interpret manifest text. `origin` is only used in error messages.
    pub fn parse(contents: &str, location: &Path, origin: &Path) -> Result<Self, ProjectError> {
        let malformed = |message: String| ProjectError::Manifest {
            path: origin.to_path_buf(),
            message,
        };

        let headers = parse_manifest(contents).map_err(malformed)?;
        let header = |name: &str| headers.get(&name.to_ascii_lowercase()).map(String::as_str);

        let symbolic_name = header("Bundle-SymbolicName")
            .and_then(|v| parse_header(v).into_iter().next())
            .and_then(|clause| clause.names.into_iter().next())
            .ok_or_else(|| malformed("missing Bundle-SymbolicName header".to_string()))?;

        let version = match header("Bundle-Version") {
            Some(v) => v.parse().map_err(malformed)?,
            None => BundleVersion::default(),
        };

        let mut required_bundles = Vec::new();
        for clause in header("Require-Bundle").map(parse_header).unwrap_or_default() {
            required_bundles.extend(requirements(clause).map_err(malformed)?);
        }

        let fragment_host = match header("Fragment-Host") {
            Some(v) => parse_header(v)
                .into_iter()
                .next()
                .map(requirements)
                .transpose()
                .map_err(malformed)?
                .and_then(|mut r| r.pop()),
            None => None,
        };

        let exported_packages = header("Export-Package")
            .map(parse_header)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|clause| {
                let internal = clause.directives.get("x-internal").is_some_and(|v| v == "true");
                let friends: Vec<String> = clause
                    .directives
                    .get("x-friends")
                    .map(|v| v.split(',').map(|f| f.trim().to_string()).collect())
                    .unwrap_or_default();
                clause.names.into_iter().map(move |name| ExportedPackage {
                    name,
                    internal,
                    friends: friends.clone(),
                })
            })
            .collect();

        let mut bundle_classpath: Vec<String> = header("Bundle-ClassPath")
            .map(parse_header)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|clause| clause.names)
            .collect();
        if bundle_classpath.is_empty() {
            bundle_classpath.push(".".to_string());
        }

        Ok(BundleDescription {
            symbolic_name,
            version,
            required_bundles,
            fragment_host,
            exported_packages,
            bundle_classpath,
            location: location.to_path_buf(),
        })
    }

    /// Read the manifest of a directory bundle.
    pub fn from_directory(dir: &Path) -> Result<Self, ProjectError> {
        let manifest = dir.join(MANIFEST_PATH);
        let contents = std::fs::read_to_string(&manifest).map_err(|source| ProjectError::Io {
            path: manifest.clone(),
            source,
        })?;
        Self::parse(&contents, dir, &manifest)
    }

    /// Read the manifest of a jarred bundle. Jars without a manifest yield `None`.
    pub fn from_jar(jar_path: &Path) -> Result<Option<Self>, ProjectError> {
        let bytes = jar::read_entry(jar_path, MANIFEST_PATH).map_err(|e| ProjectError::Manifest {
            path: jar_path.to_path_buf(),
            message: format!("{:#}", e),
        })?;

        match bytes {
            Some(bytes) => {
                let contents = String::from_utf8_lossy(&bytes);
                Self::parse(&contents, jar_path, jar_path).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.fragment_host.is_some()
    }

    /// Whether the bundle was read from a jar file.
    pub fn is_jarred(&self) -> bool {
        self.location
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
    }
}

fn requirements(clause: HeaderClause) -> Result<Vec<BundleRequirement>, String> {
    let version_range = clause
        .attributes
        .get("bundle-version")
        .map(|v| v.parse::<VersionRange>())
        .transpose()?;
    let optional = clause.directives.get("resolution").is_some_and(|v| v == "optional");
    let reexport = clause.directives.get("visibility").is_some_and(|v| v == "reexport");

    Ok(clause
        .names
        .into_iter()
        .map(|symbolic_name| BundleRequirement {
            symbolic_name,
            version_range: version_range.clone(),
            optional,
            reexport,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"Manifest-Version: 1.0
Bundle-ManifestVersion: 2
Bundle-SymbolicName: org.example.ui;singleton:=true
Bundle-Version: 1.2.0.qualifier
Require-Bundle: org.eclipse.core.runtime;bundle-version="[3.4.0,4.0.0)",
 org.example.core;visibility:=reexport,
 org.example.optional;resolution:=optional
Export-Package: org.example.ui,
 org.example.ui.internal;x-internal:=true,
 org.example.ui.friends;x-friends:="org.example.test,org.example.tools"
Bundle-ClassPath: .,
 lib/helper.jar
"#;

    #[test]
    fn test_parse_manifest() {
        let bundle =
            BundleDescription::parse(MANIFEST, Path::new("/ws/ui"), Path::new("/ws/ui/MANIFEST.MF"))
                .unwrap();

        assert_eq!(bundle.symbolic_name, "org.example.ui");
        assert_eq!(bundle.version, "1.2.0.qualifier".parse().unwrap());
        assert_eq!(bundle.required_bundles.len(), 3);
        assert!(bundle.required_bundles[1].reexport);
        assert!(bundle.required_bundles[2].optional);
        assert!(!bundle.is_fragment());
        assert_eq!(bundle.bundle_classpath, vec![".", "lib/helper.jar"]);

        let friends = &bundle.exported_packages[2];
        assert!(friends.is_public_for(Some("org.example.tools")));
        assert!(!friends.is_public_for(Some("org.other")));
        assert!(!bundle.exported_packages[1].is_public_for(None));
        assert!(bundle.exported_packages[0].is_public_for(None));
    }

    #[test]
    fn test_requirement_version_range() {
        let bundle =
            BundleDescription::parse(MANIFEST, Path::new("/ws/ui"), Path::new("MANIFEST.MF")).unwrap();
        let runtime = |version: &str| BundleDescription {
            symbolic_name: "org.eclipse.core.runtime".to_string(),
            version: version.parse().unwrap(),
            required_bundles: Vec::new(),
            fragment_host: None,
            exported_packages: Vec::new(),
            bundle_classpath: vec![".".to_string()],
            location: PathBuf::from("/tp/runtime"),
        };

        let requirement = &bundle.required_bundles[0];
        assert!(requirement.is_satisfied_by(&runtime("3.4.0")));
        assert!(requirement.is_satisfied_by(&runtime("3.9.100.v2013")));
        assert!(!requirement.is_satisfied_by(&runtime("4.0.0")));
        assert!(!requirement.is_satisfied_by(&runtime("3.3.9")));
    }

    #[test]
    fn test_fragment_host() {
        let bundle = BundleDescription::parse(
            "Bundle-SymbolicName: org.example.ui.tests\nFragment-Host: org.example.ui;bundle-version=\"1.0.0\"\n",
            Path::new("/ws/tests"),
            Path::new("MANIFEST.MF"),
        )
        .unwrap();

        let host = bundle.fragment_host.as_ref().unwrap();
        assert!(bundle.is_fragment());
        assert_eq!(host.symbolic_name, "org.example.ui");
        assert_eq!(bundle.version, BundleVersion::default());
    }

    #[test]
    fn test_missing_symbolic_name() {
        let err = BundleDescription::parse("Manifest-Version: 1.0\n", Path::new("x"), Path::new("x"))
            .unwrap_err();
        assert!(err.to_string().contains("Bundle-SymbolicName"));
    }

    #[test]
    fn test_version_ordering_and_ranges() {
        let v = |s: &str| s.parse::<BundleVersion>().unwrap();
        assert!(v("1.10") > v("1.9.9"));
        assert!(v("1.0.0.b") > v("1.0.0.a"));
        assert!(v("1.0.0.a") > v("1.0.0"));

        let open: VersionRange = "(1.0,2.0]".parse().unwrap();
        assert!(!open.includes(&v("1.0")));
        assert!(open.includes(&v("2.0")));
        assert!("[1.0,2.0".parse::<VersionRange>().is_err());
        assert!("x.y".parse::<BundleVersion>().is_err());
    }
}
