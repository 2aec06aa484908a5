//! Filesystem utilities.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Find files matching glob patterns relative to a base directory.
pub fn glob_files(base: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))? {
            match entry {
                Ok(path) if path.is_file() => results.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("glob error: {}", e),
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Join an Eclipse-style path (always `/` separated) onto a base directory.
pub fn join_eclipse_path(base: &Path, eclipse_path: &str) -> PathBuf {
    eclipse_path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}
