//! Classpath operation.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::classpath::context::ResolveOptions;
use crate::classpath::entry::ResolvedClasspath;
use crate::classpath::resolver::resolve_jdt_classpath;
use crate::core::workspace::Workspace;
use crate::ops::{to_json, OutputFormat};
use crate::util::context::GlobalContext;

/// Options for resolving a classpath.
#[derive(Debug, Clone, Default)]
pub struct ClasspathOptions {
    pub project: String,
    pub resolve: ResolveOptions,
    /// Container arguments, e.g. `target.platform`.
    pub arguments: BTreeMap<String, String>,
    /// Print the classpath as a single path string.
    pub path_string: bool,
}

/// Result of a classpath run.
#[derive(Debug, Clone, Serialize)]
pub struct ClasspathReport {
    pub project: String,
    pub classpath: ResolvedClasspath,
    #[serde(skip)]
    path_string: bool,
}

impl ClasspathReport {
    pub fn format(&self, format: OutputFormat) -> Result<String> {
        if format == OutputFormat::Json {
            return to_json(self);
        }

        if self.path_string {
            return Ok(format!("{}\n", self.classpath.to_path_string()));
        }

        let mut out = String::new();
        if let Some(boot) = self.classpath.boot_classpath() {
            for location in boot.locations() {
                out.push_str(&format!("[boot] {}", location.display()));
                if let Some(restrictions) = boot.access_restrictions() {
                    out.push_str(&format!(" [{}]", restrictions.as_access_rules()));
                }
                out.push('\n');
            }
        }
        for entry in self.classpath.entries() {
            let rules = entry.access_restrictions().map(|r| r.as_access_rules());
            for location in entry.locations() {
                match &rules {
                    Some(rules) => out.push_str(&format!("{} [{}]\n", location.display(), rules)),
                    None => out.push_str(&format!("{}\n", location.display())),
                }
            }
        }
        Ok(out)
    }
}

/// Resolve the classpath of one Java project.
pub fn classpath(workspace: &Workspace, gctx: &GlobalContext, options: &ClasspathOptions) -> Result<ClasspathReport> {
    let classpath = resolve_jdt_classpath(workspace, gctx, &options.project, options.resolve, &options.arguments)?;
    Ok(ClasspathReport {
        project: options.project.clone(),
        classpath,
        path_string: options.path_string,
    })
}
