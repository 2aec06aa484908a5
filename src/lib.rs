//! ant4eclipse - Eclipse workspace metadata for headless builds
//!
//! This crate reads an Eclipse workspace (`.project`, `.classpath`, plug-in
//! manifests, Python build paths) and computes what the IDE computes
//! interactively: the build order of a set of projects and their resolved
//! classpaths.

pub mod classpath;
pub mod core;
pub mod graph;
pub mod ops;
pub mod resolver;
pub mod util;
pub mod xquery;

/// Workspace fixtures for unit tests.
#[cfg(test)]
pub(crate) mod test_support;

pub use classpath::{resolve_jdt_classpath, ResolveOptions, ResolvedClasspath};
pub use core::{EclipseProject, Workspace};
pub use graph::DependencyGraph;
pub use resolver::{resolve_build_order, ReferenceContext, ResolveError};
pub use util::context::GlobalContext;
