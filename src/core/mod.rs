//! The Eclipse workspace model.
//!
//! - Projects and their nature roles (Java, plug-in, C/C++, Python)
//! - Raw `.classpath` entries
//! - OSGi bundle manifests
//! - Workspace loading and lookup

pub mod bundle;
pub mod classpath_entry;
pub mod project;
pub mod roles;
pub mod workspace;

pub use bundle::{BundleDescription, BundleRequirement, BundleVersion, VersionRange};
pub use classpath_entry::{EntryKind, RawClasspathEntry};
pub use project::{EclipseProject, ProjectError};
pub use roles::{CProjectRole, JavaProjectRole, PluginProjectRole, PythonProjectRole};
pub use workspace::Workspace;
