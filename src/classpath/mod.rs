//! Classpath resolution.
//!
//! A raw `.classpath` is resolved into concrete locations by walking its
//! entries inside a [`ClasspathResolverContext`]: source folders map to their
//! output folders, project entries recurse into the referenced project, and
//! container entries are handed to the first [`ClasspathContainerResolver`]
//! that claims them.

pub mod container;
pub mod context;
pub mod elements;
pub mod entry;
pub mod resolver;
pub mod runtime;
pub mod target_platform;

pub use container::{ClasspathContainerResolver, ContainerResolverService};
pub use context::{ClasspathResolverContext, ResolveOptions};
pub use elements::{ClassPathContainer, ClassPathElementsRegistry, ClassPathVariable};
pub use entry::{AccessRestrictions, ResolvedClasspath, ResolvedClasspathEntry};
pub use resolver::resolve_jdt_classpath;
pub use runtime::{JavaProfile, JavaRuntime, JavaRuntimeRegistry};
pub use target_platform::{TargetPlatform, TargetPlatformRegistry};
