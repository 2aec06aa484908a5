//! Classpath container resolvers.
//!
//! A container entry in a raw classpath (`kind="con"`) is an opaque name that
//! one resolver expands into concrete entries. Resolvers are registered by
//! key from configuration and tried in key order; the first one claiming a
//! container resolves it.

pub mod jre;
pub mod pde;
pub mod registered;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::classpath::context::ClasspathResolverContext;
use crate::core::classpath_entry::RawClasspathEntry;
use crate::resolver::errors::ResolveError;

pub use jre::JreContainerResolver;
pub use pde::PdeRequiredPluginsResolver;
pub use registered::RegisteredContainerResolver;

/// Expands one family of classpath containers.
pub trait ClasspathContainerResolver: Send + Sync {
    /// Identifier the resolver is configured by.
    fn identifier(&self) -> &'static str;

    /// Whether this resolver handles the container `entry`.
    fn can_resolve_container(&self, entry: &RawClasspathEntry, context: &ClasspathResolverContext<'_>) -> bool;

    /// Add the entries `entry` stands for to `context`.
    fn resolve_container(
        &self,
        entry: &RawClasspathEntry,
        context: &mut ClasspathResolverContext<'_>,
    ) -> Result<(), ResolveError>;

    /// Whether resolving a container may record referenced projects.
    fn implies_referenced_projects(&self) -> bool {
        false
    }
}

/// Built-in resolver table: key -> identifier.
pub const DEFAULT_CONTAINER_RESOLVERS: &[(&str, &str)] = &[
    ("jre", jre::IDENTIFIER),
    ("pde", pde::IDENTIFIER),
    ("user", registered::IDENTIFIER),
];

/// Instantiate a built-in resolver by identifier.
pub fn container_resolver(identifier: &str) -> Option<Box<dyn ClasspathContainerResolver>> {
    match identifier {
        jre::IDENTIFIER => Some(Box::new(JreContainerResolver)),
        pde::IDENTIFIER => Some(Box::new(PdeRequiredPluginsResolver)),
        registered::IDENTIFIER => Some(Box::new(RegisteredContainerResolver)),
        _ => None,
    }
}

type Registered = Vec<(String, Box<dyn ClasspathContainerResolver>)>;

/// Registry and dispatcher of container resolvers.
pub struct ContainerResolverService {
    table: Option<BTreeMap<String, String>>,
    resolvers: OnceLock<Registered>,
}

impl ContainerResolverService {
    /// Create a service from a key -> identifier table; `None` selects the
    /// built-in table. The resolvers are instantiated on first use.
    pub fn new(table: Option<BTreeMap<String, String>>) -> Self {
        ContainerResolverService {
            table,
            resolvers: OnceLock::new(),
        }
    }

    fn resolvers(&self) -> &Registered {
        self.resolvers.get_or_init(|| {
            let table: BTreeMap<String, String> = match &self.table {
                Some(table) => table.clone(),
                None => DEFAULT_CONTAINER_RESOLVERS
                    .iter()
                    .map(|(key, id)| (key.to_string(), id.to_string()))
                    .collect(),
            };

            let mut resolvers = Vec::new();
            for (key, identifier) in table {
                match container_resolver(&identifier) {
                    Some(resolver) => resolvers.push((key, resolver)),
                    None => tracing::warn!(
                        "unknown container resolver `{}` configured for `{}`",
                        identifier,
                        key
                    ),
                }
            }
            if resolvers.is_empty() {
                tracing::warn!("no classpath container resolvers configured");
            }
            resolvers
        })
    }

    /// Keys of all registered resolvers, in dispatch order.
    pub fn keys(&self) -> Vec<&str> {
        self.resolvers().iter().map(|(key, _)| key.as_str()).collect()
    }

    /// The first resolver claiming `entry`.
    pub fn resolver_for(
        &self,
        entry: &RawClasspathEntry,
        context: &ClasspathResolverContext<'_>,
    ) -> Option<&dyn ClasspathContainerResolver> {
        self.resolvers()
            .iter()
            .find(|(_, resolver)| resolver.can_resolve_container(entry, context))
            .map(|(_, resolver)| resolver.as_ref())
    }
}

impl fmt::Debug for ContainerResolverService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerResolverService")
            .field("table", &self.table)
            .field("initialized", &self.resolvers.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::context::ResolveOptions;
    use crate::test_support::{global_context, WorkspaceBuilder};

    #[test]
    fn test_default_table_order() {
        let service = ContainerResolverService::new(None);
        assert_eq!(service.keys(), vec!["jre", "pde", "user"]);
    }

    #[test]
    fn test_unknown_identifier_is_skipped() {
        let mut table = BTreeMap::new();
        table.insert("jre".to_string(), "jre".to_string());
        table.insert("magic".to_string(), "does-not-exist".to_string());

        let service = ContainerResolverService::new(Some(table));
        assert_eq!(service.keys(), vec!["jre"]);
    }

    #[test]
    fn test_first_match_wins() {
        let ws = WorkspaceBuilder::new().build();
        let mut gctx = global_context(ws.root());
        // a registered container shadowing the JRE name is never reached
        gctx.elements_mut()
            .register_container(jre::JRE_CONTAINER, vec!["/shadow.jar".into()]);
        let context = ClasspathResolverContext::new(&ws, &gctx, ResolveOptions::default());

        let service = ContainerResolverService::new(None);
        let entry = RawClasspathEntry::container(jre::JRE_CONTAINER);
        assert_eq!(service.resolver_for(&entry, &context).unwrap().identifier(), jre::IDENTIFIER);

        let unknown = RawClasspathEntry::container("org.example.NOPE");
        assert!(service.resolver_for(&unknown, &context).is_none());
    }

    #[test]
    fn test_empty_table_resolves_nothing() {
        let ws = WorkspaceBuilder::new().build();
        let gctx = global_context(ws.root());
        let context = ClasspathResolverContext::new(&ws, &gctx, ResolveOptions::default());

        let service = ContainerResolverService::new(Some(BTreeMap::new()));
        let entry = RawClasspathEntry::container(jre::JRE_CONTAINER);
        assert!(service.resolver_for(&entry, &context).is_none());
    }
}
