//! The PDE "required plug-ins" container.
//!
//! Expands to the bundles a plug-in project requires, found in the workspace
//! first and in the selected target platform otherwise. Exported packages
//! become access restrictions, and required workspace bundles are recorded
//! as referenced projects.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use crate::classpath::container::ClasspathContainerResolver;
use crate::classpath::context::ClasspathResolverContext;
use crate::classpath::entry::{AccessRestrictions, ResolvedClasspathEntry};
use crate::classpath::target_platform::{TargetPlatform, TARGET_PLATFORM_ARGUMENT};
use crate::core::bundle::{BundleDescription, BundleRequirement};
use crate::core::classpath_entry::RawClasspathEntry;
use crate::core::project::EclipseProject;
use crate::core::roles::PluginProjectRole;
use crate::core::workspace::Workspace;
use crate::resolver::errors::ResolveError;
use crate::util::fs::join_eclipse_path;

pub const IDENTIFIER: &str = "pde-required-plugins";

/// Path of the required plug-ins container.
pub const PDE_CONTAINER: &str = "org.eclipse.pde.core.requiredPlugins";

#[derive(Debug, Clone, Copy, Default)]
pub struct PdeRequiredPluginsResolver;

/// Where a required bundle was found.
enum Provider<'a> {
    Workspace(&'a EclipseProject, &'a PluginProjectRole),
    Platform(&'a BundleDescription),
}

impl<'a> Provider<'a> {
    fn bundle(&self) -> &'a BundleDescription {
        match *self {
            Provider::Workspace(_, role) => role.bundle(),
            Provider::Platform(bundle) => bundle,
        }
    }
}

impl ClasspathContainerResolver for PdeRequiredPluginsResolver {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn can_resolve_container(&self, entry: &RawClasspathEntry, _context: &ClasspathResolverContext<'_>) -> bool {
        entry.path == PDE_CONTAINER
    }

    fn implies_referenced_projects(&self) -> bool {
        true
    }

    fn resolve_container(
        &self,
        _entry: &RawClasspathEntry,
        context: &mut ClasspathResolverContext<'_>,
    ) -> Result<(), ResolveError> {
        let Some(project) = context.current_project() else {
            tracing::warn!("required plug-ins container resolved without a current project");
            return Ok(());
        };
        let Some(plugin) = project.plugin_role() else {
            tracing::warn!(
                "`{}` uses the required plug-ins container but is not a plug-in project",
                project.name()
            );
            return Ok(());
        };

        let platform = match context.container_argument(TARGET_PLATFORM_ARGUMENT) {
            Some(name) => {
                let platform = context.gctx().target_platforms().get(name);
                if platform.is_none() {
                    tracing::warn!("unknown target platform `{}`", name);
                }
                platform
            }
            None => None,
        };

        let requester = plugin.bundle();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(requester.symbolic_name.as_str());

        // (requirement, is the fragment host)
        let mut queue: VecDeque<(&BundleRequirement, bool)> = VecDeque::new();
        if let Some(host) = &requester.fragment_host {
            queue.push_back((host, true));
        }
        queue.extend(requester.required_bundles.iter().map(|r| (r, false)));

        while let Some((requirement, is_host)) = queue.pop_front() {
            if visited.contains(requirement.symbolic_name.as_str()) {
                continue;
            }

            let Some(provider) = find_provider(context.workspace(), platform, requirement) else {
                if requirement.optional {
                    tracing::debug!("optional bundle `{}` not found", requirement.symbolic_name);
                } else if platform.is_none() {
                    tracing::debug!(
                        "bundle `{}` is not in the workspace and no target platform is selected",
                        requirement.symbolic_name
                    );
                } else {
                    tracing::warn!(
                        "bundle `{}` required by `{}` not found",
                        requirement.symbolic_name,
                        project.name()
                    );
                }
                continue;
            };

            let bundle = provider.bundle();
            visited.insert(bundle.symbolic_name.as_str());

            let mut resolved = ResolvedClasspathEntry::new(provider_locations(&provider));
            if !is_host {
                resolved = resolved.with_access_restrictions(access_restrictions(bundle, &requester.symbolic_name));
            }
            if let Provider::Workspace(owner, _) = provider {
                context.add_referenced_projects([owner.name()]);
            }
            tracing::debug!("required bundle `{}` {}", bundle.symbolic_name, bundle.version);
            context.add_classpath_entry(resolved);

            // installed fragments contribute to their host's classes
            if let (Provider::Platform(_), Some(platform)) = (&provider, platform) {
                for fragment in platform.fragments_of(bundle) {
                    if !visited.insert(fragment.symbolic_name.as_str()) {
                        continue;
                    }
                    let mut resolved = ResolvedClasspathEntry::new(provider_locations(&Provider::Platform(fragment)));
                    if !is_host {
                        resolved =
                            resolved.with_access_restrictions(access_restrictions(fragment, &requester.symbolic_name));
                    }
                    tracing::debug!("fragment `{}` of `{}`", fragment.symbolic_name, bundle.symbolic_name);
                    context.add_classpath_entry(resolved);
                }
            }

            // a fragment sees everything its host requires, anybody else
            // only what the bundle re-exports
            queue.extend(
                bundle
                    .required_bundles
                    .iter()
                    .filter(|r| is_host || r.reexport)
                    .map(|r| (r, false)),
            );
        }

        Ok(())
    }
}

fn find_provider<'a>(
    workspace: &'a Workspace,
    platform: Option<&'a TargetPlatform>,
    requirement: &BundleRequirement,
) -> Option<Provider<'a>> {
    let in_workspace = workspace
        .projects_with_bundle(&requirement.symbolic_name)
        .filter_map(|project| project.plugin_role().map(|role| (project, role)))
        .filter(|(_, role)| requirement.is_satisfied_by(role.bundle()))
        .max_by(|(_, a), (_, b)| a.bundle().version.cmp(&b.bundle().version));

    if let Some((project, role)) = in_workspace {
        return Some(Provider::Workspace(project, role));
    }

    platform?.find_bundle(requirement).map(Provider::Platform)
}

fn provider_locations(provider: &Provider<'_>) -> Vec<PathBuf> {
    let mut locations = Vec::new();

    match provider {
        Provider::Workspace(project, role) => {
            for library in &role.bundle().bundle_classpath {
                let outputs = role.library_output(library);
                if !outputs.is_empty() {
                    locations.extend(outputs.iter().map(|o| join_eclipse_path(project.location(), o)));
                } else if library == "." {
                    if let Some(java) = project.java_role() {
                        locations.extend(
                            java.output_folders()
                                .into_iter()
                                .map(|o| join_eclipse_path(project.location(), o)),
                        );
                    }
                } else {
                    locations.push(join_eclipse_path(project.location(), library));
                }
            }
        }
        Provider::Platform(bundle) => {
            for library in &bundle.bundle_classpath {
                if library == "." {
                    locations.push(bundle.location.clone());
                } else if bundle.is_jarred() {
                    tracing::debug!(
                        "skipping nested library `{}` of {}",
                        library,
                        bundle.location.display()
                    );
                } else {
                    locations.push(join_eclipse_path(&bundle.location, library));
                }
            }
        }
    }

    locations
}

/// Exported packages visible to `requester` are public; internal packages
/// and packages exported to other friends are discouraged.
fn access_restrictions(bundle: &BundleDescription, requester: &str) -> AccessRestrictions {
    let (public, private): (Vec<_>, Vec<_>) = bundle
        .exported_packages
        .iter()
        .partition(|package| package.is_public_for(Some(requester)));

    AccessRestrictions::new(public.into_iter().map(|p| p.name.clone()))
        .with_private_packages(private.into_iter().map(|p| p.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::context::ResolveOptions;
    use crate::classpath::resolver::resolve_jdt_classpath;
    use crate::test_support::{global_context, WorkspaceBuilder};
    use std::collections::BTreeMap;
    use std::path::Path;
    use tempfile::TempDir;

    fn workspace() -> crate::test_support::TestWorkspace {
        WorkspaceBuilder::new()
            .plugin_project(
                "org.example.core",
                "Bundle-SymbolicName: org.example.core\n\
                 Bundle-Version: 1.2.0\n\
                 Export-Package: org.example.core,\n \
                 org.example.core.internal;x-internal:=true,\n \
                 org.example.core.friend;x-friends:=\"org.example.other\"\n",
            )
            .plugin_project(
                "org.example.app",
                "Bundle-SymbolicName: org.example.app;singleton:=true\n\
                 Bundle-Version: 1.0.0\n\
                 Require-Bundle: org.example.core;bundle-version=\"[1.0.0,2.0.0)\",\n \
                 org.example.tp,\n \
                 org.example.missing;resolution:=optional\n",
            )
            .build()
    }

    fn target_platform(dir: &Path) {
        let bundle = dir.join("org.example.tp_1.0.0");
        std::fs::create_dir_all(bundle.join("META-INF")).unwrap();
        std::fs::write(
            bundle.join("META-INF/MANIFEST.MF"),
            "Manifest-Version: 1.0\n\
             Bundle-SymbolicName: org.example.tp\n\
             Bundle-Version: 1.0.0\n\
             Bundle-ClassPath: .,lib/extra.jar\n\
             Export-Package: org.example.tp\n",
        )
        .unwrap();
    }

    #[test]
    fn test_workspace_and_platform_bundles() {
        let ws = workspace();
        let tp = TempDir::new().unwrap();
        target_platform(tp.path());

        let mut gctx = global_context(ws.root());
        gctx.target_platforms_mut().register("eclipse", vec![tp.path().to_path_buf()]);

        let mut arguments = BTreeMap::new();
        arguments.insert(TARGET_PLATFORM_ARGUMENT.to_string(), "eclipse".to_string());

        let classpath =
            resolve_jdt_classpath(&ws, &gctx, "org.example.app", ResolveOptions::default(), &arguments).unwrap();
        let entries = classpath.entries();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].locations(), [ws.root().join("org.example.core/bin")]);
        assert_eq!(
            entries[0].access_restrictions().unwrap().as_access_rules(),
            "+org/example/core/*;~org/example/core/friend/*;~org/example/core/internal/*;-**"
        );

        let bundle_dir = tp.path().join("org.example.tp_1.0.0");
        assert_eq!(entries[1].locations(), [bundle_dir.clone(), bundle_dir.join("lib/extra.jar")]);
    }

    #[test]
    fn test_platform_fragments_follow_their_host() {
        let ws = workspace();
        let tp = TempDir::new().unwrap();
        target_platform(tp.path());
        let fragment = tp.path().join("org.example.tp.nl_1.0.0");
        std::fs::create_dir_all(fragment.join("META-INF")).unwrap();
        std::fs::write(
            fragment.join("META-INF/MANIFEST.MF"),
            "Manifest-Version: 1.0\n\
             Bundle-SymbolicName: org.example.tp.nl\n\
             Bundle-Version: 1.0.0\n\
             Fragment-Host: org.example.tp;bundle-version=\"[1.0.0,2.0.0)\"\n\
             Export-Package: org.example.tp.nl\n",
        )
        .unwrap();

        let mut gctx = global_context(ws.root());
        gctx.target_platforms_mut().register("eclipse", vec![tp.path().to_path_buf()]);
        let mut arguments = BTreeMap::new();
        arguments.insert(TARGET_PLATFORM_ARGUMENT.to_string(), "eclipse".to_string());

        let classpath =
            resolve_jdt_classpath(&ws, &gctx, "org.example.app", ResolveOptions::default(), &arguments).unwrap();
        let entries = classpath.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].locations(), [fragment]);
        assert_eq!(
            entries[2].access_restrictions().unwrap().as_access_rules(),
            "+org/example/tp/nl/*;-**"
        );
    }

    #[test]
    fn test_records_workspace_bundles_as_references() {
        let ws = workspace();
        let gctx = global_context(ws.root());
        let mut context = ClasspathResolverContext::new(&ws, &gctx, ResolveOptions::default()).entered("org.example.app");

        PdeRequiredPluginsResolver
            .resolve_container(&RawClasspathEntry::container(PDE_CONTAINER), &mut context)
            .unwrap();

        assert_eq!(
            context.referenced_projects().iter().collect::<Vec<_>>(),
            vec!["org.example.core"]
        );
        // without a target platform only the workspace bundle resolves
        assert_eq!(context.entries().len(), 1);
    }

    #[test]
    fn test_fragment_sees_host_requirements() {
        let ws = WorkspaceBuilder::new()
            .plugin_project(
                "org.example.base",
                "Bundle-SymbolicName: org.example.base\nExport-Package: org.example.base\n",
            )
            .plugin_project(
                "org.example.host",
                "Bundle-SymbolicName: org.example.host\nRequire-Bundle: org.example.base\n",
            )
            .plugin_project(
                "org.example.fragment",
                "Bundle-SymbolicName: org.example.fragment\nFragment-Host: org.example.host\n",
            )
            .build();
        let gctx = global_context(ws.root());
        let mut context =
            ClasspathResolverContext::new(&ws, &gctx, ResolveOptions::default()).entered("org.example.fragment");

        PdeRequiredPluginsResolver
            .resolve_container(&RawClasspathEntry::container(PDE_CONTAINER), &mut context)
            .unwrap();

        let entries = context.entries();
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].has_access_restrictions());
        assert!(entries[1].has_access_restrictions());
        assert_eq!(context.referenced_projects().len(), 2);
    }
}
