//! Build order of a set of workspace projects.

use std::collections::VecDeque;

use crate::core::workspace::Workspace;
use crate::graph::DependencyGraph;
use crate::resolver::errors::ResolveError;
use crate::resolver::ReferenceContext;

/// Order `names` so that every project comes after the projects it
/// references.
///
/// References are followed transitively so that indirect dependencies
/// order correctly, but only the requested projects are returned. A
/// reference to a project that is not in the workspace is reported and
/// ignored, one whose metadata is broken is ordered as a leaf. A cycle
/// aborts.
pub fn resolve_build_order(
    workspace: &Workspace,
    names: &[String],
    types: Option<&[String]>,
    context: &ReferenceContext<'_>,
) -> Result<Vec<String>, ResolveError> {
    let requested = workspace.projects(names, true)?;
    let service = context.gctx().referenced_projects_resolvers();

    let mut graph = DependencyGraph::<String>::new().with_renderer(|name: &String| name.clone());
    let mut queue = VecDeque::new();
    for project in &requested {
        if graph.add_vertex(project.name().to_string()) {
            queue.push_back(*project);
        }
    }

    while let Some(project) = queue.pop_front() {
        let parent = project.name().to_string();
        for name in service.resolve_referenced_projects(project, types, context)? {
            if name == parent {
                continue;
            }
            match workspace.project(&name) {
                Ok(referenced) => {
                    if graph.add_vertex(name.clone()) {
                        queue.push_back(referenced);
                    }
                }
                Err(ResolveError::UnknownProject { .. }) => {
                    tracing::warn!("`{}` references `{}` which is not in the workspace", parent, name);
                    continue;
                }
                // A broken project stays in the graph as a leaf; its own
                // references cannot be read.
                Err(err) => {
                    tracing::warn!("`{}` references a project that cannot be loaded: {}", parent, err);
                    graph.add_vertex(name.clone());
                }
            }
            graph.add_edge(&parent, &name)?;
        }
    }

    tracing::debug!("build graph: {} projects, {} edges", graph.len(), graph.edges().len());
    let order = graph.calculate_order()?;

    let order: Vec<String> = order
        .into_iter()
        .filter(|name| requested.iter().any(|p| p.name() == name))
        .collect();
    tracing::info!("build order: {}", order.join(", "));
    Ok(order)
}
