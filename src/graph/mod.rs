//! Generic dependency graph with deterministic, leaves-first ordering.
//!
//! The graph knows nothing about projects. Vertices are any hashable value,
//! an edge `parent -> child` means "parent depends on child", and
//! [`DependencyGraph::calculate_order`] emits children before parents.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use thiserror::Error;

/// Machine-readable code of a cyclic dependency failure.
pub const CYCLIC_DEPENDENCIES: &str = "CYCLIC_DEPENDENCIES";

/// Errors raised by [`DependencyGraph`].
#[derive(Debug, Error, miette::Diagnostic)]
pub enum GraphError {
    #[error("cyclic dependencies detected: {}", .cycle.join(" -> "))]
    #[diagnostic(
        code(ant4eclipse::graph::cyclic_dependencies),
        help("Break the cycle by removing one of the references")
    )]
    CyclicDependency {
        /// Rendered vertices forming the cycle, first vertex repeated at the end.
        cycle: Vec<String>,
    },

    #[error("`{vertex}` must be added as a vertex before it is used in an edge")]
    #[diagnostic(code(ant4eclipse::graph::unknown_vertex))]
    UnknownVertex { vertex: String },
}

impl GraphError {
    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphError::CyclicDependency { .. } => CYCLIC_DEPENDENCIES,
            GraphError::UnknownVertex { .. } => "UNKNOWN_VERTEX",
        }
    }
}

/// A directed edge: `parent` depends on `child`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge<T> {
    pub parent: T,
    pub child: T,
}

impl<T> Edge<T> {
    pub fn new(parent: T, child: T) -> Self {
        Edge { parent, child }
    }
}

type Renderer<T> = Box<dyn Fn(&T) -> String>;

/// A dependency graph over vertices of type `T`.
///
/// Vertices keep their insertion order, which makes the computed order
/// deterministic for a given sequence of `add_vertex`/`add_edge` calls.
pub struct DependencyGraph<T> {
    graph: DiGraph<T, ()>,
    nodes: HashMap<T, NodeIndex>,
    renderer: Renderer<T>,
}

impl<T> DependencyGraph<T>
where
    T: Clone + Eq + Hash + fmt::Debug + 'static,
{
    /// Create an empty graph that renders vertices with their `Debug` output.
    pub fn new() -> Self {
        DependencyGraph {
            graph: DiGraph::new(),
            nodes: HashMap::new(),
            renderer: Box::new(|vertex: &T| format!("{:?}", vertex)),
        }
    }

    /// Replace the renderer used for vertices in diagnostics.
    pub fn with_renderer(mut self, renderer: impl Fn(&T) -> String + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Add a vertex. Returns `false` if it was already present.
    pub fn add_vertex(&mut self, vertex: T) -> bool {
        if self.nodes.contains_key(&vertex) {
            return false;
        }

        let node = self.graph.add_node(vertex.clone());
        self.nodes.insert(vertex, node);
        true
    }

    /// Check whether `vertex` is part of the graph.
    pub fn contains_vertex(&self, vertex: &T) -> bool {
        self.nodes.contains_key(vertex)
    }

    /// Record that `parent` depends on `child`.
    ///
    /// Both ends must already be vertices. Adding the same edge twice is a no-op.
    pub fn add_edge(&mut self, parent: &T, child: &T) -> Result<(), GraphError> {
        let from = self.node(parent)?;
        let to = self.node(child)?;

        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
        Ok(())
    }

    /// Check whether the edge `parent -> child` exists.
    pub fn contains_edge(&self, parent: &T, child: &T) -> bool {
        match (self.nodes.get(parent), self.nodes.get(child)) {
            (Some(&from), Some(&to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &T> + '_ {
        self.graph.node_indices().map(move |n| &self.graph[n])
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> Vec<Edge<T>> {
        self.graph
            .edge_references()
            .map(|e| Edge::new(self.graph[e.source()].clone(), self.graph[e.target()].clone()))
            .collect()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Check if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Render a vertex with the configured renderer.
    pub fn render(&self, vertex: &T) -> String {
        (self.renderer)(vertex)
    }

    /// Compute an order in which every child precedes all of its parents.
    ///
    /// Works in rounds: each round emits, in insertion order, every vertex
    /// whose children were all emitted by earlier rounds. A round that emits
    /// nothing means the remaining vertices contain a cycle.
    pub fn calculate_order(&self) -> Result<Vec<T>, GraphError> {
        let count = self.graph.node_count();
        let mut emitted = vec![false; count];
        let mut order = Vec::with_capacity(count);

        while order.len() < count {
            let round: Vec<NodeIndex> = self
                .graph
                .node_indices()
                .filter(|n| !emitted[n.index()])
                .filter(|&n| self.graph.neighbors(n).all(|child| emitted[child.index()]))
                .collect();

            if round.is_empty() {
                return Err(self.cycle_error());
            }

            for node in round {
                emitted[node.index()] = true;
                order.push(self.graph[node].clone());
            }
        }

        Ok(order)
    }

    fn node(&self, vertex: &T) -> Result<NodeIndex, GraphError> {
        self.nodes
            .get(vertex)
            .copied()
            .ok_or_else(|| GraphError::UnknownVertex {
                vertex: self.render(vertex),
            })
    }

    fn cycle_error(&self) -> GraphError {
        let components = tarjan_scc(&self.graph);
        let cyclic = components
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .min_by_key(|scc| scc.iter().min().copied());

        let cycle = match cyclic {
            Some(members) => {
                let members: HashSet<NodeIndex> = members.into_iter().collect();
                self.walk_cycle(&members)
                    .into_iter()
                    .map(|n| self.render(&self.graph[n]))
                    .collect()
            }
            None => Vec::new(),
        };

        GraphError::CyclicDependency { cycle }
    }

    /// Follow edges inside one strongly connected component until a vertex
    /// repeats, and return that closed walk.
    fn walk_cycle(&self, members: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
        let Some(&start) = members.iter().min() else {
            return Vec::new();
        };

        let mut path = vec![start];
        let mut current = start;
        loop {
            let Some(next) = self
                .graph
                .neighbors(current)
                .filter(|n| members.contains(n))
                .min()
            else {
                return path;
            };

            if let Some(pos) = path.iter().position(|&n| n == next) {
                path.drain(..pos);
                path.push(next);
                return path;
            }
            path.push(next);
            current = next;
        }
    }
}

impl<T> Default for DependencyGraph<T>
where
    T: Clone + Eq + Hash + fmt::Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for DependencyGraph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("vertices", &self.graph.node_weights().collect::<Vec<_>>())
            .field("edges", &self.graph.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(vertices: &[&'static str], edges: &[(&'static str, &'static str)]) -> DependencyGraph<&'static str> {
        let mut graph = DependencyGraph::new();
        for v in vertices {
            graph.add_vertex(*v);
        }
        for (parent, child) in edges {
            graph.add_edge(parent, child).unwrap();
        }
        graph
    }

    fn position(order: &[&str], vertex: &str) -> usize {
        order.iter().position(|v| *v == vertex).unwrap()
    }

    #[test]
    fn test_tree_order() {
        let graph = graph(
            &["o1", "o11", "o12", "o121", "o2"],
            &[("o1", "o11"), ("o1", "o12"), ("o12", "o121"), ("o1", "o2")],
        );

        let order = graph.calculate_order().unwrap();
        assert_eq!(order, vec!["o11", "o121", "o2", "o12", "o1"]);
    }

    #[test]
    fn test_children_precede_parents() {
        let graph = graph(
            &["app", "ui", "core", "util", "log"],
            &[
                ("app", "ui"),
                ("app", "core"),
                ("ui", "core"),
                ("core", "util"),
                ("ui", "log"),
                ("util", "log"),
            ],
        );

        let order = graph.calculate_order().unwrap();
        assert_eq!(order.len(), 5);
        for edge in graph.edges() {
            assert!(position(&order, edge.child) < position(&order, edge.parent));
        }
    }

    #[test]
    fn test_forest() {
        let graph = graph(
            &["o1", "o2", "o3", "t1", "t2"],
            &[("o1", "o2"), ("o2", "o3"), ("t1", "t2")],
        );

        let order = graph.calculate_order().unwrap();
        assert_eq!(order.len(), 5);
        assert!(position(&order, "o3") < position(&order, "o2"));
        assert!(position(&order, "o2") < position(&order, "o1"));
        assert!(position(&order, "t2") < position(&order, "t1"));
    }

    #[test]
    fn test_three_cycle() {
        let graph = graph(
            &["o1", "o2", "o3"],
            &[("o1", "o2"), ("o2", "o3"), ("o3", "o1")],
        );

        let err = graph.calculate_order().unwrap_err();
        assert_eq!(err.error_code(), CYCLIC_DEPENDENCIES);
        match err {
            GraphError::CyclicDependency { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert_eq!(cycle.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_behind_acyclic_part() {
        let graph = graph(
            &["a", "b", "c", "leaf"],
            &[("a", "b"), ("b", "c"), ("c", "b"), ("c", "leaf")],
        );

        let err = graph.calculate_order().unwrap_err();
        assert!(err.to_string().ends_with("\"b\" -> \"c\" -> \"b\""));
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = graph(&["solo"], &[("solo", "solo")]);
        assert!(matches!(
            graph.calculate_order(),
            Err(GraphError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_edge_requires_vertices() {
        let mut graph = DependencyGraph::new();
        graph.add_vertex("a");
        assert!(graph.contains_vertex(&"a"));
        assert!(!graph.contains_vertex(&"missing"));

        let err = graph.add_edge(&"a", &"missing").unwrap_err();
        assert!(matches!(err, GraphError::UnknownVertex { .. }));
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let mut graph = graph(&["a", "b"], &[("a", "b"), ("a", "b")]);
        assert!(!graph.add_vertex("a"));
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges(), vec![Edge::new("a", "b")]);
    }

    #[test]
    fn test_custom_renderer() {
        let mut graph = DependencyGraph::new().with_renderer(|v: &u32| format!("#{v}"));
        graph.add_vertex(1);
        graph.add_vertex(2);
        graph.add_edge(&1, &2).unwrap();
        graph.add_edge(&2, &1).unwrap();

        let err = graph.calculate_order().unwrap_err();
        assert_eq!(err.to_string(), "cyclic dependencies detected: #1 -> #2 -> #1");
    }
}
