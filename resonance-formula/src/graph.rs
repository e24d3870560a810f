//! Undirected graphs.
use std::cmp::max;
use std::fmt;

/// An undirected simple graph on the vertices `0..vertex_count()`.
///
/// Parallel edges and self loops are ignored when added. Adding an edge with an endpoint past
/// the current vertex count grows the graph.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
}

impl Graph {
    /// Create a graph with `vertex_count` isolated vertices.
    pub fn new(vertex_count: usize) -> Graph {
        Graph {
            adjacency: vec![vec![]; vertex_count],
            edges: vec![],
        }
    }

    /// Create a graph from a list of edges.
    pub fn from_edges(vertex_count: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Graph {
        let mut graph = Graph::new(vertex_count);
        for (a, b) in edges {
            graph.add_edge(a, b);
        }
        graph
    }

    /// The path `0 - 1 - ... - (n - 1)`.
    pub fn path(vertex_count: usize) -> Graph {
        Graph::from_edges(
            vertex_count,
            (1..vertex_count).map(|vertex| (vertex - 1, vertex)),
        )
    }

    /// The cycle on `n` vertices. Needs at least three vertices to contain any edge.
    pub fn cycle(vertex_count: usize) -> Graph {
        let mut graph = Graph::path(vertex_count);
        if vertex_count >= 3 {
            graph.add_edge(vertex_count - 1, 0);
        }
        graph
    }

    /// The complete graph on `n` vertices.
    pub fn complete(vertex_count: usize) -> Graph {
        Graph::from_edges(
            vertex_count,
            (0..vertex_count).flat_map(|a| (0..a).map(move |b| (b, a))),
        )
    }

    /// Increase the number of vertices.
    ///
    /// If the parameter is less than the current vertex count do nothing.
    pub fn set_vertex_count(&mut self, count: usize) {
        let count = max(count, self.adjacency.len());
        self.adjacency.resize(count, vec![]);
    }

    /// Adds an undirected edge.
    ///
    /// Returns `false` if the edge is a self loop or already present.
    pub fn add_edge(&mut self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        self.set_vertex_count(max(a, b) + 1);
        if self.has_edge(a, b) {
            return false;
        }
        self.adjacency[a].push(b);
        self.adjacency[b].push(a);
        self.edges.push((a.min(b), a.max(b)));
        true
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// All edges in insertion order, with the smaller endpoint first.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Neighbors of a vertex in insertion order.
    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        &self.adjacency[vertex]
    }

    /// Number of neighbors of a vertex.
    pub fn degree(&self, vertex: usize) -> usize {
        self.adjacency[vertex].len()
    }

    /// Whether the two vertices are adjacent.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        match (self.adjacency.get(a), self.adjacency.get(b)) {
            (Some(adj_a), Some(adj_b)) => {
                if adj_a.len() <= adj_b.len() {
                    adj_a.contains(&b)
                } else {
                    adj_b.contains(&a)
                }
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.vertex_count())?;
        f.debug_list().entries(self.edges.iter()).finish()
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{prelude::*, *};

    /// Random graph where every possible edge is present with probability `density`.
    pub fn graph(
        vertices: impl Strategy<Value = usize>,
        density: f64,
    ) -> impl Strategy<Value = Graph> {
        vertices.prop_flat_map(move |vertices| {
            let pairs = vertices * vertices.saturating_sub(1) / 2;
            collection::vec(bool::weighted(density), pairs).prop_map(move |present| {
                let mut graph = Graph::new(vertices);
                let all_pairs = (0..vertices).flat_map(|a| (0..a).map(move |b| (b, a)));
                for ((a, b), present) in all_pairs.zip(present) {
                    if present {
                        graph.add_edge(a, b);
                    }
                }
                graph
            })
        })
    }
}
