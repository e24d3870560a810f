//! Vertex cover of a given size.
use std::time::Duration;

use log::info;
use rand::rngs::StdRng;
use rand::Rng;

use resonance_formula::Graph;

use super::{choose_min_by_key, edge_score};
use crate::context::{Context, Severity};
use crate::search::{run_search, LocalSearch, SearchState};

/// Result of a [`VertexCoverSolver::solve`] call.
#[derive(Clone, Debug)]
pub struct VertexCoverResult {
    /// Whether `cover` covers every edge.
    pub has_cover: bool,
    /// Selected vertices in increasing order.
    pub cover: Vec<usize>,
    /// Number of selected vertices.
    pub cost: usize,
    /// Number of edges without a selected endpoint.
    pub uncovered_edges: usize,
    pub iterations: u64,
    pub converged: bool,
    pub state: SearchState,
    pub elapsed: Duration,
}

/// Search state: a fixed size vertex subset.
struct CoverSearch<'g> {
    graph: &'g Graph,
    selected: Vec<bool>,
    uncovered: usize,
}

impl<'g> CoverSearch<'g> {
    /// Starts with the `size` vertices of highest degree.
    fn new(graph: &'g Graph, size: usize) -> CoverSearch<'g> {
        let mut by_degree: Vec<usize> = (0..graph.vertex_count()).collect();
        by_degree.sort_by_key(|&vertex| std::cmp::Reverse(graph.degree(vertex)));

        let mut selected = vec![false; graph.vertex_count()];
        for &vertex in by_degree.iter().take(size) {
            selected[vertex] = true;
        }

        let mut search = CoverSearch {
            graph,
            selected,
            uncovered: 0,
        };
        search.recount();
        search
    }

    fn recount(&mut self) {
        let selected = &self.selected;
        self.uncovered = self
            .graph
            .edges()
            .iter()
            .filter(|&&(a, b)| !selected[a] && !selected[b])
            .count();
    }

    /// Number of edges of `vertex` whose other endpoint is not selected.
    ///
    /// For a selected vertex these edges are uncovered by removing it, for an unselected vertex
    /// they are covered by adding it.
    fn open_edges(&self, vertex: usize) -> usize {
        self.graph
            .neighbors(vertex)
            .iter()
            .filter(|&&neighbor| !self.selected[neighbor])
            .count()
    }

    fn set(&mut self, vertex: usize, value: bool) {
        if self.selected[vertex] == value {
            return;
        }
        let changed = self.open_edges(vertex);
        self.selected[vertex] = value;
        if value {
            self.uncovered -= changed;
        } else {
            self.uncovered += changed;
        }
    }

    fn cover(&self) -> Vec<usize> {
        (0..self.selected.len())
            .filter(|&vertex| self.selected[vertex])
            .collect()
    }
}

impl<'g> LocalSearch for CoverSearch<'g> {
    type Snapshot = Vec<bool>;

    fn score(&self) -> f64 {
        edge_score(self.uncovered, self.graph.edge_count())
    }

    fn is_solution(&self) -> bool {
        self.uncovered == 0
    }

    /// Moves the cover towards an uncovered edge.
    ///
    /// One endpoint of a random uncovered edge joins the cover and the selected vertex whose
    /// removal uncovers the fewest edges leaves it.
    fn perturb(&mut self, rng: &mut StdRng, noise: f64) {
        let selected = &self.selected;
        let uncovered: Vec<(usize, usize)> = self
            .graph
            .edges()
            .iter()
            .copied()
            .filter(|&(a, b)| !selected[a] && !selected[b])
            .collect();

        if uncovered.is_empty() {
            return;
        }
        let members = self.cover();
        if members.is_empty() {
            return;
        }

        let (a, b) = uncovered[rng.gen_range(0, uncovered.len())];
        let random = rng.gen_bool(noise);

        let (gain_a, gain_b) = (self.open_edges(a), self.open_edges(b));
        let entering = if random || gain_a == gain_b {
            if rng.gen_bool(0.5) {
                a
            } else {
                b
            }
        } else if gain_a > gain_b {
            a
        } else {
            b
        };

        self.set(entering, true);

        let leaving = if random {
            Some(members[rng.gen_range(0, members.len())])
        } else {
            choose_min_by_key(members.iter().copied(), rng, |vertex| self.open_edges(vertex))
        };

        if let Some(leaving) = leaving {
            self.set(leaving, false);
        }
    }

    fn snapshot(&self) -> Vec<bool> {
        self.selected.clone()
    }

    fn restore(&mut self, snapshot: Vec<bool>) {
        self.selected = snapshot;
        self.recount();
    }
}

/// Local search for a vertex cover with a given number of vertices.
pub struct VertexCoverSolver<'a> {
    ctx: &'a mut Context,
}

impl<'a> VertexCoverSolver<'a> {
    /// Create a solver using the configuration of the given context.
    pub fn new(ctx: &'a mut Context) -> VertexCoverSolver<'a> {
        VertexCoverSolver { ctx }
    }

    /// Search for `cover_size` vertices that cover every edge.
    ///
    /// A cover size larger than the vertex count is clamped to the vertex count.
    pub fn solve(&mut self, graph: &Graph, cover_size: usize) -> VertexCoverResult {
        let solve = self.ctx.begin_solve();
        info!(
            "solve {}: vertex cover of size {} for {} vertices and {} edges",
            solve,
            cover_size,
            graph.vertex_count(),
            graph.edge_count()
        );

        if graph.is_empty() {
            self.ctx.report(Severity::Warning, "graph has no vertices");
            return VertexCoverResult {
                has_cover: true,
                cover: vec![],
                cost: 0,
                uncovered_edges: 0,
                iterations: 0,
                converged: true,
                state: SearchState::Converged,
                elapsed: Duration::default(),
            };
        }

        let size = if cover_size > graph.vertex_count() {
            self.ctx.report(
                Severity::Info,
                format!(
                    "cover size {} clamped to the vertex count {}",
                    cover_size,
                    graph.vertex_count()
                ),
            );
            graph.vertex_count()
        } else {
            cover_size
        };

        let mut search = CoverSearch::new(graph, size);
        let outcome = run_search(&mut search, self.ctx.config());
        let cover = search.cover();

        let result = VertexCoverResult {
            has_cover: search.is_solution(),
            cost: cover.len(),
            cover,
            uncovered_edges: search.uncovered,
            iterations: outcome.iterations,
            converged: outcome.converged(),
            state: outcome.state,
            elapsed: outcome.elapsed,
        };

        info!(
            "solve {}: cover {} after {} iterations ({} uncovered edges)",
            solve,
            if result.has_cover { "found" } else { "unknown" },
            result.iterations,
            result.uncovered_edges
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use resonance_formula::graph::strategy::graph;

    use crate::config::SolverConfig;

    fn covers(graph: &Graph, cover: &[usize]) -> bool {
        graph
            .edges()
            .iter()
            .all(|(a, b)| cover.contains(a) || cover.contains(b))
    }

    #[test]
    fn triangle_needs_two_vertices() {
        let mut ctx = Context::new(SolverConfig::new(100, 0.01));
        let triangle = Graph::cycle(3);

        let result = VertexCoverSolver::new(&mut ctx).solve(&triangle, 2);
        assert!(result.has_cover);
        assert_eq!(result.cost, 2);
        assert!(covers(&triangle, &result.cover));

        let result = VertexCoverSolver::new(&mut ctx).solve(&triangle, 1);
        assert!(!result.has_cover);
        assert_eq!(result.cost, 1);
        assert_eq!(result.uncovered_edges, 1);
    }

    #[test]
    fn star_center() {
        let mut ctx = Context::new(SolverConfig::new(100, 0.01));
        let star = Graph::from_edges(6, (1..6).map(|leaf| (0, leaf)));

        let result = VertexCoverSolver::new(&mut ctx).solve(&star, 1);
        assert!(result.has_cover);
        assert_eq!(result.cover, vec![0]);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn finds_cover_of_even_cycle() {
        let mut config = SolverConfig::new(10_000, 0.0);
        config.stall_patience = 10_000;
        let mut ctx = Context::new(config);
        let cycle = Graph::cycle(8);

        let result = VertexCoverSolver::new(&mut ctx).solve(&cycle, 4);
        assert!(result.has_cover);
        assert_eq!(result.cost, 4);
        assert!(covers(&cycle, &result.cover));
    }

    #[test]
    fn degenerate_graphs() {
        let mut ctx = Context::new(SolverConfig::new(100, 0.01));

        let result = VertexCoverSolver::new(&mut ctx).solve(&Graph::new(0), 3);
        assert!(result.has_cover);
        assert_eq!(result.cost, 0);
        assert_eq!(result.iterations, 0);
        assert_eq!(ctx.diagnostics().len(), 1);

        let result = VertexCoverSolver::new(&mut ctx).solve(&Graph::path(3), 5);
        assert!(result.has_cover);
        assert_eq!(result.cost, 3);
        assert_eq!(ctx.diagnostics().len(), 2);
        assert_eq!(ctx.diagnostics()[1].severity, Severity::Info);

        let result = VertexCoverSolver::new(&mut ctx).solve(&Graph::path(3), 0);
        assert!(!result.has_cover);
        assert_eq!(result.uncovered_edges, 2);
        assert!(result.iterations <= 100);
    }

    proptest! {
        #[test]
        fn reported_cover_is_consistent(
            input in graph(0..20usize, 0.3),
            size in 0..20usize,
            max_iterations in 0..300u64,
        ) {
            let mut ctx = Context::new(SolverConfig::new(max_iterations, 0.0));
            let result = VertexCoverSolver::new(&mut ctx).solve(&input, size);

            prop_assert!(result.iterations <= max_iterations);
            prop_assert_eq!(result.cost, size.min(input.vertex_count()));
            prop_assert_eq!(result.cost, result.cover.len());
            prop_assert_eq!(result.has_cover, covers(&input, &result.cover));
            prop_assert_eq!(result.has_cover, result.uncovered_edges == 0);
        }
    }
}
