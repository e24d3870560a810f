//! Hamiltonian paths by segment reversal.
use std::cmp::Reverse;
use std::time::Duration;

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use resonance_formula::Graph;

use super::choose_min_by_key;
use crate::context::{Context, Severity};
use crate::search::{run_search, LocalSearch, SearchState};

/// Result of a [`HamiltonianPathSolver::solve`] call.
#[derive(Clone, Debug)]
pub struct HamiltonianPathResult {
    /// Whether `path` visits every vertex.
    pub has_path: bool,
    /// Longest run of adjacent vertices in the final order. The whole order if `has_path`.
    pub path: Vec<usize>,
    /// The final vertex order, a permutation of all vertices.
    pub order: Vec<usize>,
    /// Number of edges of `path`.
    pub length: usize,
    pub iterations: u64,
    pub converged: bool,
    pub state: SearchState,
    pub elapsed: Duration,
}

/// Greedy start order.
///
/// Starts at a vertex of minimal degree and always continues with the unvisited neighbor that has
/// the fewest unvisited neighbors. When stuck it continues with the lowest unvisited vertex.
fn warnsdorff_order(graph: &Graph) -> Vec<usize> {
    let n = graph.vertex_count();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);

    let unvisited_degree = |visited: &[bool], vertex: usize| {
        graph
            .neighbors(vertex)
            .iter()
            .filter(|&&neighbor| !visited[neighbor])
            .count()
    };

    let mut current = (0..n).min_by_key(|&vertex| graph.degree(vertex));

    while let Some(vertex) = current {
        visited[vertex] = true;
        order.push(vertex);

        current = graph
            .neighbors(vertex)
            .iter()
            .copied()
            .filter(|&neighbor| !visited[neighbor])
            .min_by_key(|&neighbor| (unvisited_degree(&visited, neighbor), neighbor))
            .or_else(|| (0..n).find(|&vertex| !visited[vertex]));
    }

    order
}

/// A segment reversal `order[start..=end]`.
#[derive(Copy, Clone, Debug)]
struct Reversal {
    start: usize,
    end: usize,
}

struct PathSearch<'g> {
    graph: &'g Graph,
    order: Vec<usize>,
    links: usize,
}

impl<'g> PathSearch<'g> {
    fn new(graph: &'g Graph, order: Vec<usize>) -> PathSearch<'g> {
        let mut search = PathSearch {
            graph,
            order,
            links: 0,
        };
        search.recount();
        search
    }

    fn linked(&self, a: usize, b: usize) -> bool {
        self.graph.has_edge(self.order[a], self.order[b])
    }

    fn recount(&mut self) {
        self.links = (1..self.order.len())
            .filter(|&pos| self.linked(pos - 1, pos))
            .count();
    }

    /// Change of the link count when applying a reversal.
    ///
    /// Only the links at both boundaries of the segment change.
    fn delta(&self, reversal: Reversal) -> isize {
        let Reversal { start, end } = reversal;
        let mut delta = 0;
        if start > 0 {
            delta += self.linked(start - 1, end) as isize - self.linked(start - 1, start) as isize;
        }
        if end + 1 < self.order.len() {
            delta += self.linked(start, end + 1) as isize - self.linked(end, end + 1) as isize;
        }
        delta
    }

    fn apply(&mut self, reversal: Reversal) {
        let delta = self.delta(reversal);
        self.order[reversal.start..=reversal.end].reverse();
        self.links = (self.links as isize + delta) as usize;
    }

    /// Reversals that replace the broken link between `pos` and `pos + 1`.
    fn repairs(&self, pos: usize) -> Vec<Reversal> {
        let n = self.order.len();
        let after = (pos + 2..n).map(|end| Reversal {
            start: pos + 1,
            end,
        });
        let before = (0..pos).map(|start| Reversal { start, end: pos });
        after.chain(before).collect()
    }

    /// Longest run of consecutive linked vertices.
    fn longest_path(&self) -> Vec<usize> {
        let mut best = 0..self.order.len().min(1);
        let mut start = 0;
        for pos in 1..=self.order.len() {
            if pos == self.order.len() || !self.linked(pos - 1, pos) {
                if pos - start > best.len() {
                    best = start..pos;
                }
                start = pos;
            }
        }
        self.order[best].to_vec()
    }
}

impl<'g> LocalSearch for PathSearch<'g> {
    type Snapshot = Vec<usize>;

    fn score(&self) -> f64 {
        if self.order.len() <= 1 {
            1.0
        } else {
            self.links as f64 / (self.order.len() - 1) as f64
        }
    }

    fn is_solution(&self) -> bool {
        self.links + 1 >= self.order.len()
    }

    /// Reverses a segment that starts or ends at a random broken link.
    fn perturb(&mut self, rng: &mut StdRng, noise: f64) {
        let broken: Vec<usize> = (1..self.order.len())
            .filter(|&pos| !self.linked(pos - 1, pos))
            .map(|pos| pos - 1)
            .collect();

        let pos = match broken.choose(rng) {
            Some(&pos) => pos,
            None => return,
        };

        let repairs = self.repairs(pos);
        let reversal = if rng.gen_bool(noise) {
            repairs.choose(rng).copied()
        } else {
            choose_min_by_key(repairs.iter().copied(), rng, |reversal| {
                Reverse(self.delta(reversal))
            })
        };

        if let Some(reversal) = reversal {
            self.apply(reversal);
        }
    }

    fn snapshot(&self) -> Vec<usize> {
        self.order.clone()
    }

    fn restore(&mut self, snapshot: Vec<usize>) {
        self.order = snapshot;
        self.recount();
    }
}

/// Local search for a path visiting every vertex exactly once.
pub struct HamiltonianPathSolver<'a> {
    ctx: &'a mut Context,
}

impl<'a> HamiltonianPathSolver<'a> {
    /// Create a solver using the configuration of the given context.
    pub fn new(ctx: &'a mut Context) -> HamiltonianPathSolver<'a> {
        HamiltonianPathSolver { ctx }
    }

    /// Search for a Hamiltonian path.
    pub fn solve(&mut self, graph: &Graph) -> HamiltonianPathResult {
        let solve = self.ctx.begin_solve();
        info!(
            "solve {}: hamiltonian path for {} vertices and {} edges",
            solve,
            graph.vertex_count(),
            graph.edge_count()
        );

        if graph.is_empty() {
            self.ctx.report(Severity::Warning, "graph has no vertices");
            return HamiltonianPathResult {
                has_path: true,
                path: vec![],
                order: vec![],
                length: 0,
                iterations: 0,
                converged: true,
                state: SearchState::Converged,
                elapsed: Duration::default(),
            };
        }

        let mut search = PathSearch::new(graph, warnsdorff_order(graph));
        let outcome = run_search(&mut search, self.ctx.config());

        let path = search.longest_path();
        let result = HamiltonianPathResult {
            has_path: search.is_solution(),
            length: path.len().saturating_sub(1),
            path,
            order: search.order,
            iterations: outcome.iterations,
            converged: outcome.converged(),
            state: outcome.state,
            elapsed: outcome.elapsed,
        };

        info!(
            "solve {}: path {} after {} iterations (length {})",
            solve,
            if result.has_path { "found" } else { "unknown" },
            result.iterations,
            result.length
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use resonance_formula::{graph::strategy::graph, test::graph_with_path};

    use crate::config::SolverConfig;

    fn is_path(graph: &Graph, path: &[usize]) -> bool {
        path.windows(2).all(|pair| graph.has_edge(pair[0], pair[1]))
    }

    fn is_permutation(order: &[usize], n: usize) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        sorted == (0..n).collect::<Vec<_>>()
    }

    #[test]
    fn path_graph() {
        let mut ctx = Context::new(SolverConfig::new(100, 0.01));
        let input = Graph::path(4);
        let result = HamiltonianPathSolver::new(&mut ctx).solve(&input);

        assert!(result.has_path);
        assert_eq!(result.length, 3);
        assert_eq!(result.path.len(), 4);
        assert!(is_path(&input, &result.path));
    }

    #[test]
    fn greedy_start_follows_low_degree() {
        let input = Graph::from_edges(5, vec![(0, 1), (1, 2), (2, 3), (3, 4), (0, 2), (1, 3)]);
        let order = warnsdorff_order(&input);

        assert_eq!(order, vec![4, 3, 1, 0, 2]);
        assert!(is_path(&input, &order));
    }

    #[test]
    fn star_has_no_path() {
        let mut ctx = Context::new(SolverConfig::new(200, 0.0));
        let star = Graph::from_edges(4, (1..4).map(|leaf| (0, leaf)));
        let result = HamiltonianPathSolver::new(&mut ctx).solve(&star);

        assert!(!result.has_path);
        assert_eq!(result.length, 2);
        assert!(is_path(&star, &result.path));
        assert!(is_permutation(&result.order, 4));
    }

    #[test]
    fn degenerate_graphs() {
        let mut ctx = Context::new(SolverConfig::new(100, 0.01));

        let result = HamiltonianPathSolver::new(&mut ctx).solve(&Graph::new(0));
        assert!(result.has_path);
        assert_eq!(result.iterations, 0);
        assert_eq!(ctx.diagnostics().len(), 1);

        let result = HamiltonianPathSolver::new(&mut ctx).solve(&Graph::new(1));
        assert!(result.has_path);
        assert_eq!(result.path, vec![0]);
        assert_eq!(result.length, 0);

        let result = HamiltonianPathSolver::new(&mut ctx).solve(&Graph::new(3));
        assert!(!result.has_path);
        assert_eq!(result.path.len(), 1);
        assert_eq!(result.length, 0);
    }

    #[test]
    fn reversal_repairs_broken_link() {
        let mut config = SolverConfig::new(100, 0.0);
        config.noise = 0.0;
        let input = Graph::path(6);

        let mut search = PathSearch::new(&input, vec![0, 1, 2, 5, 4, 3]);
        assert_eq!(search.links, 4);
        assert_eq!(search.longest_path(), vec![5, 4, 3]);

        let outcome = run_search(&mut search, &config);

        assert!(outcome.solved);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(search.order, vec![0, 1, 2, 3, 4, 5]);
    }

    proptest! {
        #[test]
        fn reported_path_is_consistent(
            input in graph(0..15usize, 0.3),
            max_iterations in 0..300u64,
        ) {
            let mut ctx = Context::new(SolverConfig::new(max_iterations, 0.0));
            let result = HamiltonianPathSolver::new(&mut ctx).solve(&input);

            prop_assert!(result.iterations <= max_iterations);
            prop_assert!(is_permutation(&result.order, input.vertex_count()));
            prop_assert!(is_path(&input, &result.path));
            prop_assert_eq!(result.length, result.path.len().saturating_sub(1));
            prop_assert_eq!(result.has_path, result.path.len() == input.vertex_count());
        }

        #[test]
        fn finds_hidden_paths(input in graph_with_path(2..10usize, 0.3)) {
            let mut config = SolverConfig::new(50_000, 0.0);
            config.stall_patience = 50_000;
            let mut ctx = Context::new(config);
            let result = HamiltonianPathSolver::new(&mut ctx).solve(&input);

            prop_assert!(result.has_path);
            prop_assert_eq!(result.length, input.vertex_count() - 1);
        }
    }
}
