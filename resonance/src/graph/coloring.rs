//! Graph coloring with a fixed palette.
use std::time::Duration;

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use resonance_formula::Graph;

use super::{choose_min_by_key, edge_score};
use crate::context::{Context, Severity};
use crate::search::{run_search, LocalSearch, SearchState};

/// Result of a [`GraphColoringSolver::solve`] call.
#[derive(Clone, Debug)]
pub struct GraphColoringResult {
    /// Whether no edge connects two vertices of the same color.
    pub has_coloring: bool,
    /// Color of each vertex, in `0..colors`.
    pub coloring: Vec<usize>,
    /// Number of distinct colors in `coloring`.
    pub colors_used: usize,
    /// Number of edges whose endpoints share a color.
    pub conflicts: usize,
    pub iterations: u64,
    pub converged: bool,
    pub state: SearchState,
    pub elapsed: Duration,
}

struct ColoringSearch<'g> {
    graph: &'g Graph,
    colors: usize,
    coloring: Vec<usize>,
    conflicts: usize,
}

impl<'g> ColoringSearch<'g> {
    /// Greedy start: every vertex gets the smallest color not used by its colored neighbors, or
    /// the color with the fewest conflicts if the palette is exhausted.
    fn new(graph: &'g Graph, colors: usize) -> ColoringSearch<'g> {
        let mut search = ColoringSearch {
            graph,
            colors,
            coloring: vec![0; graph.vertex_count()],
            conflicts: 0,
        };

        let mut colored = vec![false; graph.vertex_count()];
        for vertex in 0..graph.vertex_count() {
            let mut usage = vec![0usize; colors];
            for &neighbor in graph.neighbors(vertex) {
                if colored[neighbor] {
                    usage[search.coloring[neighbor]] += 1;
                }
            }
            let color = (0..colors).min_by_key(|&color| usage[color]).unwrap_or(0);
            search.coloring[vertex] = color;
            colored[vertex] = true;
        }

        search.recount();
        search
    }

    fn recount(&mut self) {
        let coloring = &self.coloring;
        self.conflicts = self
            .graph
            .edges()
            .iter()
            .filter(|&&(a, b)| coloring[a] == coloring[b])
            .count();
    }

    /// Number of neighbors of `vertex` with the given color.
    fn conflicts_with(&self, vertex: usize, color: usize) -> usize {
        self.graph
            .neighbors(vertex)
            .iter()
            .filter(|&&neighbor| self.coloring[neighbor] == color)
            .count()
    }

    fn recolor(&mut self, vertex: usize, color: usize) {
        let before = self.conflicts_with(vertex, self.coloring[vertex]);
        let after = self.conflicts_with(vertex, color);
        self.coloring[vertex] = color;
        self.conflicts = self.conflicts + after - before;
    }

    fn colors_used(&self) -> usize {
        let mut used = vec![false; self.colors];
        for &color in self.coloring.iter() {
            used[color] = true;
        }
        used.into_iter().filter(|&used| used).count()
    }
}

impl<'g> LocalSearch for ColoringSearch<'g> {
    type Snapshot = Vec<usize>;

    fn score(&self) -> f64 {
        edge_score(self.conflicts, self.graph.edge_count())
    }

    fn is_solution(&self) -> bool {
        self.conflicts == 0
    }

    /// Recolors a random conflicting vertex with the color of fewest conflicts.
    fn perturb(&mut self, rng: &mut StdRng, noise: f64) {
        let coloring = &self.coloring;
        let conflicting: Vec<usize> = (0..coloring.len())
            .filter(|&vertex| {
                self.graph
                    .neighbors(vertex)
                    .iter()
                    .any(|&neighbor| coloring[neighbor] == coloring[vertex])
            })
            .collect();

        let vertex = match conflicting.choose(rng) {
            Some(&vertex) => vertex,
            None => return,
        };

        let current = self.coloring[vertex];
        let others = (0..self.colors).filter(|&color| color != current);

        let color = if rng.gen_bool(noise) {
            others.collect::<Vec<_>>().choose(rng).copied()
        } else {
            choose_min_by_key(others, rng, |color| self.conflicts_with(vertex, color))
        };

        if let Some(color) = color {
            self.recolor(vertex, color);
        }
    }

    fn snapshot(&self) -> Vec<usize> {
        self.coloring.clone()
    }

    fn restore(&mut self, snapshot: Vec<usize>) {
        self.coloring = snapshot;
        self.recount();
    }
}

/// Local search for a proper coloring with a given number of colors.
pub struct GraphColoringSolver<'a> {
    ctx: &'a mut Context,
}

impl<'a> GraphColoringSolver<'a> {
    /// Create a solver using the configuration of the given context.
    pub fn new(ctx: &'a mut Context) -> GraphColoringSolver<'a> {
        GraphColoringSolver { ctx }
    }

    /// Search for a coloring using at most `colors` colors.
    pub fn solve(&mut self, graph: &Graph, colors: usize) -> GraphColoringResult {
        let solve = self.ctx.begin_solve();
        info!(
            "solve {}: {}-coloring for {} vertices and {} edges",
            solve,
            colors,
            graph.vertex_count(),
            graph.edge_count()
        );

        if graph.is_empty() {
            self.ctx.report(Severity::Warning, "graph has no vertices");
            return GraphColoringResult {
                has_coloring: true,
                coloring: vec![],
                colors_used: 0,
                conflicts: 0,
                iterations: 0,
                converged: true,
                state: SearchState::Converged,
                elapsed: Duration::default(),
            };
        }

        if colors == 0 {
            self.ctx
                .report(Severity::Warning, "cannot color vertices with zero colors");
            return GraphColoringResult {
                has_coloring: false,
                coloring: vec![],
                colors_used: 0,
                conflicts: graph.edge_count(),
                iterations: 0,
                converged: false,
                state: SearchState::Exhausted,
                elapsed: Duration::default(),
            };
        }

        let mut search = ColoringSearch::new(graph, colors);
        let outcome = run_search(&mut search, self.ctx.config());

        let result = GraphColoringResult {
            has_coloring: search.is_solution(),
            colors_used: search.colors_used(),
            conflicts: search.conflicts,
            coloring: search.coloring,
            iterations: outcome.iterations,
            converged: outcome.converged(),
            state: outcome.state,
            elapsed: outcome.elapsed,
        };

        info!(
            "solve {}: coloring {} after {} iterations ({} conflicts)",
            solve,
            if result.has_coloring {
                "found"
            } else {
                "unknown"
            },
            result.iterations,
            result.conflicts
        );

        result
    }
}
