//! Local search solvers for graph problems.
//!
//! All solvers use the driver in [`search`](crate::search) and share its incompleteness: a
//! result without a solution says nothing about whether one exists.

mod coloring;
mod hamiltonian;
mod vertex_cover;

pub use coloring::{GraphColoringResult, GraphColoringSolver};
pub use hamiltonian::{HamiltonianPathResult, HamiltonianPathSolver};
pub use vertex_cover::{VertexCoverResult, VertexCoverSolver};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Fraction of edges that are fine, `1.0` for graphs without edges.
fn edge_score(bad_edges: usize, edge_count: usize) -> f64 {
    if edge_count == 0 {
        1.0
    } else {
        1.0 - bad_edges as f64 / edge_count as f64
    }
}

/// Uniformly chooses one of the items with the minimal key.
fn choose_min_by_key<T: Copy, K: Ord + Copy>(
    items: impl IntoIterator<Item = T>,
    rng: &mut StdRng,
    key: impl Fn(T) -> K,
) -> Option<T> {
    let mut best: Vec<T> = vec![];
    let mut best_key = None;
    for item in items {
        let item_key = key(item);
        match best_key {
            Some(current) if item_key > current => continue,
            Some(current) if item_key == current => best.push(item),
            _ => {
                best_key = Some(item_key);
                best.clear();
                best.push(item);
            }
        }
    }
    best.choose(rng).copied()
}
