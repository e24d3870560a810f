//! Resonance is a family of budgeted local-search solvers for boolean satisfiability and a few
//! graph problems.
//!
//! Every solver follows the same pipeline: the problem is encoded into a numeric score state, a
//! seeded local search perturbs a candidate solution until it either finds a solution, stops
//! improving or runs out of iterations, and the best candidate seen is reported.
//!
//! The solvers are incomplete. A search that does not converge on a solution says nothing about
//! whether a solution exists.
//!
//! Solvers are created from an explicitly constructed [`Context`](context::Context), which holds
//! the configuration and collects diagnostics about degenerate input.

pub mod config;
pub mod context;
pub mod encode;
pub mod graph;
pub mod sat;
pub mod search;

pub use resonance_formula::{clause, cnf, lit, Assignment, Clause, Formula, Graph, Lit, Var};

pub mod dimacs {
    //! DIMACS CNF and edge format parsers and writers.
    pub use resonance_dimacs::*;
}

pub use config::{SolverConfig, SolverConfigUpdate};
pub use context::Context;
pub use graph::{GraphColoringSolver, HamiltonianPathSolver, VertexCoverSolver};
pub use sat::{SatSolver, SolveResult};
