//! Budgeted local search driver shared by all solvers.
use std::time::{Duration, Instant};

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SolverConfig;

/// State of a local search.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SearchState {
    /// The problem is encoded, no iteration ran yet.
    Initialized,
    /// The search is running.
    Iterating,
    /// A solution was found or the score stopped improving.
    Converged,
    /// The iteration budget was used up.
    Exhausted,
}

impl Default for SearchState {
    fn default() -> SearchState {
        SearchState::Initialized
    }
}

/// A problem that can be solved by perturbing a candidate solution.
pub trait LocalSearch {
    /// Copy of a candidate solution.
    type Snapshot;

    /// Quality of the current candidate in `[0, 1]`, higher is better.
    fn score(&self) -> f64;

    /// Whether the current candidate is a solution.
    fn is_solution(&self) -> bool;

    /// Perform a single local move.
    ///
    /// With probability `noise` a random move should be made instead of a greedy one.
    fn perturb(&mut self, rng: &mut StdRng, noise: f64);

    /// Copy the current candidate.
    fn snapshot(&self) -> Self::Snapshot;

    /// Make a snapshot the current candidate.
    fn restore(&mut self, snapshot: Self::Snapshot);
}

/// Summary of a finished search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Either `Converged` or `Exhausted`.
    pub state: SearchState,
    /// Number of iterations, never more than the configured maximum.
    pub iterations: u64,
    /// Whether the final candidate is a solution.
    pub solved: bool,
    /// Score of the final candidate.
    pub best_score: f64,
    pub elapsed: Duration,
}

impl SearchOutcome {
    /// Whether the search converged, either on a solution or on a plateau.
    pub fn converged(&self) -> bool {
        self.state == SearchState::Converged
    }
}

/// Clamps the configured noise to a probability. NaN disables random moves.
fn move_noise(noise: f64) -> f64 {
    if noise.is_nan() {
        0.0
    } else {
        noise.max(0.0).min(1.0)
    }
}

/// Run a local search until a solution is found, the score stops improving or the budget is
/// used up.
///
/// Every iteration first checks for a solution and then makes one move. An iteration makes
/// progress if it improves the best score by at least `convergence_threshold`; after
/// `stall_patience` consecutive iterations without progress the search converges without a
/// solution. When the search ends without a solution the best candidate seen is restored.
pub fn run_search<P: LocalSearch>(problem: &mut P, config: &SolverConfig) -> SearchOutcome {
    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut state = SearchState::Initialized;
    let mut iterations = 0;
    let mut stalled = 0;

    let mut best_score = problem.score();
    let mut best = problem.snapshot();

    let patience = config.stall_patience.max(1);
    let noise = move_noise(config.noise);

    debug!("search {:?} with score {:.4}", state, best_score);
    state = SearchState::Iterating;

    while iterations < config.max_iterations {
        iterations += 1;

        if problem.is_solution() {
            state = SearchState::Converged;
            break;
        }

        problem.perturb(&mut rng, noise);

        if problem.is_solution() {
            state = SearchState::Converged;
            break;
        }

        let score = problem.score();
        let improvement = score - best_score;

        if improvement > 0.0 {
            best_score = score;
            best = problem.snapshot();
        }

        if improvement < config.convergence_threshold {
            stalled += 1;
            if stalled >= patience {
                debug!(
                    "no progress for {} iterations, best score {:.4}",
                    stalled, best_score
                );
                state = SearchState::Converged;
                break;
            }
        } else {
            stalled = 0;
        }
    }

    let solved = problem.is_solution();

    if state == SearchState::Iterating {
        state = if solved {
            SearchState::Converged
        } else {
            SearchState::Exhausted
        };
    }

    if !solved {
        problem.restore(best);
    }

    let outcome = SearchOutcome {
        state,
        iterations,
        solved,
        best_score: problem.score(),
        elapsed: start.elapsed(),
    };

    debug!(
        "search {:?} after {} iterations, score {:.4}",
        outcome.state, outcome.iterations, outcome.best_score
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::Rng;

    /// Counts up towards a target, random moves go down.
    struct Counter {
        value: u64,
        target: u64,
        step: u64,
    }

    impl LocalSearch for Counter {
        type Snapshot = u64;

        fn score(&self) -> f64 {
            self.value as f64 / self.target as f64
        }

        fn is_solution(&self) -> bool {
            self.value >= self.target
        }

        fn perturb(&mut self, rng: &mut StdRng, noise: f64) {
            if rng.gen_bool(noise) {
                self.value = self.value.saturating_sub(1);
            } else {
                self.value += self.step;
            }
        }

        fn snapshot(&self) -> u64 {
            self.value
        }

        fn restore(&mut self, snapshot: u64) {
            self.value = snapshot;
        }
    }

    fn config(max_iterations: u64, threshold: f64, patience: u64) -> SolverConfig {
        SolverConfig {
            max_iterations,
            convergence_threshold: threshold,
            stall_patience: patience,
            noise: 0.0,
            seed: 1,
        }
    }

    #[test]
    fn converges_on_solution() {
        let mut counter = Counter {
            value: 0,
            target: 5,
            step: 1,
        };
        let outcome = run_search(&mut counter, &config(100, 0.0, 10));

        assert_eq!(outcome.state, SearchState::Converged);
        assert!(outcome.solved);
        assert_eq!(outcome.iterations, 5);
        assert_eq!(outcome.best_score, 1.0);
    }

    #[test]
    fn initial_solution_takes_one_iteration() {
        let mut counter = Counter {
            value: 3,
            target: 3,
            step: 1,
        };
        let outcome = run_search(&mut counter, &config(100, 0.0, 10));

        assert_eq!(outcome.iterations, 1);
        assert!(outcome.converged());
    }

    #[test]
    fn exhausts_budget() {
        let mut counter = Counter {
            value: 0,
            target: 1000,
            step: 1,
        };
        let outcome = run_search(&mut counter, &config(10, 0.0, 10));

        assert_eq!(outcome.state, SearchState::Exhausted);
        assert!(!outcome.solved);
        assert_eq!(outcome.iterations, 10);
        assert_eq!(counter.value, 10);
    }

    #[test]
    fn zero_budget() {
        let mut counter = Counter {
            value: 0,
            target: 1,
            step: 1,
        };
        let outcome = run_search(&mut counter, &config(0, 0.0, 10));

        assert_eq!(outcome.state, SearchState::Exhausted);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn stalls_below_threshold() {
        let mut counter = Counter {
            value: 0,
            target: 1000,
            step: 1,
        };
        // Every step improves the score by 0.001 which is below the threshold.
        let outcome = run_search(&mut counter, &config(100, 0.01, 3));

        assert_eq!(outcome.state, SearchState::Converged);
        assert!(!outcome.solved);
        assert_eq!(outcome.iterations, 3);
    }

    #[test]
    fn noise_outside_unit_interval() {
        assert_eq!(move_noise(1.5), 1.0);
        assert_eq!(move_noise(-2.0), 0.0);
        assert_eq!(move_noise(std::f64::NAN), 0.0);
        assert_eq!(move_noise(0.25), 0.25);

        let mut counter = Counter {
            value: 0,
            target: 4,
            step: 1,
        };
        let mut config = config(100, 0.0, 10);
        config.noise = std::f64::NAN;

        let outcome = run_search(&mut counter, &config);

        assert!(outcome.solved);
        assert_eq!(outcome.iterations, 4);
    }

    #[test]
    fn restores_best_candidate() {
        let mut counter = Counter {
            value: 10,
            target: 1000,
            step: 1,
        };
        let mut config = config(20, 0.0, 1000);
        config.noise = 1.0;

        let outcome = run_search(&mut counter, &config);

        assert_eq!(outcome.state, SearchState::Exhausted);
        assert_eq!(counter.value, 10);
        assert_eq!(outcome.best_score, 0.01);
    }
}
