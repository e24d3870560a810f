//! Boolean satisfiability by weighted local search.
use std::io;
use std::time::Duration;

use anyhow::Error;
use log::info;
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use resonance_dimacs::DimacsParser;
use resonance_formula::{Assignment, Formula};

use crate::context::{Context, Severity};
use crate::encode::{encode_formula, encode_satisfaction, resonance};
use crate::search::{run_search, LocalSearch, SearchState};

/// Result of a [`SatSolver::solve`] call.
///
/// Only `satisfiable` signals success. A result with `satisfiable == false` does not mean that
/// the formula is unsatisfiable.
#[derive(Clone, Debug)]
pub struct SolveResult {
    /// Whether `assignment` satisfies the formula.
    pub satisfiable: bool,
    /// The best assignment found. Total over the formula's variables.
    pub assignment: Assignment,
    pub iterations: u64,
    /// Whether the search converged, on a model or on a plateau.
    pub converged: bool,
    pub state: SearchState,
    /// Fraction of satisfied clauses under `assignment`.
    pub resonance: f64,
    /// Entropy of the clause amplitudes under `assignment`.
    pub entropy: f64,
    pub elapsed: Duration,
}

/// Clauses whose index is stored in a vector with O(1) insertion and removal.
#[derive(Default)]
struct ClauseSet {
    list: Vec<usize>,
    position: Vec<Option<usize>>,
}

impl ClauseSet {
    fn with_clause_count(count: usize) -> ClauseSet {
        ClauseSet {
            list: vec![],
            position: vec![None; count],
        }
    }

    fn insert(&mut self, clause: usize) {
        if self.position[clause].is_none() {
            self.position[clause] = Some(self.list.len());
            self.list.push(clause);
        }
    }

    fn remove(&mut self, clause: usize) {
        if let Some(pos) = self.position[clause].take() {
            self.list.swap_remove(pos);
            if let Some(&moved) = self.list.get(pos) {
                self.position[moved] = Some(pos);
            }
        }
    }

    fn clear(&mut self) {
        for &clause in self.list.iter() {
            self.position[clause] = None;
        }
        self.list.clear();
    }
}

/// Local search state for a formula.
///
/// Variables are identified by their index in [`Formula::variables`].
struct SatSearch {
    values: Vec<bool>,
    /// Literals of each clause as `(variable, negated)`.
    clauses: Vec<Vec<(usize, bool)>>,
    /// Every literal occurrence of a variable as `(clause, negated)`.
    occurrences: Vec<Vec<(usize, bool)>>,
    /// Number of true literals of each clause.
    true_count: Vec<usize>,
    unsatisfied: ClauseSet,
}

impl SatSearch {
    fn new(formula: &Formula, values: Vec<bool>) -> SatSearch {
        let mut clauses = Vec::with_capacity(formula.len());
        let mut occurrences = vec![vec![]; formula.var_count()];

        for (clause_index, clause) in formula.iter().enumerate() {
            let mut lits = Vec::with_capacity(clause.len());
            for lit in clause.lits() {
                if let Some(var) = formula.var_index(lit.var()) {
                    lits.push((var, lit.is_negative()));
                    occurrences[var].push((clause_index, lit.is_negative()));
                }
            }
            clauses.push(lits);
        }

        let mut search = SatSearch {
            values,
            true_count: vec![0; clauses.len()],
            unsatisfied: ClauseSet::with_clause_count(clauses.len()),
            clauses,
            occurrences,
        };
        search.recount();
        search
    }

    fn recount(&mut self) {
        self.unsatisfied.clear();
        for (index, lits) in self.clauses.iter().enumerate() {
            let values = &self.values;
            let count = lits
                .iter()
                .filter(|&&(var, negated)| values[var] != negated)
                .count();
            self.true_count[index] = count;
            if count == 0 {
                self.unsatisfied.insert(index);
            }
        }
    }

    fn flip(&mut self, var: usize) {
        let value = !self.values[var];
        self.values[var] = value;
        for &(clause, negated) in self.occurrences[var].iter() {
            if value != negated {
                self.true_count[clause] += 1;
                if self.true_count[clause] == 1 {
                    self.unsatisfied.remove(clause);
                }
            } else {
                self.true_count[clause] -= 1;
                if self.true_count[clause] == 0 {
                    self.unsatisfied.insert(clause);
                }
            }
        }
    }

    /// Number of satisfied clauses that become unsatisfied when flipping `var`.
    fn break_count(&self, var: usize) -> usize {
        self.occurrences[var]
            .iter()
            .filter(|&&(clause, negated)| {
                self.values[var] != negated && self.true_count[clause] == 1
            })
            .count()
    }

    fn amplitude(&self, clause: usize) -> f64 {
        (1 + self.true_count[clause]) as f64 / (1 + self.clauses[clause].len()) as f64
    }

    fn assignment(&self, formula: &Formula) -> Assignment {
        let mut assignment = Assignment::new();
        for (var, &value) in formula.variables().iter().zip(self.values.iter()) {
            assignment.assign(var.clone(), value);
        }
        assignment
    }
}

impl LocalSearch for SatSearch {
    type Snapshot = Vec<bool>;

    fn score(&self) -> f64 {
        if self.clauses.is_empty() {
            1.0
        } else {
            1.0 - self.unsatisfied.list.len() as f64 / self.clauses.len() as f64
        }
    }

    fn is_solution(&self) -> bool {
        self.unsatisfied.list.is_empty()
    }

    /// Flips one variable of a lowest amplitude unsatisfied clause.
    fn perturb(&mut self, rng: &mut StdRng, noise: f64) {
        let lowest = self
            .unsatisfied
            .list
            .iter()
            .filter(|&&clause| !self.clauses[clause].is_empty())
            .map(|&clause| OrderedFloat(self.amplitude(clause)))
            .min();

        let lowest = match lowest {
            Some(lowest) => lowest,
            None => return,
        };

        let candidates: Vec<usize> = self
            .unsatisfied
            .list
            .iter()
            .copied()
            .filter(|&clause| {
                !self.clauses[clause].is_empty() && OrderedFloat(self.amplitude(clause)) == lowest
            })
            .collect();

        let clause = match candidates.choose(rng) {
            Some(&clause) => clause,
            None => return,
        };

        let lits = &self.clauses[clause];
        let var = if rng.gen_bool(noise) {
            lits[rng.gen_range(0, lits.len())].0
        } else {
            let min_break = lits
                .iter()
                .map(|&(var, _)| self.break_count(var))
                .min()
                .unwrap_or(0);
            let greedy: Vec<usize> = lits
                .iter()
                .map(|&(var, _)| var)
                .filter(|&var| self.break_count(var) == min_break)
                .collect();
            match greedy.choose(rng) {
                Some(&var) => var,
                None => return,
            }
        };

        self.flip(var);
    }

    fn snapshot(&self) -> Vec<bool> {
        self.values.clone()
    }

    fn restore(&mut self, snapshot: Vec<bool>) {
        self.values = snapshot;
        self.recount();
    }
}

/// Local search SAT solver.
///
/// The search starts from the assignment that sets every variable to the polarity it occurs with
/// most often. Each iteration picks one of the unsatisfied clauses with the lowest amplitude and
/// flips the variable of that clause that breaks the fewest satisfied clauses, or with
/// probability `noise` a random variable of it.
pub struct SatSolver<'a> {
    ctx: &'a mut Context,
}

impl<'a> SatSolver<'a> {
    /// Create a solver using the configuration of the given context.
    pub fn new(ctx: &'a mut Context) -> SatSolver<'a> {
        SatSolver { ctx }
    }

    /// Search for an assignment satisfying the formula.
    pub fn solve(&mut self, formula: &Formula) -> SolveResult {
        let solve = self.ctx.begin_solve();
        let dimensions = formula.dimensions();
        info!(
            "solve {}: formula with {} variables and {} clauses",
            solve, dimensions.var_count, dimensions.clause_count
        );

        if formula.is_empty() {
            self.ctx
                .report(Severity::Warning, "formula has no clauses");
            return SolveResult {
                satisfiable: true,
                assignment: Assignment::new(),
                iterations: 0,
                converged: true,
                state: SearchState::Converged,
                resonance: 1.0,
                entropy: 0.0,
                elapsed: Duration::default(),
            };
        }

        if formula.iter().any(|clause| clause.is_empty()) {
            self.ctx.report(
                Severity::Warning,
                "formula contains an empty clause and cannot be satisfied",
            );
        }

        let structure = encode_formula(formula);
        let initial = structure.center.iter().map(|&bias| bias >= 0.0).collect();

        let mut search = SatSearch::new(formula, initial);
        let outcome = run_search(&mut search, self.ctx.config());

        let assignment = search.assignment(formula);
        let satisfiable = formula.is_satisfied(&assignment);
        let encoded = encode_satisfaction(formula, &assignment);

        let result = SolveResult {
            satisfiable,
            iterations: outcome.iterations,
            converged: outcome.converged(),
            state: outcome.state,
            resonance: resonance(formula, &assignment),
            entropy: encoded.entropy,
            elapsed: outcome.elapsed,
            assignment,
        };

        info!(
            "solve {}: {} after {} iterations (resonance {:.4}, {:?})",
            solve,
            if result.satisfiable {
                "satisfiable"
            } else {
                "unknown"
            },
            result.iterations,
            result.resonance,
            result.elapsed
        );

        result
    }

    /// Parse a DIMACS CNF formula and search for an assignment satisfying it.
    ///
    /// Returns the parsed formula along with the result.
    pub fn solve_dimacs(&mut self, input: impl io::Read) -> Result<(Formula, SolveResult), Error> {
        let formula = DimacsParser::parse(input)?;
        let result = self.solve(&formula);
        Ok((formula, result))
    }
}
