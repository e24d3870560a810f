//! CNF formulas.
use std::fmt;
use std::iter::{Extend, FromIterator};

use rustc_hash::FxHashMap;

use crate::assignment::Assignment;
use crate::clause::Clause;
use crate::lit::{Lit, Var};

/// Variable and clause count of a formula.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Dimensions {
    pub var_count: usize,
    pub clause_count: usize,
}

/// A formula in conjunctive normal form (CNF).
///
/// The set of variables is derived from the clauses. It is kept in the order in which the
/// variables first occur and can only grow by adding clauses.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Formula {
    clauses: Vec<Clause>,
    variables: Vec<Var>,
    var_index: FxHashMap<Var, usize>,
}

impl Formula {
    /// Create an empty formula.
    pub fn new() -> Formula {
        Formula::default()
    }

    /// Appends a clause to the formula.
    pub fn add_clause(&mut self, clause: Clause) {
        for lit in clause.lits() {
            if !self.var_index.contains_key(lit.var()) {
                self.var_index.insert(lit.var().clone(), self.variables.len());
                self.variables.push(lit.var().clone());
            }
        }
        self.clauses.push(clause);
    }

    /// Appends a clause given by its literals.
    pub fn add_lits(&mut self, lits: impl IntoIterator<Item = Lit>) {
        self.add_clause(Clause::new(lits))
    }

    /// Number of clauses in the formula.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the formula has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of distinct variables.
    pub fn var_count(&self) -> usize {
        self.variables.len()
    }

    /// Variable and clause count.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            var_count: self.var_count(),
            clause_count: self.len(),
        }
    }

    /// The distinct variables of the formula in the order they first occur.
    pub fn variables(&self) -> &[Var] {
        &self.variables
    }

    /// Position of a variable in [`variables`](Formula::variables).
    pub fn var_index(&self, var: &Var) -> Option<usize> {
        self.var_index.get(var).copied()
    }

    /// The clauses of the formula.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Iterator over all clauses.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// The constraint id of a clause.
    ///
    /// This is the clause's identifier or `c<index>` for clauses without one.
    pub fn constraint_id(&self, index: usize) -> String {
        match self.clauses[index].id() {
            Some(id) => id.to_owned(),
            None => format!("c{}", index),
        }
    }

    /// Whether every clause is satisfied by the assignment.
    ///
    /// Literals of unassigned variables count as false. Use
    /// [`missing_variables`](Formula::missing_variables) to check that an assignment is total.
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.is_satisfied(assignment))
    }

    /// Number of clauses not satisfied by the assignment.
    pub fn unsatisfied_count(&self, assignment: &Assignment) -> usize {
        self.clauses
            .iter()
            .filter(|clause| !clause.is_satisfied(assignment))
            .count()
    }

    /// Variables of the formula that have no value in the assignment.
    pub fn missing_variables<'a>(
        &'a self,
        assignment: &'a Assignment,
    ) -> impl Iterator<Item = &'a Var> + 'a {
        self.variables
            .iter()
            .filter(move |var| !assignment.contains(var))
    }
}

impl Extend<Clause> for Formula {
    fn extend<I: IntoIterator<Item = Clause>>(&mut self, clauses: I) {
        for clause in clauses {
            self.add_clause(clause);
        }
    }
}

impl FromIterator<Clause> for Formula {
    fn from_iter<I: IntoIterator<Item = Clause>>(clauses: I) -> Formula {
        let mut formula = Formula::new();
        formula.extend(clauses);
        formula
    }
}

/// Convert any iterable of [`Lit`] iterables into a Formula
impl<F, I> From<F> for Formula
where
    F: IntoIterator<Item = I>,
    I: IntoIterator<Item = Lit>,
{
    fn from(clauses: F) -> Formula {
        clauses.into_iter().map(Clause::new).collect()
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.dimensions(), f)?;
        f.debug_list().entries(self.clauses.iter()).finish()
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    pub fn vec_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Vec<Vec<Lit>>> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        // Not using ind_flat_map makes shrinking too expensive
        vars.prop_ind_flat_map(move |vars| {
            collection::vec(
                collection::vec(lit(0..vars), clause_len.clone()),
                clauses.clone(),
            )
        })
    }

    pub fn formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Formula> {
        vec_formula(vars, clauses, clause_len).prop_map(Formula::from)
    }
}
