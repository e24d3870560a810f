//! Variable assignments.
use std::fmt;

use rustc_hash::FxHashMap;

use crate::lit::{Lit, Var};

/// A mapping from variables to boolean values.
///
/// Assignments are built incrementally using [`assign`](Assignment::assign). Iteration yields the
/// variables in the order they were first assigned.
#[derive(Clone, Default)]
pub struct Assignment {
    values: Vec<(Var, bool)>,
    index: FxHashMap<Var, usize>,
}

impl Assignment {
    /// Create an empty assignment.
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// Assignment making all given literals true.
    ///
    /// If a variable occurs in both polarities, the last occurrence wins.
    pub fn from_lits<'a>(lits: impl IntoIterator<Item = &'a Lit>) -> Assignment {
        let mut assignment = Assignment::new();
        for lit in lits {
            assignment.assign(lit.var().clone(), lit.is_positive());
        }
        assignment
    }

    /// Sets the value of a variable, replacing any previous value.
    pub fn assign(&mut self, var: Var, value: bool) {
        match self.index.get(&var) {
            Some(&index) => self.values[index].1 = value,
            None => {
                self.index.insert(var.clone(), self.values.len());
                self.values.push((var, value));
            }
        }
    }

    /// Inverts the value of an assigned variable.
    ///
    /// Returns the new value or `None` if the variable is unassigned.
    pub fn flip(&mut self, var: &Var) -> Option<bool> {
        let &index = self.index.get(var)?;
        let value = &mut self.values[index].1;
        *value = !*value;
        Some(*value)
    }

    /// The value of a variable.
    pub fn value(&self, var: &Var) -> Option<bool> {
        self.index.get(var).map(|&index| self.values[index].1)
    }

    /// Whether the variable has a value.
    pub fn contains(&self, var: &Var) -> bool {
        self.index.contains_key(var)
    }

    /// Number of assigned variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no variable is assigned.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterator over all assigned variables and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&Var, bool)> {
        self.values.iter().map(|(var, value)| (var, *value))
    }

    /// The true literal of every assigned variable.
    pub fn lits(&self) -> impl Iterator<Item = Lit> + '_ {
        self.values.iter().map(|(var, value)| var.lit(!value))
    }
}

/// Two assignments are equal when they assign the same values, independent of order.
impl PartialEq for Assignment {
    fn eq(&self, other: &Assignment) -> bool {
        self.len() == other.len() && self.iter().all(|(var, value)| other.value(var) == Some(value))
    }
}

impl Eq for Assignment {}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
