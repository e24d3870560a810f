//! Clauses.
use std::fmt;
use std::iter::FromIterator;

use smallvec::SmallVec;

use crate::assignment::Assignment;
use crate::lit::Lit;

/// Number of literals stored without a heap allocation.
///
/// Chosen so that clauses of 3-SAT instances are stored inline.
const INLINE_LITS: usize = 3;

/// A disjunction of literals.
///
/// The literals of a clause are fixed at construction. A clause can carry an optional identifier
/// which is used as constraint id by the score encoder.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    id: Option<String>,
    lits: SmallVec<[Lit; INLINE_LITS]>,
}

impl Clause {
    /// Create a clause without identifier.
    pub fn new(lits: impl IntoIterator<Item = Lit>) -> Clause {
        Clause {
            id: None,
            lits: lits.into_iter().collect(),
        }
    }

    /// Create a clause with an identifier.
    pub fn with_id(id: impl Into<String>, lits: impl IntoIterator<Item = Lit>) -> Clause {
        Clause {
            id: Some(id.into()),
            lits: lits.into_iter().collect(),
        }
    }

    /// The clause identifier, if one was given.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The literals of the clause in construction order.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// Number of literals.
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Whether the clause has no literals.
    ///
    /// An empty clause can never be satisfied.
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// Whether at least one literal is true under the assignment.
    ///
    /// Literals of unassigned variables count as false.
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.lits.iter().any(|lit| lit.is_true(assignment))
    }

    /// Number of literals that are true under the assignment.
    pub fn satisfied_count(&self, assignment: &Assignment) -> usize {
        self.lits.iter().filter(|lit| lit.is_true(assignment)).count()
    }

    /// Number of positive literals.
    pub fn positive_count(&self) -> usize {
        self.lits.iter().filter(|lit| lit.is_positive()).count()
    }
}

impl FromIterator<Lit> for Clause {
    fn from_iter<I: IntoIterator<Item = Lit>>(lits: I) -> Clause {
        Clause::new(lits)
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Lit;
    type IntoIter = std::slice::Iter<'a, Lit>;

    fn into_iter(self) -> Self::IntoIter {
        self.lits.iter()
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(id) = &self.id {
            write!(f, "{}:", id)?;
        }
        f.debug_list().entries(self.lits.iter()).finish()
    }
}
