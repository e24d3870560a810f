//! Literals and variables.
use std::{fmt, ops, sync::Arc};

use crate::assignment::Assignment;

/// A named boolean variable.
///
/// Variables are identified by their name. Cloning a variable only bumps a reference count, so
/// variables can be stored in clauses, formulas and assignments without copying the name.
///
/// Variables read from DIMACS CNF input are named `x1`, `x2`, ... after their 1-based index.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var {
    name: Arc<str>,
}

impl Var {
    /// Creates a variable with the given name.
    pub fn new(name: impl AsRef<str>) -> Var {
        Var {
            name: Arc::from(name.as_ref()),
        }
    }

    /// Creates the variable used for a 1-based DIMACS index.
    ///
    /// # Panics
    ///
    /// Panics if `number` is not positive, see [`Var::checked_from_dimacs`].
    pub fn from_dimacs(number: isize) -> Var {
        assert!(number > 0, "DIMACS variable index must be positive, got {}", number);
        Var::new(format!("x{}", number))
    }

    /// Like [`Var::from_dimacs`] but returns `None` for indices below 1.
    pub fn checked_from_dimacs(number: isize) -> Option<Var> {
        if number > 0 {
            Some(Var::new(format!("x{}", number)))
        } else {
            None
        }
    }

    /// The 1-based DIMACS index if this variable uses the `x<index>` naming scheme.
    pub fn to_dimacs(&self) -> Option<isize> {
        let digits = self.name.strip_prefix('x')?;
        match digits.parse::<isize>() {
            Ok(number) if number > 0 && !digits.starts_with('0') => Some(number),
            _ => None,
        }
    }

    /// The variable's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a literal from this var and a `bool` that is `true` when the literal is negated.
    pub fn lit(&self, negated: bool) -> Lit {
        Lit::new(self.clone(), negated)
    }

    /// Creates a positive literal from this var.
    pub fn positive(&self) -> Lit {
        self.lit(false)
    }

    /// Creates a negative literal from this var.
    pub fn negative(&self) -> Lit {
        self.lit(true)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Var {
    fn from(name: &str) -> Var {
        Var::new(name)
    }
}

/// A boolean literal.
///
/// A literal is a variable or the negation of a variable. Literals are immutable; negating one
/// creates a new literal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit {
    var: Var,
    negated: bool,
}

impl Lit {
    /// Creates a literal from a `Var` and a `bool` that is `true` when the literal is negated.
    pub fn new(var: Var, negated: bool) -> Lit {
        Lit { var, negated }
    }

    /// Creates a positive literal.
    pub fn positive(var: Var) -> Lit {
        Lit::new(var, false)
    }

    /// Creates a negative literal.
    pub fn negative(var: Var) -> Lit {
        Lit::new(var, true)
    }

    /// Creates a literal from a DIMACS integer.
    ///
    /// The absolute value selects the variable `x<abs>`, the sign of the integer is used as sign
    /// of the literal.
    ///
    /// # Panics
    ///
    /// Panics for `0` and `isize::MIN`, see [`Lit::checked_from_dimacs`].
    pub fn from_dimacs(number: isize) -> Lit {
        match Lit::checked_from_dimacs(number) {
            Some(lit) => lit,
            None => panic!("{} is not a DIMACS literal", number),
        }
    }

    /// Like [`Lit::from_dimacs`] but returns `None` for `0` and `isize::MIN`.
    pub fn checked_from_dimacs(number: isize) -> Option<Lit> {
        let var = Var::checked_from_dimacs(number.checked_abs()?)?;
        Some(Lit::new(var, number < 0))
    }

    /// DIMACS integer representation, if the variable follows the `x<index>` naming scheme.
    pub fn to_dimacs(&self) -> Option<isize> {
        let number = self.var.to_dimacs()?;
        Some(if self.negated { -number } else { number })
    }

    /// The literal's variable.
    pub fn var(&self) -> &Var {
        &self.var
    }

    /// Whether the literal is negative, i.e. a negated variable.
    pub fn is_negative(&self) -> bool {
        self.negated
    }

    /// Whether the literal is positive, i.e. a non-negated variable.
    pub fn is_positive(&self) -> bool {
        !self.negated
    }

    /// Value of the literal under an assignment, `None` when the variable is unassigned.
    pub fn value(&self, assignment: &Assignment) -> Option<bool> {
        assignment.value(&self.var).map(|value| value ^ self.negated)
    }

    /// Whether the literal is true under an assignment.
    ///
    /// Literals of unassigned variables are never true, independent of their sign.
    pub fn is_true(&self, assignment: &Assignment) -> bool {
        self.value(assignment) == Some(true)
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit {
            var: self.var,
            negated: !self.negated,
        }
    }
}

impl ops::Not for &Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        !self.clone()
    }
}

impl From<Var> for Lit {
    fn from(var: Var) -> Lit {
        Lit::positive(var)
    }
}

/// Negated literals are prefixed with `-`, matching the DIMACS sign convention.
impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.negated {
            write!(f, "-{}", self.var)
        } else {
            write!(f, "{}", self.var)
        }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;
    use proptest::{prelude::*, *};

    pub fn var(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Var> {
        index.prop_map(|index| Var::from_dimacs(index as isize + 1))
    }

    pub fn lit(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Lit> {
        (var(index), bool::ANY).prop_map(|(var, negated)| var.lit(negated))
    }
}
