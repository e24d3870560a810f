//! Formula and graph data types used by the resonance local-search solvers.

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lit {
    ($x:expr) => {
        $crate::lit::Lit::from_dimacs($x)
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! var {
    ($x:expr) => {
        $crate::lit::Var::from_dimacs($x)
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! clause {
    ( $( $x:expr ),* ) => { $crate::clause::Clause::new(vec![ $( $crate::lit!( $x ) ),* ]) };
    ( $( $x:expr ),* , ) => { $crate::clause![ $( $x ),* ] };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! formula {
    ( $( $( $x:expr ),* );* ; ) => {
        vec![ $( $crate::clause![ $( $x ),* ] ),* ]
            .into_iter()
            .collect::<$crate::cnf::Formula>()
    };
}

pub mod assignment;
pub mod clause;
pub mod cnf;
pub mod graph;
pub mod lit;


pub use assignment::Assignment;
pub use clause::Clause;
pub use cnf::{Dimensions, Formula};
pub use graph::Graph;
pub use lit::{Lit, Var};
