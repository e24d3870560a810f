//! Numeric score states of formulas and assignments.
//!
//! A score state consists of one amplitude per constraint, a center vector with one entry per
//! variable and an entropy computed from the amplitude distribution. The entropy is the Shannon
//! entropy (natural logarithm) of the normalized squared amplitudes and measures how evenly the
//! weight is spread over the constraints.
//!
//! All encodings are deterministic and total: empty input yields an empty state with zero
//! entropy.
use resonance_formula::{Assignment, Formula, Var};

/// Encoded score of a formula or assignment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreState {
    /// Amplitude of each constraint, keyed by constraint id, in constraint order.
    pub amplitudes: Vec<(String, f64)>,
    /// One value per variable.
    pub center: Vec<f64>,
    /// Entropy of the normalized squared amplitudes. Never negative.
    pub entropy: f64,
}

impl ScoreState {
    fn new(amplitudes: Vec<(String, f64)>, center: Vec<f64>) -> ScoreState {
        let entropy = entropy(amplitudes.iter().map(|&(_, amplitude)| amplitude));
        ScoreState {
            amplitudes,
            center,
            entropy,
        }
    }

    /// Amplitude of the constraint with the given id.
    pub fn amplitude(&self, id: &str) -> Option<f64> {
        self.amplitudes
            .iter()
            .find(|(constraint, _)| constraint == id)
            .map(|&(_, amplitude)| amplitude)
    }

    /// Amplitudes in constraint order.
    pub fn amplitude_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.amplitudes.iter().map(|&(_, amplitude)| amplitude)
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Whether the state has no constraints.
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }
}

/// Shannon entropy of the squared amplitudes after normalizing them to a distribution.
///
/// Returns zero when there are no amplitudes or all are zero.
pub fn entropy(amplitudes: impl IntoIterator<Item = f64>) -> f64 {
    let squares: Vec<f64> = amplitudes.into_iter().map(|a| a * a).collect();
    let total: f64 = squares.iter().sum();
    if !(total > 0.0) {
        return 0.0;
    }
    let entropy: f64 = squares
        .iter()
        .filter(|&&square| square > 0.0)
        .map(|&square| {
            let p = square / total;
            -p * p.ln()
        })
        .sum();
    // Rounding can produce -0.0 or tiny negative values for a single constraint.
    entropy.max(0.0)
}

/// Binary entropy of a fraction, `0 ln 0` counts as zero.
fn binary_entropy(p: f64) -> f64 {
    let term = |x: f64| if x > 0.0 { -x * x.ln() } else { 0.0 };
    (term(p) + term(1.0 - p)).max(0.0)
}

/// Amplitude of a clause with `count` marked literals out of `len`.
///
/// Always in `(0, 1]`.
fn clause_amplitude(count: usize, len: usize) -> f64 {
    (1 + count) as f64 / (1 + len) as f64
}

fn constraint_amplitudes(
    formula: &Formula,
    count: impl Fn(usize) -> usize,
) -> Vec<(String, f64)> {
    formula
        .iter()
        .enumerate()
        .map(|(index, clause)| {
            (
                formula.constraint_id(index),
                clause_amplitude(count(index), clause.len()),
            )
        })
        .collect()
}

fn assignment_center(variables: &[Var], assignment: &Assignment) -> Vec<f64> {
    variables
        .iter()
        .map(|var| match assignment.value(var) {
            Some(true) => 1.0,
            Some(false) => 0.0,
            None => 0.5,
        })
        .collect()
}

/// Encode the structure of a formula.
///
/// Each clause gets the amplitude `(1 + positive literals) / (1 + literals)`. The center holds the
/// polarity bias of every variable: `(positive - negative) / occurrences`, in
/// [`Formula::variables`] order.
pub fn encode_formula(formula: &Formula) -> ScoreState {
    let amplitudes =
        constraint_amplitudes(formula, |index| formula.clauses()[index].positive_count());

    let mut bias = vec![(0i64, 0i64); formula.var_count()];
    for clause in formula.iter() {
        for lit in clause.lits() {
            if let Some(index) = formula.var_index(lit.var()) {
                let (sum, occurrences) = &mut bias[index];
                *sum += if lit.is_positive() { 1 } else { -1 };
                *occurrences += 1;
            }
        }
    }
    let center = bias
        .into_iter()
        .map(|(sum, occurrences)| {
            if occurrences == 0 {
                0.0
            } else {
                sum as f64 / occurrences as f64
            }
        })
        .collect();

    ScoreState::new(amplitudes, center)
}

/// Encode an assignment of the given variables.
///
/// Each variable is a constraint with amplitude `1.0` when true, `0.5` when false and `0.0` when
/// unassigned. The center is `1.0`, `0.0` or `0.5` (unassigned). Unlike the other encodings the
/// entropy is the binary entropy of the fraction of assigned variables that are true.
pub fn encode_assignment(variables: &[Var], assignment: &Assignment) -> ScoreState {
    let amplitudes = variables
        .iter()
        .map(|var| {
            let amplitude = match assignment.value(var) {
                Some(true) => 1.0,
                Some(false) => 0.5,
                None => 0.0,
            };
            (var.name().to_owned(), amplitude)
        })
        .collect();
    let center = assignment_center(variables, assignment);

    let assigned = variables
        .iter()
        .filter(|var| assignment.contains(var))
        .count();
    let true_count = variables
        .iter()
        .filter(|var| assignment.value(var) == Some(true))
        .count();
    let entropy = if assigned == 0 {
        0.0
    } else {
        binary_entropy(true_count as f64 / assigned as f64)
    };

    ScoreState {
        amplitudes,
        center,
        entropy,
    }
}

/// Encode how well an assignment satisfies a formula.
///
/// Each clause gets the amplitude `(1 + satisfied literals) / (1 + literals)`, so unsatisfied
/// clauses have the lowest amplitudes. The center is the assignment's center as in
/// [`encode_assignment`].
pub fn encode_satisfaction(formula: &Formula, assignment: &Assignment) -> ScoreState {
    let amplitudes = constraint_amplitudes(formula, |index| {
        formula.clauses()[index].satisfied_count(assignment)
    });
    ScoreState::new(amplitudes, assignment_center(formula.variables(), assignment))
}

/// Fraction of satisfied clauses, `1.0` for a formula without clauses.
pub fn resonance(formula: &Formula, assignment: &Assignment) -> f64 {
    if formula.is_empty() {
        1.0
    } else {
        let satisfied = formula.len() - formula.unsatisfied_count(assignment);
        satisfied as f64 / formula.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use resonance_formula::{cnf::strategy::*, formula, lit, var};

    #[test]
    fn entropy_values() {
        assert_eq!(entropy(vec![]), 0.0);
        assert_eq!(entropy(vec![0.0, 0.0]), 0.0);
        assert_eq!(entropy(vec![0.7]), 0.0);
        assert!((entropy(vec![1.0, 1.0]) - 2f64.ln()).abs() < 1e-12);
        assert!((entropy(vec![0.5, 0.5, 0.5, 0.5]) - 4f64.ln()).abs() < 1e-12);
        // [1, 0] squared and normalized is [1, 0]
        assert_eq!(entropy(vec![1.0, 0.0]), 0.0);
    }

    #[test]
    fn formula_encoding() {
        let formula = formula![
            1, 2, -3;
            -1;
        ];
        let state = encode_formula(&formula);

        assert_eq!(state.len(), 2);
        assert_eq!(state.amplitude("c0"), Some(3.0 / 4.0));
        assert_eq!(state.amplitude("c1"), Some(1.0 / 2.0));
        assert_eq!(state.center, vec![0.0, 1.0, -1.0]);
        assert!(state.entropy > 0.0);
    }

    #[test]
    fn empty_input_is_degenerate() {
        let state = encode_formula(&Formula::new());
        assert!(state.is_empty());
        assert!(state.center.is_empty());
        assert_eq!(state.entropy, 0.0);

        let state = encode_assignment(&[], &Assignment::new());
        assert!(state.is_empty());
        assert_eq!(state.entropy, 0.0);

        assert_eq!(resonance(&Formula::new(), &Assignment::new()), 1.0);
    }

    #[test]
    fn assignment_encoding() {
        let variables = [var!(1), var!(2), var!(3), var!(4)];
        let assignment = Assignment::from_lits(&[lit!(1), lit!(-2), lit!(3)]);
        let state = encode_assignment(&variables, &assignment);

        assert_eq!(state.center, vec![1.0, 0.0, 1.0, 0.5]);
        assert_eq!(state.amplitude("x2"), Some(0.5));
        assert_eq!(state.amplitude("x4"), Some(0.0));
        assert!((state.entropy - binary_entropy(2.0 / 3.0)).abs() < 1e-12);

        let uniform = Assignment::from_lits(&[lit!(1), lit!(2)]);
        assert_eq!(encode_assignment(&variables[..2], &uniform).entropy, 0.0);

        let balanced = Assignment::from_lits(&[lit!(1), lit!(-2)]);
        let balanced_entropy = encode_assignment(&variables[..2], &balanced).entropy;
        assert!((balanced_entropy - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn satisfaction_encoding() {
        let formula = formula![
            1, 2;
            -1, -2;
            2;
        ];
        let assignment = Assignment::from_lits(&[lit!(1), lit!(-2)]);
        let state = encode_satisfaction(&formula, &assignment);

        assert_eq!(state.amplitude("c0"), Some(2.0 / 3.0));
        assert_eq!(state.amplitude("c1"), Some(2.0 / 3.0));
        assert_eq!(state.amplitude("c2"), Some(1.0 / 2.0));
        assert_eq!(state.center, vec![1.0, 0.0]);
        assert!((resonance(&formula, &assignment) - 2.0 / 3.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn deterministic_encoding(input in formula(1..20usize, 0..50, 0..5)) {
            let first = encode_formula(&input);
            let second = encode_formula(&input.clone());

            prop_assert_eq!(first.len(), input.len());
            prop_assert_eq!(first.center.len(), input.var_count());
            prop_assert!(first.entropy >= 0.0);
            prop_assert!(first.amplitude_values().all(|amplitude| amplitude > 0.0));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn entropy_is_bounded(amplitudes in proptest::collection::vec(0.0..10.0f64, 0..50)) {
            let value = entropy(amplitudes.clone());
            prop_assert!(value >= 0.0);
            prop_assert!(value <= (amplitudes.len().max(1) as f64).ln() + 1e-9);
        }
    }
}
