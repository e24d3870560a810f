use resonance::dimacs::DimacsParser;
use resonance::{Context, SatSolver, SolverConfig};

fn config() -> SolverConfig {
    let mut config = SolverConfig::new(100_000, 0.0);
    config.stall_patience = 100_000;
    config
}

macro_rules! test_cnf {
    ($name:ident, $result:expr) => {
        #[test]
        fn $name() {
            let _ = env_logger::builder().is_test(true).try_init();
            let cnf = include_bytes!(concat!("cnfs/", stringify!($name), ".cnf"));
            let formula = DimacsParser::parse(&cnf[..]).expect("parsing failed");

            let mut ctx = Context::new(config());
            let result = SatSolver::new(&mut ctx).solve(&formula);

            assert_eq!(result.satisfiable, $result);
            assert_eq!(result.satisfiable, formula.is_satisfied(&result.assignment));
            assert_eq!(result.assignment.len(), formula.var_count());
            if !result.satisfiable {
                assert!(result.resonance < 1.0);
                assert_eq!(result.iterations, 100_000);
            }
            assert!(ctx.dispose().is_empty());
        }
    };
}

test_cnf!(implication_chain_10, true);
test_cnf!(planted_3sat_20_60, true);
test_cnf!(pigeon_hole_2_1, false);
test_cnf!(xor_cycle_unsat_3, false);
