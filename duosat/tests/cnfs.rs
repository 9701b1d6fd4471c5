use std::collections::HashSet;

use duosat::solver::Solver;
use duosat_dimacs::DimacsParser;
use duosat_formula::lit::Lit;

macro_rules! test_cnf {
    ($name:ident, $cnf:expr, $result:expr) => {
        #[test]
        fn $name() {
            let mut solver = Solver::new();
            let formula = DimacsParser::parse($cnf as &[u8]).expect("parsing failed");
            solver.add_formula(&formula);
            let result = $result;
            assert_eq!(solver.solve().expect("solve failed"), result);
            if result {
                let model: HashSet<Lit> = solver.model().unwrap().into_iter().collect();
                for clause in formula.iter() {
                    assert!(clause.iter().any(|&lit| model.contains(&lit)));
                }
            }
        }
    };
}

// Pigeonhole: 3 pigeons into 2 holes, unsatisfiable.
test_cnf!(
    pigeonhole_3_2_unsat,
    b"p cnf 6 9
1 2 0
3 4 0
5 6 0
-1 -3 0
-1 -5 0
-3 -5 0
-2 -4 0
-2 -6 0
-4 -6 0
",
    false
);

test_cnf!(
    small_sat,
    b"p cnf 3 3
1 2 0
-1 3 0
-2 -3 0
",
    true
);
