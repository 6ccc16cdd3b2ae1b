//! Boolean satisfiability solver.
use partial_ref::{IntoPartialRefMut, PartialRef};

use s1t_formula::{Problem, Solution};

use crate::context::{load_problem, AssignmentP, ClauseStoreP, Context};
use crate::prop::{init_watches, propagate_units};
use crate::search::search;

/// Decide a problem.
///
/// This is total: every well-formed problem terminates with either
/// [`Solution::Sat`] carrying a total satisfying assignment or
/// [`Solution::Unsat`]. The search is deterministic, so identical problems
/// yield identical solutions.
pub fn solve(problem: &Problem) -> Solution {
    let mut ctx = Context::default();
    let mut ctx = ctx.into_partial_ref_mut();

    load_problem(ctx.borrow(), problem);

    if ctx.part(ClauseStoreP).iter().any(|clause| clause.is_empty()) {
        return Solution::Unsat;
    }

    init_watches(ctx.borrow());

    if propagate_units(ctx.borrow()).is_err() {
        return Solution::Unsat;
    }

    if !search(ctx.borrow(), 0, 0) {
        return Solution::Unsat;
    }

    let assignment = ctx
        .part(AssignmentP)
        .assignment()
        .iter()
        .map(|&value| value == Some(true))
        .collect();

    Solution::Sat(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use s1t_formula::test::{sat_formula, sgen_unsat_formula};
    use s1t_formula::{cnf_formula, CnfFormula};

    fn solve_formula(formula: CnfFormula) -> Solution {
        solve(&Problem::from_formula(formula))
    }

    #[test]
    fn empty_problem_is_sat() {
        assert_eq!(solve_formula(CnfFormula::new()), Solution::Sat(vec![]));
    }

    #[test]
    fn empty_clause_is_unsat_without_search() {
        assert_eq!(
            solve_formula(cnf_formula![
                1;
                ;
            ]),
            Solution::Unsat
        );
    }

    #[test]
    fn unit_clauses() {
        assert_eq!(solve_formula(cnf_formula![1;]), Solution::Sat(vec![true]));
        assert_eq!(solve_formula(cnf_formula![-1;]), Solution::Sat(vec![false]));

        assert_eq!(
            solve_formula(cnf_formula![
                1;
                -2;
                3;
            ]),
            Solution::Sat(vec![true, false, true])
        );

        assert_eq!(
            solve_formula(cnf_formula![
                1;
                -2;
                -1;
            ]),
            Solution::Unsat
        );
    }

    #[test]
    fn solved_by_propagation_alone() {
        assert_eq!(
            solve_formula(cnf_formula![
                1, -2;
                -2;
                -2, 3;
            ]),
            Solution::Sat(vec![true, false, true])
        );
    }

    #[test]
    fn backtracking_tie_breaks() {
        // Positive polarity is tried first, so each of these two-variable
        // problems pins a distinct expected assignment.
        assert_eq!(
            solve_formula(cnf_formula![
                -1, 2;
                -2, 1;
                1, 2;
            ]),
            Solution::Sat(vec![true, true])
        );

        assert_eq!(
            solve_formula(cnf_formula![
                -1, 2;
                -2, 1;
                -2, -1;
            ]),
            Solution::Sat(vec![false, false])
        );

        assert_eq!(
            solve_formula(cnf_formula![
                1, 2;
                -1, -2;
                -1, 2;
            ]),
            Solution::Sat(vec![false, true])
        );

        assert_eq!(
            solve_formula(cnf_formula![
                1, 2;
                -1, -2;
                1, -2;
            ]),
            Solution::Sat(vec![true, false])
        );
    }

    #[test]
    fn two_towers() {
        let formula = cnf_formula![
            -1, -2;
            -1, -3;
            -2, -1;
            -2, -4;
            -3, -1;
            -3, -4;
            -4, -2;
            -4, -3;
            1, 2;
            3, 4;
        ];

        assert_eq!(
            solve_formula(formula),
            Solution::Sat(vec![true, false, false, true])
        );
    }

    #[test]
    fn unsat_found_by_initial_propagation() {
        assert_eq!(
            solve_formula(cnf_formula![
                1, 2, 3;
                -1;
                1, -2;
                2, -3;
            ]),
            Solution::Unsat
        );
    }

    #[test]
    fn tautological_clauses_are_harmless() {
        assert_eq!(
            solve_formula(cnf_formula![
                1, -1;
                -2;
            ]),
            Solution::Sat(vec![true, false])
        );
    }

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..5usize)) {
            let problem = Problem::from_formula(formula);

            prop_assert_eq!(solve(&problem), Solution::Unsat);
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let problem = Problem::from_formula(formula);

            let solution = solve(&problem);

            prop_assert!(solution.is_sat());
            prop_assert!(solution.satisfies(&problem));
        }

        #[test]
        fn deterministic(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let problem = Problem::from_formula(formula);

            prop_assert_eq!(solve(&problem), solve(&problem));
        }
    }
}
