//! Boolean satisfiability solver.
use std::io;

use anyhow::{anyhow, Error};
use log::info;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use duosat_dimacs::DimacsParser;
use duosat_formula::lit::Lit;
use duosat_formula::CnfFormula;

use crate::config::SolverConfigUpdate;
use crate::context::{config_changed, ensure_var_count, Context};
use crate::context::{AssignmentP, ProofP, SolverConfigP, SolverStateP, VariablesP};
use crate::load::load_clause;
use crate::model::extract_model;
use crate::schedule::schedule_step;
use crate::state::SatState;

pub use crate::proof::ProofFormat;

/// A boolean satisfiability solver.
pub struct Solver<'a> {
    ctx: Box<Context<'a>>,
}

impl<'a> Default for Solver<'a> {
    fn default() -> Solver<'a> {
        Solver {
            ctx: Box::new(Context::default()),
        }
    }
}

impl<'a> Solver<'a> {
    /// Create a new solver.
    pub fn new() -> Solver<'a> {
        Solver::default()
    }

    /// Apply a configuration update.
    pub fn config(&mut self, update: &SolverConfigUpdate) -> Result<(), Error> {
        let mut ctx = self.ctx.into_partial_ref_mut();

        let mut config = ctx.part(SolverConfigP).clone();
        config.apply(update);
        *ctx.part_mut(SolverConfigP) = config;

        config_changed(ctx.borrow(), update);

        Ok(())
    }

    /// Start writing a proof of unsatisfiability to the given target.
    pub fn write_proof(&mut self, target: impl io::Write + 'a, format: ProofFormat) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(ProofP).write_proof(target, format);
    }

    /// Stop writing a proof.
    pub fn close_proof(&mut self) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(ProofP).close_proof();
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ctx.part_mut(VariablesP).ensure_var(formula.var_count());
        ensure_var_count(ctx.borrow());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Reads and adds a formula in DIMACS CNF format.
    ///
    /// Using this avoids creating a temporary [`CnfFormula`].
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = DimacsParser::parse_incremental(input, |parser| {
            self.add_formula(&parser.take_formula());
            Ok(())
        })?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// Check the satisfiability of the current formula.
    pub fn solve(&mut self) -> Result<bool, Error> {
        let mut ctx = self.ctx.into_partial_ref_mut();

        while schedule_step(ctx.borrow()) {}

        match ctx.part(SolverStateP).sat_state {
            SatState::Sat => Ok(true),
            SatState::Unsat => Ok(false),
            SatState::Unknown => Err(anyhow!("solving stopped without a result")),
        }
    }

    /// Set of literals that satisfy the formula.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let mut ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state == SatState::Sat {
            Some(extract_model(ctx.borrow()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use duosat_dimacs::write_dimacs;

    use crate::test::{sat_formula, sgen_unsat_formula};

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..7usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve().unwrap(), false);
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve().unwrap(), true);

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert_eq!(solver.solve().unwrap(), true);

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sgen_unsat_incremetal_clauses(formula in sgen_unsat_formula(1..7usize)) {
            let mut solver = Solver::new();

            let mut last_state = true;

            for clause in formula.iter() {
                let single_clause = CnfFormula::from(Some(clause));
                solver.add_formula(&single_clause);

                let state = solver.solve().unwrap();
                if state != last_state {
                    prop_assert_eq!(state, false);
                    prop_assert_eq!(last_state, true);
                    last_state = state;
                }
            }

            prop_assert_eq!(last_state, false);
        }
    }
}
