//! Binary clauses.

use std::mem::take;

use partial_ref::{partial, PartialRef};

use duosat_formula::lit::Lit;

use crate::context::{AssignmentP, BinaryClausesP, Context, ProofP};
use crate::proof::ProofStep;

/// Binary clauses.
#[derive(Default)]
pub struct BinaryClauses {
    by_lit: Vec<Vec<Lit>>,
    count: usize,
}

impl BinaryClauses {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.by_lit.resize(count * 2, vec![]);
    }

    /// Add a binary clause.
    pub fn add_binary_clause(&mut self, lits: [Lit; 2]) {
        for i in 0..2 {
            self.by_lit[(!lits[i]).code()].push(lits[i ^ 1]);
        }
        self.count += 1;
    }

    /// Implications of a given literal
    pub fn implied(&self, lit: Lit) -> &[Lit] {
        &self.by_lit[lit.code()]
    }

    /// Number of binary clauses.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Remove binary clauses satisfied by the current (root level) assignment.
///
/// For each satisfied binary clause the reciprocal entry on the other literal's list is removed
/// too, so the lists never reference a deleted clause.
pub fn simplify_binary(mut ctx: partial!(Context, mut BinaryClausesP, mut ProofP, AssignmentP)) {
    let (binary, mut ctx) = ctx.split_part_mut(BinaryClausesP);
    let (proof, ctx) = ctx.split_part_mut(ProofP);
    let assignment = ctx.part(AssignmentP);

    for code in 0..binary.by_lit.len() {
        let true_lit = Lit::from_code(code);
        if assignment.lit_value(true_lit) != Some(true) {
            continue;
        }

        let satisfied = take(&mut binary.by_lit[(!true_lit).code()]);

        for other in satisfied {
            if proof.is_active() {
                proof.add_step(&ProofStep::DeleteClause([true_lit, other][..].into()));
            }

            let reciprocal = &mut binary.by_lit[(!other).code()];
            if let Some(pos) = reciprocal.iter().position(|&lit| lit == true_lit) {
                reciprocal.swap_remove(pos);
            }

            binary.count -= 1;
        }
    }
}
