//! Model reconstruction.
use partial_ref::{partial, PartialRef};

use duosat_formula::lit::Lit;

use crate::context::{AssignmentP, Context};

/// Extract a satisfying assignment as one literal per variable.
///
/// Only valid to call once the solver state is SAT: every variable must be assigned.
pub fn extract_model(ctx: partial!(Context, AssignmentP)) -> Vec<Lit> {
    ctx.part(AssignmentP)
        .assignment()
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let var = duosat_formula::lit::Var::from_index(index);
            Lit::from_var(var, !value.expect("model requested with unassigned variable"))
        })
        .collect()
}
