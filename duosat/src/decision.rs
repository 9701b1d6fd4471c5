//! Decision heuristics.
//!
//! `make_decision` consults whichever order-heap [`ModeState`](crate::mode::ModeState) currently
//! selects, applies the configured phase-saving policy to choose a polarity, and occasionally
//! overrides both with a uniformly random unassigned variable. In LRB mode it first gives
//! [`crate::explore`] a chance to run a random-walk episode instead of a normal decision.

use partial_ref::{partial, PartialRef};

use duosat_formula::lit::{Lit, Var};

use crate::context::{
    AnalyzeConflictP, AssignmentP, BinaryClausesP, ClauseAllocP, Context, ExplorerP, ImplGraphP,
    LrbP, ModeStateP, SolverConfigP, SolverStateP, TmpDataP, TrailP, VsidsP, WatchlistsP,
};
use crate::explore::explore;
use crate::mode::BranchMode;
use crate::prop::{enqueue_assignment, Reason};

/// Make a decision and enqueue it.
///
/// Returns `false` if no decision was made because all variables are assigned.
pub fn make_decision<'a>(
    mut ctx: partial!(
        Context<'a>,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseAllocP,
        mut ExplorerP,
        mut ImplGraphP,
        mut LrbP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        ModeStateP,
        SolverConfigP,
    ),
) -> bool {
    if ctx
        .part(AssignmentP)
        .assignment()
        .iter()
        .all(Option::is_some)
    {
        return false;
    }

    ctx.part_mut(ExplorerP).before_decision();

    if ctx.part(ModeStateP).mode() == BranchMode::Lrb {
        let trigger_percent = ctx.part(SolverConfigP).explore_trigger_percent;
        if ctx.part_mut(ExplorerP).should_trigger(trigger_percent) {
            let walks = ctx.part(SolverConfigP).explore_walks;
            let steps = ctx.part(SolverConfigP).explore_steps;
            explore(ctx.borrow(), walks, steps);

            if ctx
                .part(AssignmentP)
                .assignment()
                .iter()
                .all(Option::is_some)
            {
                return false;
            }
        }
    }

    let var = pick_var(ctx.borrow());

    let phase_saving = ctx.part(SolverConfigP).phase_saving;
    let saved_polarity = match phase_saving {
        0 => false,
        _ => ctx.part(AssignmentP).last_var_value(var),
    };

    let decision = Lit::from_var(var, !saved_polarity);

    ctx.part_mut(TrailP).new_decision_level();
    enqueue_assignment(ctx.borrow(), decision, Reason::Unit);

    true
}

/// Select an unassigned variable to branch on, without deciding its polarity.
///
/// With probability `rnd_freq` picks uniformly among all currently unassigned variables;
/// otherwise pops the top of whichever heap `ModeState::mode` currently selects.
fn pick_var(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ExplorerP,
        mut LrbP,
        mut VsidsP,
        ModeStateP,
        SolverConfigP,
    ),
) -> Var {
    let rnd_freq = ctx.part(SolverConfigP).rnd_freq;

    if rnd_freq > 0.0 && ctx.part_mut(ExplorerP).roll(rnd_freq) {
        let var_count = ctx.part(AssignmentP).assignment().len();
        let mut candidates: Vec<Var> = (0..var_count)
            .map(Var::from_index)
            .filter(|&var| ctx.part(AssignmentP).var_value(var).is_none())
            .collect();
        if !candidates.is_empty() {
            let index = ctx.part_mut(ExplorerP).random_index(candidates.len());
            return candidates.swap_remove(index);
        }
    }

    loop {
        let next = match ctx.part(ModeStateP).mode() {
            BranchMode::Vsids => ctx.part_mut(VsidsP).next(),
            BranchMode::Lrb => {
                ctx.part_mut(LrbP).decay_top();
                ctx.part_mut(LrbP).next()
            }
        };

        match next {
            Some(var) => {
                if ctx.part(AssignmentP).var_value(var).is_none() {
                    return var;
                }
                // Heap entries are removed on pop and only reinserted on backtrack, so this
                // shouldn't happen in practice; guards against future staleness regardless.
            }
            None => unreachable!("pick_var called with an unassigned variable known to exist"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use crate::context::set_var_count;

    #[test]
    fn decides_until_fully_assigned() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        let mut decisions = 0;
        while make_decision(ctx.borrow()) {
            decisions += 1;
            assert!(decisions <= 4);
        }

        assert!(ctx
            .part(AssignmentP)
            .assignment()
            .iter()
            .all(Option::is_some));
    }
}
