//! Clause assessment.
use duosat_formula::lit::Lit;
use partial_ref::{partial, PartialRef};

use crate::context::{ClauseAllocP, ClauseDbP, Context, ImplGraphP, ScheduleP, SolverConfigP, TmpDataP};
use crate::glue::compute_glue;

use super::db::set_clause_tier;
use super::{ClauseHeader, ClauseRef, Tier};

/// Assess the newly learned clause and generate a clause header.
///
/// Tier placement follows the LBD cutoffs documented for [`SolverConfig`](crate::config::SolverConfig):
/// `core_lbd_cut` or below goes to [`Tier::Core`], 6 or below to [`Tier::Mid`] (tracked for TIER2
/// demotion via `touched`), everything else to [`Tier::Local`] (with an initial activity bump).
pub fn assess_learned_clause(
    mut ctx: partial!(Context, mut TmpDataP, ImplGraphP, ScheduleP, SolverConfigP),
    lits: &[Lit],
) -> ClauseHeader {
    // This is called while the clause is still in conflict, thus the computed glue level is one
    // higher than it'll be after backtracking when the clause becomes asserting.
    let glue = compute_glue(ctx.borrow(), lits) - 1;

    let core_lbd_cut = ctx.part(SolverConfigP).core_lbd_cut as usize;

    let mut header = ClauseHeader::new();
    header.set_learnt(true);
    header.set_glue(glue);

    let tier = if glue <= core_lbd_cut {
        Tier::Core
    } else if glue <= 6 {
        Tier::Mid
    } else {
        Tier::Local
    };
    header.set_tier(tier);

    match tier {
        Tier::Mid => header.set_touched(ctx.part(ScheduleP).conflicts()),
        Tier::Local => header.set_activity(1.0),
        _ => (),
    }

    header
}

/// Per-resolvent housekeeping for a clause walked during conflict analysis.
///
/// Recomputes the clause's current LBD and, if it improved, promotes a learnt clause towards CORE
/// or TIER2 and clears its one-shot `removable` reprieve once its LBD is low enough. Original
/// (non-learnt) clauses are instead recorded in the `usedClauses` bucket the first time they take
/// part in a conflict, so `vivify` can prioritize them.
pub fn promote_involved_clause(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut TmpDataP,
        ImplGraphP,
        ScheduleP,
        SolverConfigP,
    ),
    cref: ClauseRef,
) {
    let lits = ctx.part(ClauseAllocP).clause(cref).lits().to_vec();
    let glue = compute_glue(ctx.borrow(), &lits);

    let (learnt, used, simplified, old_glue, tier) = {
        let header = ctx.part(ClauseAllocP).header(cref);
        (
            header.learnt(),
            header.used(),
            header.simplified(),
            header.glue(),
            header.tier(),
        )
    };

    if !learnt {
        if !used && simplified == 0 {
            ctx.part_mut(ClauseAllocP).header_mut(cref).set_used(true);
            ctx.part_mut(ClauseDbP).used_clauses.push(cref);
        }
        return;
    }

    if glue >= old_glue {
        return;
    }

    ctx.part_mut(ClauseAllocP).header_mut(cref).set_glue(glue);

    let core_lbd_cut = ctx.part(SolverConfigP).core_lbd_cut as usize;

    if glue <= core_lbd_cut && tier != Tier::Core {
        set_clause_tier(ctx.borrow(), cref, Tier::Core);
    } else if glue <= 6 && tier == Tier::Local {
        let conflicts = ctx.part(ScheduleP).conflicts();
        set_clause_tier(ctx.borrow(), cref, Tier::Mid);
        ctx.part_mut(ClauseAllocP)
            .header_mut(cref)
            .set_touched(conflicts);
    }

    if glue <= 30 {
        ctx.part_mut(ClauseAllocP)
            .header_mut(cref)
            .set_removable(false);
    }
}
