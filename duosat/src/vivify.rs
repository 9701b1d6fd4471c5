//! Learnt-clause minimization (vivification).
//!
//! Periodically re-examines clauses — CORE first, then TIER2, then the original clauses flagged
//! in the `usedClauses` bucket during conflict analysis, then (budget permitting) the remaining
//! original clauses — and tries to shrink each one by asserting the negation of its literals one
//! at a time under unit propagation, stacking the assumptions as it goes. If propagation ever
//! forces one of the clause's own literals before it is assumed, the clause is already implied by
//! the prefix tested so far and everything after it can be dropped. This follows the
//! vivification technique of Piette, Hamadi & Saïs.
use partial_ref::{partial, PartialRef};

use duosat_formula::lit::Lit;

use crate::clause::db;
use crate::clause::{ClauseHeader, ClauseRef, Tier};
use crate::context::{
    AssignmentP, BinaryClausesP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, LrbP, ProofP,
    ScheduleP, SolverConfigP, SolverStateP, TmpDataP, TrailP, VsidsP, WatchlistsP,
};
use crate::glue::compute_glue;
use crate::proof::ProofStep;
use crate::prop::{backtrack, enqueue_assignment, propagate, Reason};
use crate::state::SatState;

/// Number of literals this pass will test across all clauses, bounding its cost.
const VIVIFY_BUDGET: usize = 100_000;

/// Run one learnt-clause minimization pass.
///
/// A no-op unless the solver is currently at decision level 0, since the tentative assumptions
/// this pass makes would otherwise clash with the real search state.
pub fn vivify<'a>(
    mut ctx: partial!(
        Context<'a>,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut LrbP,
        mut ProofP<'a>,
        mut ScheduleP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
) {
    if ctx.part(TrailP).current_level() != 0 || ctx.part(SolverStateP).sat_state != SatState::Unknown
    {
        return;
    }

    ctx.part_mut(SolverStateP).suppress_heuristic_updates = true;

    let mut budget = VIVIFY_BUDGET;

    let core = ctx.part(ClauseDbP).by_tier[Tier::Core as usize].clone();
    vivify_batch(ctx.borrow(), &core, &mut budget);

    let tier2 = ctx.part(ClauseDbP).by_tier[Tier::Mid as usize].clone();
    vivify_batch(ctx.borrow(), &tier2, &mut budget);

    let used = ctx.part_mut(ClauseDbP).take_used_clauses();
    vivify_batch(ctx.borrow(), &used, &mut budget);
    for &cref in &used {
        if !ctx.part(ClauseAllocP).header(cref).deleted() {
            ctx.part_mut(ClauseAllocP).header_mut(cref).set_used(false);
        }
    }

    if budget > 0 {
        let originals = ctx.part(ClauseDbP).by_tier[Tier::Irred as usize].clone();
        vivify_batch(ctx.borrow(), &originals, &mut budget);
    }

    ctx.part_mut(SolverStateP).suppress_heuristic_updates = false;
}

fn vivify_batch<'a>(
    mut ctx: partial!(
        Context<'a>,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut LrbP,
        mut ProofP<'a>,
        mut ScheduleP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
    crefs: &[ClauseRef],
    budget: &mut usize,
) {
    for &cref in crefs {
        if *budget == 0 || ctx.part(SolverStateP).sat_state != SatState::Unknown {
            return;
        }
        vivify_one(ctx.borrow(), cref, budget);
    }
}

/// Try to shrink a single clause, replacing it in the database if it shrank.
fn vivify_one<'a>(
    mut ctx: partial!(
        Context<'a>,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut LrbP,
        mut ProofP<'a>,
        mut ScheduleP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
    cref: ClauseRef,
    budget: &mut usize,
) {
    if ctx.part(ClauseAllocP).header(cref).deleted() {
        return;
    }

    let old_lits = ctx.part(ClauseAllocP).clause(cref).lits().to_vec();
    let learnt = ctx.part(ClauseAllocP).header(cref).learnt();
    let old_tier = ctx.part(ClauseAllocP).header(cref).tier();

    let mut kept: Vec<Lit> = Vec::with_capacity(old_lits.len());
    let mut proven_early = false;

    for &lit in &old_lits {
        if *budget == 0 {
            break;
        }

        match ctx.part(AssignmentP).lit_value(lit) {
            Some(true) => {
                if ctx.part(ImplGraphP).level(lit.var()) == 0 {
                    // Permanently satisfied: the whole clause is subsumed.
                    backtrack(ctx.borrow(), 0);
                    ctx.part_mut(ProofP)
                        .add_step(&ProofStep::DeleteClause(old_lits[..].into()));
                    db::delete_clause(ctx.borrow(), cref);
                    return;
                }
                // Forced true by the assumptions made so far: the prefix already implies this
                // literal, so everything after it is redundant.
                kept.push(lit);
                proven_early = true;
                break;
            }
            Some(false) => {
                // Already false, whether at the root level or forced by our own assumptions: it
                // never independently satisfies the clause and can be dropped.
                proven_early = true;
                continue;
            }
            None => {}
        }

        ctx.part_mut(TrailP).new_decision_level();
        enqueue_assignment(ctx.borrow(), !lit, Reason::Unit);
        *budget -= 1;

        match propagate(ctx.borrow()) {
            Ok(()) => kept.push(lit),
            Err(_conflict) => {
                kept.push(lit);
                proven_early = true;
                break;
            }
        }
    }

    backtrack(ctx.borrow(), 0);

    if !proven_early || kept.len() == old_lits.len() {
        return;
    }

    ctx.part_mut(ClauseAllocP).header_mut(cref).bump_simplified();

    ctx.part_mut(ProofP)
        .add_step(&ProofStep::AddClause(kept[..].into()));
    ctx.part_mut(ProofP)
        .add_step(&ProofStep::DeleteClause(old_lits[..].into()));

    db::delete_clause(ctx.borrow(), cref);

    match kept.len() {
        0 => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
        1 => enqueue_assignment(ctx.borrow(), kept[0], Reason::Unit),
        2 => ctx
            .part_mut(BinaryClausesP)
            .add_binary_clause([kept[0], kept[1]]),
        _ => {
            let glue = compute_glue(ctx.borrow(), &kept);

            let mut header = ClauseHeader::new();
            header.set_learnt(learnt);
            header.set_glue(glue);

            let core_lbd_cut = ctx.part(SolverConfigP).core_lbd_cut as usize;
            let tier = if !learnt {
                Tier::Irred
            } else if glue <= core_lbd_cut {
                Tier::Core
            } else if glue <= 6 {
                Tier::Mid
            } else {
                old_tier
            };
            header.set_tier(tier);

            match tier {
                Tier::Mid => header.set_touched(ctx.part(ScheduleP).conflicts()),
                Tier::Local => header.set_activity(1.0),
                _ => (),
            }

            let new_cref = db::add_clause(ctx.borrow(), header, &kept);
            ctx.part_mut(WatchlistsP)
                .watch_clause(new_cref, [kept[0], kept[1]]);
        }
    }
}
