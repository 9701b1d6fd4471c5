//! Randomised exploration episodes that reweight branching scores.
//!
//! Active only once the search has settled into the LRB phase. Periodically, instead of taking a
//! normal branch, the solver performs a handful of short random walks through the assignment
//! space. Conflicts reached during a walk are analysed only to obtain their LBD; the derived
//! clause is thrown away and the trail is rewound, so a walk leaves no trace beyond the
//! accumulated `walkScore`/`varOcc` statistics, which are folded into the LRB heap afterwards.
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use partial_ref::{partial, PartialRef};

use duosat_formula::lit::Lit;

use crate::analyze_conflict::analyze_conflict;
use crate::context::{
    AnalyzeConflictP, AssignmentP, BinaryClausesP, ClauseAllocP, Context, ExplorerP, ImplGraphP,
    LrbP, ModeStateP, SolverConfigP, SolverStateP, TmpDataP, TrailP, VsidsP, WatchlistsP,
};
use crate::glue::compute_glue;
use crate::mode::BranchMode;
use crate::prop::{backtrack, enqueue_assignment, propagate, Reason};

/// Bookkeeping for deciding when to run an exploration episode, plus the per-episode
/// accumulators used while one is running.
pub struct Explorer {
    rng: Pcg32,
    /// Decisions made so far while eligible for exploration (informational only).
    active_decisions: u64,
    /// Decisions, across all CD-phases, that did not immediately end in a conflict.
    decisions_without_conflicts: u64,
    /// Number of conflicts seen since phase 1 ended (each one closes a CD-phase).
    decisions_with_conflicts: u64,
    /// Decisions since the last conflict.
    phase_len: u64,
    /// Exponential moving average of the CD-phase length.
    avg_cd_phase_len: f32,
    /// Per-variable accumulated walk score for the episode currently being folded in.
    walk_score: Vec<f32>,
    /// Number of times each variable contributed to `walk_score`.
    var_occ: Vec<u32>,
    /// Running average LBD of conflict-terminating walks, across the run.
    avg_conflict_lbd: f32,
    conflict_walks_seen: u32,
}

impl Default for Explorer {
    fn default() -> Explorer {
        Explorer {
            rng: Pcg32::seed_from_u64(0),
            active_decisions: 0,
            decisions_without_conflicts: 0,
            decisions_with_conflicts: 0,
            phase_len: 0,
            avg_cd_phase_len: 0.0,
            walk_score: vec![],
            var_occ: vec![],
            avg_conflict_lbd: 0.0,
            conflict_walks_seen: 0,
        }
    }
}

impl Explorer {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.walk_score.resize(count, 0.0);
        self.var_occ.resize(count, 0);
    }

    /// Seed the exploration PRNG.
    pub fn seed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    /// Record that a normal (non-exploring) decision is about to be made.
    pub fn before_decision(&mut self) {
        self.active_decisions += 1;
        self.decisions_without_conflicts += 1;
        self.phase_len += 1;
    }

    /// Record that a conflict just closed out the current CD-phase.
    pub fn on_conflict(&mut self) {
        if self.decisions_with_conflicts == 0 {
            self.avg_cd_phase_len = self.phase_len as f32;
        } else {
            self.avg_cd_phase_len = 0.9 * self.avg_cd_phase_len + 0.1 * self.phase_len as f32;
        }
        self.decisions_with_conflicts += 1;
        self.phase_len = 0;
    }

    /// Average number of decisions it takes to reach a conflict, across the run so far.
    fn to_reach_conflict(&self) -> f32 {
        if self.decisions_with_conflicts == 0 {
            0.0
        } else {
            self.decisions_without_conflicts as f32 / self.decisions_with_conflicts as f32
        }
    }

    /// Whether an exploration episode should run instead of the next normal decision.
    pub fn should_trigger(&mut self, trigger_percent: f32) -> bool {
        if self.decisions_with_conflicts == 0 {
            return false;
        }
        if (self.phase_len as f32) < self.to_reach_conflict().ceil() {
            return false;
        }
        self.rng.gen::<f32>() < trigger_percent / 100.0
    }

    /// A single Bernoulli trial with the given probability, using the exploration PRNG.
    ///
    /// Shared with `decision.rs`'s `rnd_freq` random-decision override: both are "how much
    /// randomness to inject" knobs seeded from the same `rnd_seed`.
    pub fn roll(&mut self, probability: f32) -> bool {
        self.rng.gen::<f32>() < probability
    }

    /// A uniformly random index in `0..n`. Panics if `n == 0`.
    pub fn random_index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0, n)
    }
}

/// Run one exploration episode: up to `walks` walks of up to `steps` steps each.
///
/// No learnt clause is kept: conflict analysis only supplies the LBD used to weight that walk,
/// and the trail is rewound to its pre-episode state before returning.
pub fn explore(
    mut ctx: partial!(
        Context,
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
    walks: u32,
    steps: u32,
) {
    if ctx.part(ModeStateP).mode() != BranchMode::Lrb || !ctx.part(ModeStateP).phase1_done() {
        return;
    }

    let d_level = ctx.part(TrailP).current_level();

    ctx.part_mut(ExplorerP).walk_score.iter_mut().for_each(|s| *s = 0.0);
    ctx.part_mut(ExplorerP).var_occ.iter_mut().for_each(|o| *o = 0);

    ctx.part_mut(SolverStateP).suppress_heuristic_updates = true;

    for _ in 0..walks {
        let mut step_vars = Vec::with_capacity(steps as usize);
        let mut conflict_lbd = None;

        for _ in 0..steps {
            let heap_len = ctx.part(LrbP).heap_len();
            if heap_len == 0 {
                break;
            }
            let index = ctx.part_mut(ExplorerP).rng.gen_range(0, heap_len);
            let var = ctx.part(LrbP).heap_var(index);

            if ctx.part(AssignmentP).var_value(var).is_some() {
                // Stale heap entry for an already-assigned variable; skip this step.
                continue;
            }

            let polarity = ctx.part(AssignmentP).last_var_value(var);
            let lit = Lit::from_var(var, !polarity);

            ctx.part_mut(TrailP).new_decision_level();
            enqueue_assignment(ctx.borrow(), lit, Reason::Unit);
            step_vars.push(var);

            match propagate(ctx.borrow()) {
                Ok(()) => {}
                Err(conflict) => {
                    analyze_conflict(ctx.borrow(), conflict);
                    let lits = ctx.part(AnalyzeConflictP).clause().to_vec();
                    let lbd = compute_glue(ctx.borrow(), &lits);
                    conflict_lbd = Some(lbd);
                    break;
                }
            }
        }

        backtrack(ctx.borrow(), d_level);

        if let Some(lbd) = conflict_lbd {
            let explorer = ctx.part_mut(ExplorerP);
            explorer.conflict_walks_seen += 1;
            explorer.avg_conflict_lbd +=
                (lbd as f32 - explorer.avg_conflict_lbd) / explorer.conflict_walks_seen as f32;

            if lbd > 0 && (lbd as f32) <= explorer.avg_conflict_lbd {
                let steps_in_walk = step_vars.len();
                for (step_index, &var) in step_vars.iter().enumerate() {
                    let weight = (1.0 / lbd as f32)
                        * 0.9f32.powi((steps_in_walk - step_index - 1) as i32);
                    explorer.walk_score[var.index()] += weight;
                    explorer.var_occ[var.index()] += 1;
                }
            }
        }
    }

    ctx.part_mut(SolverStateP).suppress_heuristic_updates = false;

    update_heap_with_exp_score(ctx.borrow());
}

/// Fold the episode's `walkScore`/`varOcc` accumulators into the LRB heap.
fn update_heap_with_exp_score(
    mut ctx: partial!(Context, mut ExplorerP, mut LrbP),
) {
    let var_count = ctx.part(ExplorerP).walk_score.len();
    let mut top_replaced = 0u32;
    let mut current_top = ctx.part(LrbP).peek();

    for index in 0..var_count {
        let occ = ctx.part(ExplorerP).var_occ[index];
        if occ == 0 {
            continue;
        }
        let score = ctx.part(ExplorerP).walk_score[index] / occ as f32;
        let var = duosat_formula::lit::Var::from_index(index);

        let top_score = ctx
            .part(LrbP)
            .peek()
            .map(|top| ctx.part(LrbP).score(top))
            .unwrap_or(0.0);

        ctx.part_mut(LrbP).bump_score(var, score * top_score);

        let new_top = ctx.part(LrbP).peek();
        if new_top != current_top {
            top_replaced += 1;
            current_top = new_top;
        }
    }

    log::debug!("explorer episode replaced the heap top {} times", top_replaced);
}
