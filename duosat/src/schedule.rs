//! Scheduling of restarts, clause-database reduction, LCM passes and the VSIDS/LRB mode switch.
use log::info;

use partial_ref::{partial, PartialRef};

use crate::cdcl::conflict_step;
use crate::clause::reduce::{reduce_locals, reduce_mids};
use crate::clause::Tier;
use crate::context::{
    AnalyzeConflictP, AssignmentP, BinaryClausesP, ClauseAllocP, ClauseDbP, Context, ExplorerP,
    ImplGraphP, LrbP, ModeStateP, ProofP, ScheduleP, SolverConfigP, SolverStateP, TmpDataP,
    TrailP, VsidsP, WatchlistsP,
};
use crate::mode::BranchMode;
use crate::prop::restart;
use crate::state::SatState;
use crate::vivify::vivify;

mod luby;

use luby::LubySequence;

/// Minimum number of conflicts between two VSIDS-mode restarts, regardless of the glue queue.
const MIN_CONFLICTS_BETWEEN_RESTARTS: u64 = 50;
/// Size of the recent-LBD queue used for the Glucose-style VSIDS restart trigger.
const RECENT_LBD_QUEUE_LEN: usize = 50;
/// Recent-average-over-global-average ratio that triggers a VSIDS restart.
const RESTART_LBD_RATIO: f32 = 0.8;
/// Number of conflicts between adaptive VSIDS decay increases.
const VSIDS_DECAY_BUMP_INTERVAL: u64 = 5000;
/// Per-bump increase applied to the VSIDS decay factor.
const VSIDS_DECAY_BUMP_STEP: f32 = 0.01;
/// Ceiling for the adaptive VSIDS decay factor.
const VSIDS_DECAY_MAX: f32 = 0.95;

/// Scheduling of restarts, clause-database reduction, LCM passes and the branching mode switch.
pub struct Schedule {
    conflicts: u64,
    restarts: u64,

    /// Luby sequence driving LRB-mode restarts.
    luby: LubySequence,
    next_restart: u64,

    /// Bounded queue of the most recent conflict clauses' LBDs, for the VSIDS glue-based restart
    /// trigger. Stored as a ring buffer with its running sum for O(1) average maintenance.
    recent_lbd: Vec<u32>,
    recent_lbd_pos: usize,
    recent_lbd_sum: u64,
    global_lbd_sum: u64,
    global_lbd_count: u64,
    conflicts_since_restart: u64,

    /// Current VSIDS decay factor, adaptively increased over the run. `None` until initialized
    /// from [`SolverConfig::var_decay`](crate::config::SolverConfig::var_decay) on first use.
    vsids_decay: Option<f32>,
    next_vsids_decay_bump: u64,

    next_lcm: u64,
    lcm_interval: u64,
}

impl Default for Schedule {
    fn default() -> Schedule {
        Schedule {
            conflicts: 0,
            restarts: 0,
            luby: LubySequence::default(),
            next_restart: 0,
            recent_lbd: vec![],
            recent_lbd_pos: 0,
            recent_lbd_sum: 0,
            global_lbd_sum: 0,
            global_lbd_count: 0,
            conflicts_since_restart: 0,
            vsids_decay: None,
            next_vsids_decay_bump: VSIDS_DECAY_BUMP_INTERVAL,
            next_lcm: 0,
            lcm_interval: 0,
        }
    }
}

impl Schedule {
    /// Number of conflicts seen so far.
    pub fn conflicts(&self) -> u64 {
        self.conflicts
    }

    /// Record the LBD of a just-learned clause, feeding both the bounded recent-LBD queue and the
    /// running global average used by the VSIDS glue-based restart trigger.
    pub fn record_conflict_glue(&mut self, glue: u32) {
        if self.recent_lbd.len() < RECENT_LBD_QUEUE_LEN {
            self.recent_lbd.push(glue);
            self.recent_lbd_sum += u64::from(glue);
        } else {
            let evicted = self.recent_lbd[self.recent_lbd_pos];
            self.recent_lbd_sum = self.recent_lbd_sum - u64::from(evicted) + u64::from(glue);
            self.recent_lbd[self.recent_lbd_pos] = glue;
            self.recent_lbd_pos = (self.recent_lbd_pos + 1) % RECENT_LBD_QUEUE_LEN;
        }
        self.global_lbd_sum += u64::from(glue);
        self.global_lbd_count += 1;
        self.conflicts_since_restart += 1;
    }

    /// Whether the recent conflicts' clauses are, on average, sufficiently worse (higher LBD) than
    /// the run's overall average to justify a VSIDS-mode restart.
    fn glue_restart_due(&self) -> bool {
        if self.conflicts_since_restart < MIN_CONFLICTS_BETWEEN_RESTARTS
            || self.recent_lbd.len() < RECENT_LBD_QUEUE_LEN
            || self.global_lbd_count == 0
        {
            return false;
        }
        let recent_avg = self.recent_lbd_sum as f32 / RECENT_LBD_QUEUE_LEN as f32;
        let global_avg = self.global_lbd_sum as f32 / self.global_lbd_count as f32;
        recent_avg * RESTART_LBD_RATIO > global_avg
    }
}

/// Perform one step of the schedule.
pub fn schedule_step<'a>(
    mut ctx: partial!(
        Context<'a>,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ExplorerP,
        mut ImplGraphP,
        mut LrbP,
        mut ModeStateP,
        mut ProofP<'a>,
        mut ScheduleP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
) -> bool {
    if ctx.part(SolverStateP).sat_state != SatState::Unknown {
        return false;
    }

    lazily_init(ctx.borrow());

    let conflicts = ctx.part(ScheduleP).conflicts;

    if conflicts > 0 && conflicts % 5000 == 0 {
        let db = ctx.part(ClauseDbP);
        let units = ctx.part(TrailP).top_level_assignment_count();
        info!(
            "confl: {}k rest: {} mode: {:?} vars: {} bin: {} irred: {} core: {} mid: {} local: {}",
            conflicts / 1000,
            ctx.part(ScheduleP).restarts,
            ctx.part(ModeStateP).mode(),
            ctx.part(AssignmentP).assignment().len() - units,
            ctx.part(BinaryClausesP).count(),
            db.count_by_tier(Tier::Irred),
            db.count_by_tier(Tier::Core),
            db.count_by_tier(Tier::Mid),
            db.count_by_tier(Tier::Local)
        );
    }

    maybe_end_vsids_phase(ctx.borrow());
    maybe_bump_vsids_decay(ctx.borrow());

    if restart_due(ctx.borrow()) {
        restart(ctx.borrow());
        on_restart(ctx.borrow());
    }

    let reduce_mids_interval = ctx.part(SolverConfigP).reduce_mids_interval;
    let reduce_locals_interval = ctx.part(SolverConfigP).reduce_locals_interval;

    if conflicts > 0 && conflicts % reduce_locals_interval == 0 {
        reduce_locals(ctx.borrow());
    }
    if conflicts > 0 && conflicts % reduce_mids_interval == 0 {
        reduce_mids(ctx.borrow());
    }

    if conflicts >= ctx.part(ScheduleP).next_lcm {
        vivify(ctx.borrow());
        schedule_next_lcm(ctx.borrow());
    }

    conflict_step(ctx.borrow());
    ctx.part_mut(ScheduleP).conflicts += 1;
    true
}

fn lazily_init(
    mut ctx: partial!(Context, mut ScheduleP, mut VsidsP, SolverConfigP),
) {
    let (schedule, mut ctx) = ctx.split_part_mut(ScheduleP);
    if schedule.vsids_decay.is_none() {
        let var_decay = ctx.part(SolverConfigP).var_decay;
        schedule.vsids_decay = Some(var_decay);
        ctx.part_mut(VsidsP).set_decay(var_decay);
    }
    if schedule.lcm_interval == 0 {
        schedule.lcm_interval = ctx.part(SolverConfigP).lcm_base_interval;
        schedule.next_lcm = schedule.lcm_interval;
    }
}

fn maybe_end_vsids_phase(mut ctx: partial!(Context, mut ModeStateP, ScheduleP, SolverConfigP)) {
    if ctx.part(ModeStateP).mode() != BranchMode::Vsids || ctx.part(ModeStateP).phase1_done() {
        return;
    }
    let vsids_phase_conflicts = ctx.part(SolverConfigP).vsids_phase_conflicts;
    if ctx.part(ScheduleP).conflicts >= vsids_phase_conflicts {
        let mode_switch_seconds = ctx.part(SolverConfigP).mode_switch_seconds;
        ctx.part_mut(ModeStateP).end_phase1();
        ctx.part_mut(ModeStateP).arm(mode_switch_seconds);
    }
}

fn maybe_bump_vsids_decay(mut ctx: partial!(Context, mut ScheduleP, mut VsidsP)) {
    let (schedule, mut ctx) = ctx.split_part_mut(ScheduleP);
    if schedule.conflicts < schedule.next_vsids_decay_bump {
        return;
    }
    schedule.next_vsids_decay_bump += VSIDS_DECAY_BUMP_INTERVAL;
    let decay = (schedule.vsids_decay.unwrap_or(0.80) + VSIDS_DECAY_BUMP_STEP).min(VSIDS_DECAY_MAX);
    schedule.vsids_decay = Some(decay);
    ctx.part_mut(VsidsP).set_decay(decay);
}

/// Whether a restart is due under whichever policy the current branching mode uses: the
/// Glucose-style glue queue in VSIDS mode, a Luby-sequence cadence in LRB mode.
fn restart_due(ctx: partial!(Context, ModeStateP, ScheduleP, SolverConfigP)) -> bool {
    match ctx.part(ModeStateP).mode() {
        BranchMode::Vsids => ctx.part(ScheduleP).glue_restart_due(),
        BranchMode::Lrb => ctx.part(ScheduleP).conflicts >= ctx.part(ScheduleP).next_restart,
    }
}

fn on_restart(mut ctx: partial!(Context, mut ModeStateP, mut ScheduleP, SolverConfigP)) {
    let (schedule, mut ctx) = ctx.split_part_mut(ScheduleP);
    schedule.restarts += 1;
    schedule.conflicts_since_restart = 0;

    if ctx.part(ModeStateP).mode() == BranchMode::Lrb {
        let rfirst = ctx.part(SolverConfigP).rfirst;
        schedule.next_restart = schedule.conflicts + rfirst * schedule.luby.advance();

        ctx.part_mut(ModeStateP).poll_switch_timer();
        ctx.part_mut(ModeStateP).take_switch_to_vsids();
    }
}

fn schedule_next_lcm(mut ctx: partial!(Context, mut ScheduleP, SolverConfigP)) {
    let increment = ctx.part(SolverConfigP).lcm_interval_increment;
    let (schedule, _ctx) = ctx.split_part_mut(ScheduleP);
    schedule.lcm_interval += increment;
    schedule.next_lcm = schedule.conflicts + schedule.lcm_interval;
}
