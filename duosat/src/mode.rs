//! The VSIDS/LRB branching mode and its restart-boundary switch timer.
//!
//! The two branching heuristics ([`crate::decision::vsids::Vsids`] and
//! [`crate::decision::lrb::Lrb`]) are always kept up to date in parallel; this module only tracks
//! which one `pickBranchLit` currently consults, plus the bookkeeping needed to flip between them.
use std::time::Instant;

/// Which order-heap `pickBranchLit` currently consults.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BranchMode {
    Vsids,
    Lrb,
}

/// Mode-switch state: the fixed VSIDS startup phase followed by an LRB phase that is
/// periodically interrupted by a wall-clock timer switching back to VSIDS.
pub struct ModeState {
    mode: BranchMode,
    /// Whether the initial fixed-length VSIDS phase has completed.
    phase1_done: bool,
    /// Wall-clock deadline after which the next LRB-phase restart switches back to VSIDS.
    switch_deadline: Option<Instant>,
    /// Set by the deadline check; consumed (and cleared) at the next restart.
    switch_requested: bool,
}

impl Default for ModeState {
    fn default() -> ModeState {
        ModeState {
            mode: BranchMode::Vsids,
            phase1_done: false,
            switch_deadline: None,
            switch_requested: false,
        }
    }
}

impl ModeState {
    /// Current branching mode.
    pub fn mode(&self) -> BranchMode {
        self.mode
    }

    /// Arm the wall-clock mode-switch timer. Called once at the start of a solve.
    pub fn arm(&mut self, switch_after_seconds: u64) {
        if self.switch_deadline.is_none() {
            self.switch_deadline =
                Some(Instant::now() + std::time::Duration::from_secs(switch_after_seconds));
        }
    }

    /// Whether the fixed-length VSIDS startup phase has run its course.
    pub fn phase1_done(&self) -> bool {
        self.phase1_done
    }

    /// Switch from the initial VSIDS phase into LRB. Only meaningful once, at the end of phase 1.
    pub fn end_phase1(&mut self) {
        self.phase1_done = true;
        self.mode = BranchMode::Lrb;
    }

    /// Poll the wall-clock timer. Idempotent; only ever sets the flag, never clears it early.
    pub fn poll_switch_timer(&mut self) {
        if !self.switch_requested {
            if let Some(deadline) = self.switch_deadline {
                if Instant::now() >= deadline {
                    self.switch_requested = true;
                }
            }
        }
    }

    /// Called at a restart boundary in LRB mode. If the wall-clock timer fired, switches back to
    /// VSIDS and reports that LRB bookkeeping arrays should be cleared.
    pub fn take_switch_to_vsids(&mut self) -> bool {
        if self.mode == BranchMode::Lrb && self.switch_requested {
            self.switch_requested = false;
            self.mode = BranchMode::Vsids;
            true
        } else {
            false
        }
    }
}
