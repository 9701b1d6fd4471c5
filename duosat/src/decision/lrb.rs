//! The LRB (Learning Rate Branching) branching heuristic.
//!
//! Unlike VSIDS, which decays a fixed per-conflict bump, LRB blends a per-variable reward signal —
//! how often a variable's assignment participated in conflicts while it was assigned — using a
//! learning rate that itself decays over the run. See Liang, Ganesh, Poupart, Czarnecki, "Learning
//! Rate Based Branching Heuristic for SAT Solvers" (SAT 2016).

use ordered_float::OrderedFloat;

use duosat_formula::lit::Var;

/// The LRB branching heuristic.
pub struct Lrb {
    /// Current blended score for each variable.
    score: Vec<OrderedFloat<f32>>,
    /// A binary heap of the unassigned variables, ordered by `score`.
    heap: Vec<Var>,
    /// The position in the binary heap for each variable.
    position: Vec<Option<usize>>,
    /// Conflict count at which each variable was last assigned.
    picked_at_conflict: Vec<u64>,
    /// Conflict count at which each variable was last unassigned, 0 if never assigned yet.
    canceled_at_conflict: Vec<u64>,
    /// Conflicts resolved through each variable's assignment since it was last assigned.
    participated: Vec<u32>,
    /// Conflicts where each variable's assignment appeared in a reason chain without being
    /// resolved on directly.
    almost_participated: Vec<u32>,
    /// Current learning rate.
    step_size: f32,
    /// Per-conflict decrement applied to `step_size`.
    step_size_dec: f32,
    /// Floor for `step_size`.
    min_step_size: f32,
    /// Conflicts seen so far. Kept internally so callers don't need to thread a shared counter
    /// through every assignment/unassignment call site.
    conflicts: u64,
}

impl Default for Lrb {
    fn default() -> Lrb {
        Lrb {
            score: vec![],
            heap: vec![],
            position: vec![],
            picked_at_conflict: vec![],
            canceled_at_conflict: vec![],
            participated: vec![],
            almost_participated: vec![],
            step_size: 0.40,
            step_size_dec: 1e-6,
            min_step_size: 0.06,
            conflicts: 0,
        }
    }
}

impl Lrb {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        let old_count = self.score.len();
        debug_assert!(!self.heap.iter().any(|&v| v.index() >= count));
        self.score.resize(count, OrderedFloat(0.0));
        self.position.resize(count, None);
        self.picked_at_conflict.resize(count, 0);
        self.canceled_at_conflict.resize(count, 0);
        self.participated.resize(count, 0);
        self.almost_participated.resize(count, 0);

        for i in old_count..count {
            self.make_available(Var::from_index(i));
        }
    }

    /// Apply the configured learning-rate parameters.
    pub fn configure(&mut self, step_size: f32, step_size_dec: f32, min_step_size: f32) {
        self.step_size = step_size;
        self.step_size_dec = step_size_dec;
        self.min_step_size = min_step_size;
    }

    /// Decay the learning rate by one conflict's worth, floored at `min_step_size`.
    pub fn decay_step_size(&mut self) {
        self.step_size = (self.step_size - self.step_size_dec).max(self.min_step_size);
    }

    /// Record that a conflict happened, advancing the internal conflict counter used to age
    /// variables for the reward computation.
    pub fn record_conflict(&mut self) {
        self.conflicts += 1;
        self.decay_step_size();
    }

    /// Number of conflicts seen so far.
    pub fn conflicts(&self) -> u64 {
        self.conflicts
    }

    /// Record that `var`'s current assignment was resolved on during conflict analysis.
    pub fn bump_participated(&mut self, var: Var) {
        self.participated[var.index()] += 1;
    }

    /// Record that `var`'s current assignment appeared in a reason chain without being resolved
    /// on directly.
    pub fn bump_almost_participated(&mut self, var: Var) {
        self.almost_participated[var.index()] += 1;
    }

    /// Record that `var` was just assigned, resetting its reward counters.
    pub fn notify_assigned(&mut self, var: Var) {
        self.picked_at_conflict[var.index()] = self.conflicts;
        self.participated[var.index()] = 0;
        self.almost_participated[var.index()] = 0;
    }

    /// Return `var` to the heap, optionally blending its accumulated reward into its score first.
    ///
    /// `blend_reward` is false while tentative propagation (exploration, vivification) is
    /// unwinding: those assignments never went through real conflict analysis, so their
    /// `participated`/`almost_participated` counters don't carry real reward information.
    pub fn notify_unassigned(&mut self, var: Var, blend_reward: bool) {
        if blend_reward {
            let age = self.conflicts.saturating_sub(self.picked_at_conflict[var.index()]);
            if age > 0 {
                let reward = f32::from(
                    (self.participated[var.index()] + self.almost_participated[var.index()]) as u16,
                ) / age as f32;
                let value = self.score[var.index()].0;
                self.score[var.index()] =
                    OrderedFloat(self.step_size * reward + (1.0 - self.step_size) * value);
            }
        }
        self.canceled_at_conflict[var.index()] = self.conflicts;
        self.make_available(var);
    }

    /// The variable's current blended score, decayed for time spent unassigned.
    ///
    /// Used both for `pickBranchLit`'s anti-exploration decay and by the explorer when bumping via
    /// `expScore`.
    pub fn decayed_score(&self, var: Var) -> f32 {
        let idle = self.conflicts.saturating_sub(self.canceled_at_conflict[var.index()]);
        if self.canceled_at_conflict[var.index()] == 0 || idle == 0 {
            self.score[var.index()].0
        } else {
            self.score[var.index()].0 * 0.95f32.powi(idle.min(u32::MAX as u64) as i32)
        }
    }

    /// The variable's raw blended score, without the idle-time decay `decayed_score` applies.
    pub fn score(&self, var: Var) -> f32 {
        self.score[var.index()].0
    }

    /// Directly set a variable's score (used by the explorer's `updateHeapWithExpScore`).
    pub fn bump_score(&mut self, var: Var, delta: f32) {
        self.score[var.index()].0 += delta;
        if let Some(pos) = self.position[var.index()] {
            self.sift_up(pos);
        }
    }

    /// Insert a variable into the heap if not already present.
    pub fn make_available(&mut self, var: Var) {
        if self.position[var.index()].is_none() {
            let position = self.heap.len();
            self.position[var.index()] = Some(position);
            self.heap.push(var);
            self.sift_up(position);
        }
    }

    /// Variable currently at the top of the heap, without removing it.
    pub fn peek(&self) -> Option<Var> {
        self.heap.first().copied()
    }

    /// Apply the anti-exploration decay to the current heap top, permanently folding idle time
    /// into its score before it is considered for `pickBranchLit`.
    pub fn decay_top(&mut self) {
        if let Some(top) = self.heap.first().copied() {
            if self.canceled_at_conflict[top.index()] > 0 {
                let decayed = self.decayed_score(top);
                self.score[top.index()] = OrderedFloat(decayed);
                self.canceled_at_conflict[top.index()] = self.conflicts;
                self.sift_down(0);
            }
        }
    }

    /// Number of variables currently available in the heap.
    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }

    /// The variable at a given heap slot, for the explorer's uniform random pick.
    pub fn heap_var(&self, index: usize) -> Var {
        self.heap[index]
    }

    fn sift_up(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        loop {
            if pos == 0 {
                return;
            }
            let parent_pos = (pos - 1) / 2;
            let parent_var = self.heap[parent_pos];
            if self.score[parent_var.index()] >= self.score[var.index()] {
                return;
            }
            self.position[var.index()] = Some(parent_pos);
            self.heap[parent_pos] = var;
            self.position[parent_var.index()] = Some(pos);
            self.heap[pos] = parent_var;
            pos = parent_pos;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        loop {
            let mut largest_pos = pos;
            let mut largest_var = var;

            let left_pos = pos * 2 + 1;
            if left_pos < self.heap.len() {
                let left_var = self.heap[left_pos];
                if self.score[largest_var.index()] < self.score[left_var.index()] {
                    largest_pos = left_pos;
                    largest_var = left_var;
                }
            }

            let right_pos = pos * 2 + 2;
            if right_pos < self.heap.len() {
                let right_var = self.heap[right_pos];
                if self.score[largest_var.index()] < self.score[right_var.index()] {
                    largest_pos = right_pos;
                    largest_var = right_var;
                }
            }

            if largest_pos == pos {
                return;
            }

            self.position[var.index()] = Some(largest_pos);
            self.heap[largest_pos] = var;
            self.position[largest_var.index()] = Some(pos);
            self.heap[pos] = largest_var;
            pos = largest_pos;
        }
    }
}

impl Iterator for Lrb {
    type Item = Var;

    fn next(&mut self) -> Option<Var> {
        if self.heap.is_empty() {
            None
        } else {
            let var = self.heap.swap_remove(0);
            if !self.heap.is_empty() {
                let top_var = self.heap[0];
                self.position[top_var.index()] = Some(0);
                self.sift_down(0);
            }
            self.position[var.index()] = None;
            Some(var)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_blends_toward_participation_rate() {
        let mut lrb = Lrb::default();
        lrb.set_var_count(2);
        lrb.configure(0.40, 0.0, 0.06);

        let v0 = Var::from_index(0);

        lrb.next();
        for _ in 0..10 {
            lrb.record_conflict();
        }
        lrb.notify_assigned(v0);
        lrb.bump_participated(v0);
        lrb.bump_participated(v0);
        lrb.record_conflict();
        lrb.record_conflict();
        lrb.notify_unassigned(v0);

        // age = 2, participated = 2 => reward = 1.0
        assert!((lrb.decayed_score(v0) - 0.40).abs() < 1e-6);
    }

    #[test]
    fn heap_orders_by_score() {
        let mut lrb = Lrb::default();
        lrb.set_var_count(4);

        for i in 0..4 {
            lrb.bump_score(Var::from_index(i), i as f32);
        }

        for i in (0..4).rev() {
            assert_eq!(lrb.next(), Some(Var::from_index(i)));
        }
        assert_eq!(lrb.next(), None);
    }
}
