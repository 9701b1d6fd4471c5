//! Incremental solving placeholder.
//!
//! This crate targets a single `add_dimacs_cnf` + `solve` cycle; the assumption stack and failed
//! core tracking a fully incremental solver needs are not part of this core. This type only keeps
//! the restart controller's vocabulary ("assumption levels" as the floor below which a full
//! restart must not cancel) self-consistent with the original search loop shape.
#[derive(Default)]
pub struct Incremental {}

impl Incremental {
    /// Decision level below which a full restart must not cancel. Always 0: there are no
    /// standing assumptions.
    pub fn assumption_levels(&self) -> usize {
        0
    }

    /// No-op: nothing to reset without an assumption stack.
    pub fn full_restart(&mut self) {}
}
