//! Solver configuration.
use serde::Deserialize;

/// Configurable parameters used during solving.
///
/// Defaults follow the values documented for each field. A [`SolverConfigUpdate`] can be merged
/// in to override a subset of these, e.g. parsed from a config file or `-C key=value` CLI flags.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Initial LRB learning rate. (Default: 0.40)
    pub step_size: f32,
    /// Per-conflict decrement applied to the LRB learning rate. (Default: 1e-6)
    pub step_size_dec: f32,
    /// Minimum LRB learning rate. (Default: 0.06)
    pub min_step_size: f32,

    /// Multiplicative decay for the VSIDS decision heuristic. (Default: 0.80)
    pub var_decay: f32,
    /// Multiplicative decay for clause activities. (Default: 0.999)
    pub clause_activity_decay: f32,

    /// Fraction of random decisions. (Default: 0.0)
    pub rnd_freq: f32,
    /// Seed for the PRNG backing random decisions and exploration probes. (Default: 91648253)
    pub rnd_seed: u64,

    /// Conflict clause minimization mode: 0 = none, 1 = basic, 2 = deep. (Default: 2)
    pub ccmin_mode: u8,
    /// Phase saving policy: 0 = never, 1 = past last decision boundary, 2 = always. (Default: 2)
    pub phase_saving: u8,

    /// Base interval (in conflicts) for the Luby restart sequence. (Default: 100)
    pub rfirst: u64,
    /// Growth factor for the Luby restart sequence. (Default: 2.0)
    pub rinc: f64,

    /// Fraction of garbage in the clause arena that triggers a collection. (Default: 0.20)
    pub gc_frac: f32,

    /// Number of walks performed per exploration episode. (Default: 5)
    pub explore_walks: u32,
    /// Number of steps performed per exploration walk. (Default: 5)
    pub explore_steps: u32,
    /// Probability (in percent) that an eligible decision triggers exploration. (Default: 2)
    pub explore_trigger_percent: f32,

    /// LBD threshold at or below which a learnt clause is placed in CORE. (Default: 3)
    pub core_lbd_cut: u32,

    /// Number of conflicts between TIER2 clause reductions. (Default: 10000)
    pub reduce_mids_interval: u64,
    /// Number of conflicts between LOCAL clause reductions. (Default: 15000)
    pub reduce_locals_interval: u64,

    /// Base interval (in conflicts) between learnt-clause minimization (LCM) passes.
    /// (Default: 1000)
    pub lcm_base_interval: u64,
    /// Amount the LCM interval grows after each pass. (Default: 1000)
    pub lcm_interval_increment: u64,

    /// Length of the fixed VSIDS startup phase, in conflicts. (Default: 10000)
    pub vsids_phase_conflicts: u64,
    /// Wall-clock seconds after which the solver switches back from LRB to VSIDS.
    /// (Default: 2500)
    pub mode_switch_seconds: u64,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            step_size: 0.40,
            step_size_dec: 1e-6,
            min_step_size: 0.06,

            var_decay: 0.80,
            clause_activity_decay: 0.999,

            rnd_freq: 0.0,
            rnd_seed: 91_648_253,

            ccmin_mode: 2,
            phase_saving: 2,

            rfirst: 100,
            rinc: 2.0,

            gc_frac: 0.20,

            explore_walks: 5,
            explore_steps: 5,
            explore_trigger_percent: 2.0,

            core_lbd_cut: 3,

            reduce_mids_interval: 10_000,
            reduce_locals_interval: 15_000,

            lcm_base_interval: 1000,
            lcm_interval_increment: 1000,

            vsids_phase_conflicts: 10_000,
            mode_switch_seconds: 2500,
        }
    }
}

impl SolverConfig {
    /// A human readable listing of all configurable knobs and their defaults.
    ///
    /// Used to implement `--help` style output in command line tools built on top of this crate.
    pub fn help() -> &'static str {
        concat!(
            "step-size <f32>            initial LRB learning rate (default 0.40)\n",
            "step-size-dec <f32>        per-conflict LRB learning rate decrement (default 1e-6)\n",
            "min-step-size <f32>        minimum LRB learning rate (default 0.06)\n",
            "var-decay <f32>            VSIDS activity decay (default 0.80)\n",
            "cla-decay <f32>            clause activity decay (default 0.999)\n",
            "rnd-freq <f32>             fraction of random decisions (default 0.0)\n",
            "rnd-seed <u64>             PRNG seed (default 91648253)\n",
            "ccmin-mode <0|1|2>         conflict clause minimization mode (default 2)\n",
            "phase-saving <0|1|2>       phase saving policy (default 2)\n",
            "rfirst <u64>               Luby restart base interval (default 100)\n",
            "rinc <f64>                 Luby restart growth factor (default 2.0)\n",
            "gc-frac <f32>              garbage fraction that triggers collection (default 0.20)\n",
            "mW <u32>                   exploration walks per episode (default 5)\n",
            "mS <u32>                   exploration steps per walk (default 5)\n",
            "prTh <f32>                 exploration trigger probability in percent (default 2)\n",
            "core-lbd-cut <u32>         LBD cutoff for the CORE tier (default 3)\n",
        )
    }

    /// Apply an update on top of this configuration.
    pub fn apply(&mut self, update: &SolverConfigUpdate) {
        macro_rules! apply_field {
            ($field:ident) => {
                if let Some(value) = update.$field {
                    self.$field = value;
                }
            };
        }

        apply_field!(step_size);
        apply_field!(step_size_dec);
        apply_field!(min_step_size);
        apply_field!(var_decay);
        apply_field!(clause_activity_decay);
        apply_field!(rnd_freq);
        apply_field!(rnd_seed);
        apply_field!(ccmin_mode);
        apply_field!(phase_saving);
        apply_field!(rfirst);
        apply_field!(rinc);
        apply_field!(gc_frac);
        apply_field!(explore_walks);
        apply_field!(explore_steps);
        apply_field!(explore_trigger_percent);
        apply_field!(core_lbd_cut);
        apply_field!(reduce_mids_interval);
        apply_field!(reduce_locals_interval);
        apply_field!(lcm_base_interval);
        apply_field!(lcm_interval_increment);
        apply_field!(vsids_phase_conflicts);
        apply_field!(mode_switch_seconds);
    }
}

/// A partial [`SolverConfig`], as parsed from a config file or `-C key=value` flags.
///
/// Every field is optional; unset fields leave the corresponding [`SolverConfig`] field
/// unchanged when merged in with [`SolverConfig::apply`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SolverConfigUpdate {
    pub step_size: Option<f32>,
    pub step_size_dec: Option<f32>,
    pub min_step_size: Option<f32>,

    pub var_decay: Option<f32>,
    pub clause_activity_decay: Option<f32>,

    pub rnd_freq: Option<f32>,
    pub rnd_seed: Option<u64>,

    pub ccmin_mode: Option<u8>,
    pub phase_saving: Option<u8>,

    pub rfirst: Option<u64>,
    pub rinc: Option<f64>,

    pub gc_frac: Option<f32>,

    #[serde(rename = "m-w")]
    pub explore_walks: Option<u32>,
    #[serde(rename = "m-s")]
    pub explore_steps: Option<u32>,
    #[serde(rename = "pr-th")]
    pub explore_trigger_percent: Option<f32>,

    pub core_lbd_cut: Option<u32>,

    pub reduce_mids_interval: Option<u64>,
    pub reduce_locals_interval: Option<u64>,

    pub lcm_base_interval: Option<u64>,
    pub lcm_interval_increment: Option<u64>,

    pub vsids_phase_conflicts: Option<u64>,
    pub mode_switch_seconds: Option<u64>,
}

impl SolverConfigUpdate {
    /// An update that leaves every field unset.
    pub fn new() -> SolverConfigUpdate {
        SolverConfigUpdate::default()
    }

    /// Merge another update in, letting `other`'s set fields take priority over this update's.
    pub fn merge(&mut self, other: SolverConfigUpdate) {
        macro_rules! merge_field {
            ($field:ident) => {
                if other.$field.is_some() {
                    self.$field = other.$field;
                }
            };
        }

        merge_field!(step_size);
        merge_field!(step_size_dec);
        merge_field!(min_step_size);
        merge_field!(var_decay);
        merge_field!(clause_activity_decay);
        merge_field!(rnd_freq);
        merge_field!(rnd_seed);
        merge_field!(ccmin_mode);
        merge_field!(phase_saving);
        merge_field!(rfirst);
        merge_field!(rinc);
        merge_field!(gc_frac);
        merge_field!(explore_walks);
        merge_field!(explore_steps);
        merge_field!(explore_trigger_percent);
        merge_field!(core_lbd_cut);
        merge_field!(reduce_mids_interval);
        merge_field!(reduce_locals_interval);
        merge_field!(lcm_base_interval);
        merge_field!(lcm_interval_increment);
        merge_field!(vsids_phase_conflicts);
        merge_field!(mode_switch_seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_overrides_only_set_fields() {
        let mut config = SolverConfig::default();
        let update = SolverConfigUpdate {
            var_decay: Some(0.95),
            ..SolverConfigUpdate::default()
        };
        config.apply(&update);
        assert_eq!(config.var_decay, 0.95);
        assert_eq!(config.clause_activity_decay, 0.999);
    }
}
