//! Proof generation.
//!
//! Emits a DRAT (or binary DRAT) proof as clauses are learned and deleted. This only emits a
//! proof; verifying one is out of scope for this crate.
use std::borrow::Cow;
use std::io::{sink, BufWriter, Write};

use duosat_formula::lit::Lit;

pub mod drat;

/// Proof formats that can be generated during solving.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ProofFormat {
    Drat,
    BinaryDrat,
}

/// A single proof step understood by the DRAT writer.
#[derive(Clone, Debug)]
pub enum ProofStep<'a> {
    /// Add a clause that is an asymmetric tautology (derivable by unit propagation).
    AddClause(Cow<'a, [Lit]>),
    /// Delete a clause consisting of the given literals.
    DeleteClause(Cow<'a, [Lit]>),
}

/// Proof generation.
pub struct Proof<'a> {
    format: Option<ProofFormat>,
    target: BufWriter<Box<dyn Write + 'a>>,
}

impl<'a> Default for Proof<'a> {
    fn default() -> Proof<'a> {
        Proof {
            format: None,
            target: BufWriter::new(Box::new(sink())),
        }
    }
}

impl<'a> Proof<'a> {
    /// Start writing proof steps to the given target with the given format.
    pub fn write_proof(&mut self, target: impl Write + 'a, format: ProofFormat) {
        self.format = Some(format);
        self.target = BufWriter::new(Box::new(target))
    }

    /// Stop writing proof steps.
    pub fn close_proof(&mut self) {
        self.handle_io_errors(self.target.flush());
        self.format = None;
        self.target = BufWriter::new(Box::new(sink()));
    }

    /// Whether proof generation is active.
    pub fn is_active(&self) -> bool {
        self.format.is_some()
    }

    /// Add a step to the proof.
    ///
    /// Ignored when proof generation is disabled.
    pub fn add_step(&mut self, step: &ProofStep) {
        let result = match self.format {
            None => return,
            Some(ProofFormat::Drat) => drat::write_step(&mut self.target, step),
            Some(ProofFormat::BinaryDrat) => drat::write_binary_step(&mut self.target, step),
        };
        self.handle_io_errors(result);
    }

    /// Handles IO errors.
    ///
    /// Right now this panics. In the future it should set an error flag that will be checked in
    /// the solver main loop to abort when proof writing failed.
    fn handle_io_errors<V, E: std::fmt::Debug>(&self, result: Result<V, E>) -> Option<V> {
        Some(result.expect("unable to write to proof file"))
    }
}

/// Integer type used to store a hash of a clause.
pub type ClauseHash = u64;

/// Hash a single literal.
///
/// Multiple literals can be combined with xor, as done in [`clause_hash`].
pub fn lit_hash(lit: Lit) -> ClauseHash {
    (!(lit.code() as u64)).wrapping_mul(0x61c8864680b583ebu64)
}

/// A fast hash function for clauses (or other *sets* of literals).
///
/// This hash function interprets the given slice as a set and will not change when the input is
/// permuted. It does not handle duplicated items.
pub fn clause_hash(lits: &[Lit]) -> ClauseHash {
    let mut hash = 0;
    for &lit in lits {
        hash ^= lit_hash(lit);
    }
    hash
}
