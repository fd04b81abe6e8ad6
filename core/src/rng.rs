//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulator may call any platform RNG.
//! All randomness flows through SimRng instances derived from the
//! single master seed held in SimulatorConfig.
//!
//! Each (trial, stream slot) pair gets its own RNG stream, seeded
//! deterministically from (master_seed XOR stream_index). This means:
//!   - Adding a new lever never changes existing levers' streams.
//!   - A leave-one-out run sees exactly the same draws as the
//!     combined run for every lever it keeps.

use crate::types::TrialIndex;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// Stream indices reserved per trial. Slots must stay below this.
const STREAMS_PER_TRIAL: u64 = 64;

/// A named, deterministic RNG for a single stream.
pub struct SimRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SimRng {
    /// Create an RNG from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Fill `out` with uniforms in [0.0, 1.0).
    pub fn fill_uniform(&mut self, out: &mut [f64]) {
        for slot in out.iter_mut() {
            *slot = self.next_f64();
        }
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }

    /// Pick an index with probability proportional to `weights`.
    /// Falls back to the last index when rounding leaves the roll uncovered.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        assert!(!weights.is_empty(), "weights must not be empty");
        let total: f64 = weights.iter().sum();
        let roll = self.next_f64() * total;
        let mut cumulative = 0.0;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if roll < cumulative {
                return i;
            }
        }
        weights.len() - 1
    }
}

/// All RNG streams for one simulator, indexed by trial and stable slot.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_stream(&self, trial: TrialIndex, slot: StreamSlot) -> SimRng {
        let index = trial.wrapping_mul(STREAMS_PER_TRIAL) + slot as u64;
        SimRng::new(self.master_seed, index).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every lever's draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Generator = 0,
    NationalId = 1,
    DigitalAccess = 2,
    Education = 3,
    Wealth = 4,
    Infrastructure = 5,
    Income = 6,
    Urbanization = 7,
    SavingsPromotion = 8,
    IncomeDiversification = 9,
    // Add new streams here, append only.
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::NationalId => "national_id",
            Self::DigitalAccess => "digital_access",
            Self::Education => "education",
            Self::Wealth => "wealth",
            Self::Infrastructure => "infrastructure",
            Self::Income => "income",
            Self::Urbanization => "urbanization",
            Self::SavingsPromotion => "savings_promotion",
            Self::IncomeDiversification => "income_diversification",
        }
    }
}
