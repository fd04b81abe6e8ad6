//! Shared primitive types used across the scoring engine.

/// Name of a model feature, exactly as it appears in a coefficient table.
pub type FeatureName = String;

/// Predicted probability of formal financial inclusion, in (0, 1).
pub type Probability = f64;

/// Index of one independent simulation trial.
pub type TrialIndex = u64;

/// Probability at or above which a person counts as formally included.
pub const INCLUSION_THRESHOLD: Probability = 0.5;
