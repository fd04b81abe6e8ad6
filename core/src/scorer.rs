//! Logistic-regression scorer.
//!
//! Pipeline per record: base features → categorical dummies → derived
//! features → z-score standardisation → logit over every coefficient →
//! sigmoid.
//!
//! RULE: scoring is a pure function of (config, record). No state, no
//! randomness, identical input gives a bit-identical probability.

use crate::{
    config::{ModelConfig, ModelVersion},
    encoding,
    error::{ModelError, ModelResult},
    record::FeatureRecord,
    types::{FeatureName, Probability},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Keeps probabilities strictly inside (0, 1).
const PROBABILITY_FLOOR: f64 = 1e-12;

pub fn sigmoid(logit: f64) -> Probability {
    let p = if logit >= 0.0 {
        1.0 / (1.0 + (-logit).exp())
    } else {
        let e = logit.exp();
        e / (1.0 + e)
    };
    p.clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR)
}

/// Individual-mode saturation zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityBand {
    Low,
    Below,
    Likely,
    High,
    Saturated,
}

impl ProbabilityBand {
    pub fn of(p: Probability) -> Self {
        if p <= 0.15 {
            Self::Low
        } else if p < 0.5 {
            Self::Below
        } else if p < 0.7 {
            Self::Likely
        } else if p < 0.85 {
            Self::High
        } else {
            Self::Saturated
        }
    }
}

/// One feature's share of a record's logit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature:      FeatureName,
    pub raw_value:    f64,
    pub standardized: f64,
    pub coefficient:  f64,
    /// `coefficient × standardized`.
    pub contribution: f64,
    /// |contribution| over the sum of all |contribution|.
    pub share:        f64,
}

#[derive(Debug, Clone)]
pub struct Scorer {
    config: Arc<ModelConfig>,
}

impl Scorer {
    pub fn new(config: Arc<ModelConfig>) -> Self {
        Self { config }
    }

    pub fn for_version(version: ModelVersion) -> ModelResult<Self> {
        Ok(Self::new(Arc::new(ModelConfig::for_version(version)?)))
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<ModelConfig> {
        Arc::clone(&self.config)
    }

    /// Raw feature vector in model order, before standardisation.
    pub fn assemble(&self, record: &FeatureRecord) -> ModelResult<Vec<f64>> {
        let config = &*self.config;
        let order = config.feature_order();
        let mut x = vec![0.0; order.len()];

        for &i in config.required_indices() {
            let name = &order[i];
            let value = record
                .get(name)
                .ok_or_else(|| ModelError::MissingFeature { feature: name.clone() })?;
            if !value.is_finite() {
                return Err(ModelError::invariant(format!("'{name}' is not finite ({value})")));
            }
            x[i] = value;
        }

        encoding::expand_into(config, record, &mut x)?;

        for derived in config.derived_slots() {
            x[derived.index()] = derived.evaluate(&x);
        }
        Ok(x)
    }

    pub fn standardized(&self, record: &FeatureRecord) -> ModelResult<Vec<f64>> {
        let mut x = self.assemble(record)?;
        standardize(&self.config, &mut x);
        Ok(x)
    }

    pub fn logit(&self, record: &FeatureRecord) -> ModelResult<f64> {
        let z = self.standardized(record)?;
        Ok(self.config.intercept()
            + z.iter()
                .zip(self.config.coefficient_slice())
                .map(|(v, c)| v * c)
                .sum::<f64>())
    }

    /// Population path: the record is scored as given.
    pub fn score(&self, record: &FeatureRecord) -> ModelResult<Probability> {
        Ok(sigmoid(self.logit(record)?))
    }

    /// Individual path: invariant-breaking records are rejected.
    pub fn score_individual(&self, record: &FeatureRecord) -> ModelResult<Probability> {
        record.check_invariants(self.config.schema())?;
        self.score(record)
    }

    /// Scores in parallel. Results are in input order and identical to
    /// scoring one by one; the first error aborts the batch.
    pub fn score_batch(&self, records: &[FeatureRecord]) -> ModelResult<Vec<Probability>> {
        records.par_iter().map(|r| self.score(r)).collect()
    }

    /// Per-feature contributions, largest absolute contribution first.
    pub fn explain(&self, record: &FeatureRecord) -> ModelResult<Vec<FeatureContribution>> {
        let raw = self.assemble(record)?;
        let mut z = raw.clone();
        standardize(&self.config, &mut z);

        let mut contributions: Vec<FeatureContribution> = self
            .config
            .coefficients()
            .enumerate()
            .map(|(i, (feature, coefficient))| FeatureContribution {
                feature: feature.to_string(),
                raw_value: raw[i],
                standardized: z[i],
                coefficient,
                contribution: coefficient * z[i],
                share: 0.0,
            })
            .collect();

        let total: f64 = contributions.iter().map(|c| c.contribution.abs()).sum();
        if total > 0.0 {
            for c in &mut contributions {
                c.share = c.contribution.abs() / total;
            }
        }
        contributions.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        Ok(contributions)
    }

    /// Coefficient of the dummy `value` resolves to; 0 for the reference.
    pub fn category_effect(&self, field: &str, value: &str) -> ModelResult<f64> {
        let slot = self
            .config
            .categorical(field)
            .ok_or_else(|| ModelError::UnknownCategory {
                field: field.to_string(),
                value: value.to_string(),
            })?;
        Ok(encoding::resolve(slot, value)?
            .map(|i| self.config.coefficient_slice()[i])
            .unwrap_or(0.0))
    }
}

fn standardize(config: &ModelConfig, x: &mut [f64]) {
    for ((v, m), s) in x.iter_mut().zip(config.mean()).zip(config.scale()) {
        *v = (*v - m) / s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_stays_inside_unit_interval() {
        for z in [-1e6, -800.0, -40.0, 0.0, 40.0, 800.0, 1e6] {
            let p = sigmoid(z);
            assert!(p > 0.0 && p < 1.0, "sigmoid({z}) = {p}");
        }
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(ProbabilityBand::of(0.15), ProbabilityBand::Low);
        assert_eq!(ProbabilityBand::of(0.3), ProbabilityBand::Below);
        assert_eq!(ProbabilityBand::of(0.5), ProbabilityBand::Likely);
        assert_eq!(ProbabilityBand::of(0.8), ProbabilityBand::High);
        assert_eq!(ProbabilityBand::of(0.9), ProbabilityBand::Saturated);
    }
}
