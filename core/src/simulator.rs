//! Population policy simulator.
//!
//! Flow per call:
//!   1. Score the population as given (baseline).
//!   2. Plan: clamp targets, keep only levers that moved beyond tolerance.
//!   3. No lever moved (or nobody to simulate): return baseline as projected.
//!   4. Otherwise perturb clones with the changed levers, re-score, count.
//!   5. Optionally attribute the delta to each lever by leave-one-out,
//!      averaged over `attribution_trials` seeded trials.
//!
//! RULE: the population is only ever read. Every perturbed record is a clone.

use crate::{
    config::SimulatorConfig,
    error::ModelResult,
    perturbation,
    policy::{self, BaselineLevels, Lever, LeverPlan, PolicyTargets},
    record::FeatureRecord,
    rng::RngBank,
    scorer::Scorer,
    types::{Probability, TrialIndex},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSummary {
    pub count:           usize,
    pub rate:            f64,
    /// `rate` rescaled onto the survey baseline, capped at 1.
    pub calibrated_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub delta_percentage_points: f64,
    /// Below threshold at baseline, at or above after perturbation.
    pub newly_included:          usize,
    /// At or above threshold at baseline, below after. Never netted.
    pub newly_excluded:          usize,
    /// `newly_included` as a percentage of the population.
    pub percent_affected:        f64,
}

/// Leave-one-out estimate of one lever's share of the combined delta.
/// Approximate attribution: contributions need not sum to the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverContribution {
    pub lever:                   Lever,
    pub delta_percentage_points: f64,
    pub std_error:               f64,
    pub trials:                  u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub model:              String,
    pub population:         usize,
    pub baseline:           RateSummary,
    pub projected:          RateSummary,
    /// Label-based inclusion rate, when the population carries labels.
    pub observed_rate:      Option<f64>,
    pub impact:             Impact,
    pub levels:             BaselineLevels,
    pub targets:            BTreeMap<Lever, f64>,
    pub changed_levers:     Vec<Lever>,
    pub clamped_levers:     Vec<Lever>,
    pub unsupported_levers: Vec<Lever>,
    /// True when change detection short-circuited the perturbation pass.
    pub skipped:            bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lever_contributions: Option<Vec<LeverContribution>>,
    /// Projected per-record probabilities, in population order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions:        Option<Vec<Probability>>,
}

/// Scores and levels of an unmodified population.
#[derive(Debug, Clone)]
pub struct Baseline {
    pub probabilities: Vec<Probability>,
    pub summary:       RateSummary,
    pub levels:        BaselineLevels,
}

struct TrialOutcome {
    probabilities: Vec<Probability>,
    summary:       RateSummary,
    impact:        Impact,
}

// ── Simulator ────────────────────────────────────────────────────────────────

pub struct PopulationSimulator {
    scorer: Scorer,
    config: SimulatorConfig,
    bank:   RngBank,
}

impl PopulationSimulator {
    pub fn new(scorer: Scorer, config: SimulatorConfig) -> Self {
        let bank = RngBank::new(config.seed);
        Self { scorer, config, bank }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn baseline(&self, population: &[FeatureRecord]) -> ModelResult<Baseline> {
        let probabilities = self.scorer.score_batch(population)?;
        let summary = self.summarize(&probabilities);
        let levels = BaselineLevels::measure(self.scorer.config(), population);
        log::info!(
            "baseline: model={} population={} included={} rate={:.4}",
            self.scorer.config().label(),
            population.len(),
            summary.count,
            summary.rate
        );
        Ok(Baseline {
            probabilities,
            summary,
            levels,
        })
    }

    pub fn simulate(&self, population: &[FeatureRecord], targets: &PolicyTargets) -> ModelResult<SimulationResult> {
        self.run(population, targets, false)
    }

    pub fn simulate_with_contributions(
        &self,
        population: &[FeatureRecord],
        targets: &PolicyTargets,
    ) -> ModelResult<SimulationResult> {
        self.run(population, targets, true)
    }

    fn run(
        &self,
        population: &[FeatureRecord],
        targets: &PolicyTargets,
        contributions: bool,
    ) -> ModelResult<SimulationResult> {
        let baseline = self.baseline(population)?;
        let plan = policy::plan(
            self.scorer.config(),
            targets,
            &baseline.levels,
            &self.config.tolerances,
        );
        let skipped = population.is_empty() || plan.is_noop();

        let (projected, impact, projected_probabilities) = if skipped {
            log::info!(
                "simulate: nothing to perturb (population={}, changed levers={}), projected = baseline",
                population.len(),
                plan.changed.len()
            );
            (baseline.summary.clone(), Impact::default(), baseline.probabilities.clone())
        } else {
            let outcome = self.run_trial(population, &plan, &baseline, &plan.changed, 0)?;
            log::info!(
                "simulate: levers={:?} projected={} delta={:+.2}pp newly_included={} newly_excluded={}",
                plan.changed,
                outcome.summary.count,
                outcome.impact.delta_percentage_points,
                outcome.impact.newly_included,
                outcome.impact.newly_excluded
            );
            (outcome.summary, outcome.impact, outcome.probabilities)
        };

        let lever_contributions = if contributions && !skipped {
            Some(self.attribute(population, &plan, &baseline)?)
        } else if contributions {
            Some(Vec::new())
        } else {
            None
        };

        Ok(SimulationResult {
            model: self.scorer.config().label().to_string(),
            population: population.len(),
            baseline: baseline.summary.clone(),
            projected,
            observed_rate: baseline.levels.observed_rate,
            impact,
            levels: baseline.levels.clone(),
            targets: plan.targets.clone(),
            changed_levers: plan.changed.clone(),
            clamped_levers: plan.clamped.clone(),
            unsupported_levers: plan.unsupported.clone(),
            skipped,
            lever_contributions,
            predictions: self.config.keep_predictions.then_some(projected_probabilities),
        })
    }

    /// One perturbation pass with `levers` on trial `trial`'s streams.
    fn run_trial(
        &self,
        population: &[FeatureRecord],
        plan: &LeverPlan,
        baseline: &Baseline,
        levers: &[Lever],
        trial: TrialIndex,
    ) -> ModelResult<TrialOutcome> {
        if levers.is_empty() {
            return Ok(TrialOutcome {
                probabilities: baseline.probabilities.clone(),
                summary:       baseline.summary.clone(),
                impact:        Impact::default(),
            });
        }

        let perturbed = perturbation::perturb_population(
            self.scorer.config(),
            &self.config.levers,
            plan,
            &baseline.levels,
            population,
            levers,
            &self.bank,
            trial,
        );
        let probabilities = self.scorer.score_batch(&perturbed)?;
        let summary = self.summarize(&probabilities);
        let impact = self.impact(&baseline.probabilities, &baseline.summary, &probabilities, &summary);
        Ok(TrialOutcome {
            probabilities,
            summary,
            impact,
        })
    }

    fn attribute(
        &self,
        population: &[FeatureRecord],
        plan: &LeverPlan,
        baseline: &Baseline,
    ) -> ModelResult<Vec<LeverContribution>> {
        let trials = self.config.attribution_trials.max(1);
        let mut samples: BTreeMap<Lever, Vec<f64>> = BTreeMap::new();

        for trial in 0..trials {
            let combined = self
                .run_trial(population, plan, baseline, &plan.changed, trial)?
                .impact
                .delta_percentage_points;
            for &lever in &plan.changed {
                let others: Vec<Lever> = plan.changed.iter().copied().filter(|l| *l != lever).collect();
                let without = self
                    .run_trial(population, plan, baseline, &others, trial)?
                    .impact
                    .delta_percentage_points;
                samples.entry(lever).or_default().push(combined - without);
            }
        }

        let contributions: Vec<LeverContribution> = samples
            .into_iter()
            .map(|(lever, deltas)| {
                let (mean, std_error) = mean_and_std_error(&deltas);
                log::debug!(
                    "attribution: lever={} contribution={mean:+.3}pp se={std_error:.3} trials={trials}",
                    lever.name()
                );
                LeverContribution {
                    lever,
                    delta_percentage_points: mean,
                    std_error,
                    trials,
                }
            })
            .collect();
        Ok(contributions)
    }

    fn summarize(&self, probabilities: &[Probability]) -> RateSummary {
        let count = probabilities
            .iter()
            .filter(|&&p| p >= self.config.inclusion_threshold)
            .count();
        let rate = if probabilities.is_empty() {
            0.0
        } else {
            count as f64 / probabilities.len() as f64
        };
        RateSummary {
            count,
            rate,
            calibrated_rate: self.scorer.config().calibration().map(|c| c.apply(rate)),
        }
    }

    fn impact(
        &self,
        before: &[Probability],
        before_summary: &RateSummary,
        after: &[Probability],
        after_summary: &RateSummary,
    ) -> Impact {
        let threshold = self.config.inclusion_threshold;
        let (mut newly_included, mut newly_excluded) = (0, 0);
        for (b, a) in before.iter().zip(after) {
            match (*b >= threshold, *a >= threshold) {
                (false, true) => newly_included += 1,
                (true, false) => newly_excluded += 1,
                _ => {}
            }
        }
        let n = before.len();
        Impact {
            delta_percentage_points: (after_summary.rate - before_summary.rate) * 100.0,
            newly_included,
            newly_excluded,
            percent_affected: if n == 0 {
                0.0
            } else {
                newly_included as f64 / n as f64 * 100.0
            },
        }
    }
}

fn mean_and_std_error(samples: &[f64]) -> (f64, f64) {
    let n = samples.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, (variance / n as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_error_of_constant_samples_is_zero() {
        let (mean, se) = mean_and_std_error(&[1.5; 10]);
        assert!((mean - 1.5).abs() < 1e-12);
        assert_eq!(se, 0.0);
    }
}
