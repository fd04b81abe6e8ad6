//! Policy levers, targets and change detection.
//!
//! RULE: targets are clamped into their lever's domain before anything
//! compares or applies them. A lever only takes part in a simulation when
//! its clamped target moved beyond tolerance from the population's
//! current level (or, for toggle levers, when switched on).

use crate::{
    config::{ChangeTolerances, ModelConfig},
    record::FeatureRecord,
    rng::StreamSlot,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Levers ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lever {
    NationalId,
    DigitalAccess,
    Education,
    Wealth,
    Infrastructure,
    Income,
    Urbanization,
    SavingsPromotion,
    IncomeDiversification,
}

/// Inclusive range a lever's target is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeverDomain {
    pub min: f64,
    pub max: f64,
}

impl LeverDomain {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

impl Lever {
    pub const ALL: [Lever; 9] = [
        Lever::NationalId,
        Lever::DigitalAccess,
        Lever::Education,
        Lever::Wealth,
        Lever::Infrastructure,
        Lever::Income,
        Lever::Urbanization,
        Lever::SavingsPromotion,
        Lever::IncomeDiversification,
    ];

    pub fn name(&self) -> &'static str {
        match self {
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

    /// The feature this lever moves (the savings master flag and the
    /// income feature for the two toggle levers).
    pub fn feature(&self) -> &'static str {
        match self {
            Self::NationalId => "Has_NIN",
            Self::DigitalAccess => "Digital_Access_Index",
            Self::Education => "education_numeric",
            Self::Wealth => "wealth_numeric",
            Self::Infrastructure => "Infrastructure_Access_Index",
            Self::Income | Self::IncomeDiversification => "income_numeric",
            Self::Urbanization => "urban",
            Self::SavingsPromotion => "Saves_Money",
        }
    }

    pub fn is_toggle(&self) -> bool {
        matches!(self, Self::SavingsPromotion | Self::IncomeDiversification)
    }

    /// Levels and targets are percentages of the population, not means.
    pub fn is_percentage(&self) -> bool {
        matches!(self, Self::NationalId | Self::Urbanization)
    }

    pub fn domain(&self) -> Option<LeverDomain> {
        let (min, max) = match self {
            Self::NationalId | Self::Urbanization => (0.0, 100.0),
            Self::DigitalAccess => (0.0, 2.0),
            Self::Education => (0.0, 3.0),
            Self::Wealth => (1.0, 5.0),
            Self::Infrastructure => (0.0, 12.0),
            Self::Income => (0.0, f64::INFINITY),
            Self::SavingsPromotion | Self::IncomeDiversification => return None,
        };
        Some(LeverDomain { min, max })
    }

    pub fn tolerance(&self, tolerances: &ChangeTolerances) -> f64 {
        match self {
            Self::NationalId | Self::Urbanization => tolerances.coverage_pct,
            Self::Income => tolerances.income,
            Self::SavingsPromotion | Self::IncomeDiversification => 0.0,
            _ => tolerances.level,
        }
    }

    pub fn stream_slot(&self) -> StreamSlot {
        match self {
            Self::NationalId => StreamSlot::NationalId,
            Self::DigitalAccess => StreamSlot::DigitalAccess,
            Self::Education => StreamSlot::Education,
            Self::Wealth => StreamSlot::Wealth,
            Self::Infrastructure => StreamSlot::Infrastructure,
            Self::Income => StreamSlot::Income,
            Self::Urbanization => StreamSlot::Urbanization,
            Self::SavingsPromotion => StreamSlot::SavingsPromotion,
            Self::IncomeDiversification => StreamSlot::IncomeDiversification,
        }
    }

    /// Uniform draws consumed per record, whether or not it qualifies.
    pub fn draws_per_record(&self) -> usize {
        match self {
            Self::SavingsPromotion => 4,
            _ => 1,
        }
    }

    /// Whether the active model has the features this lever moves.
    pub fn is_supported(&self, config: &ModelConfig) -> bool {
        let schema = config.schema();
        match self {
            Self::SavingsPromotion => schema.savings_master.is_some(),
            Self::IncomeDiversification => {
                schema.income_feature.is_some() && !schema.income_sources.is_empty()
            }
            _ => config.has_feature(self.feature()) && !config.is_derived(self.feature()),
        }
    }
}

// ── Targets ──────────────────────────────────────────────────────────────────

/// Requested policy. Absent sliders and switched-off toggles request nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTargets {
    /// Percent of the population holding a national ID.
    pub national_id_coverage:   Option<f64>,
    /// Mean digital-access tier.
    pub digital_access:         Option<f64>,
    pub education:              Option<f64>,
    pub wealth:                 Option<f64>,
    pub infrastructure:         Option<f64>,
    pub income:                 Option<f64>,
    /// Percent of the population living in urban areas.
    pub urbanization:           Option<f64>,
    pub savings_promotion:      bool,
    pub income_diversification: bool,
}

impl PolicyTargets {
    pub fn target(&self, lever: Lever) -> Option<f64> {
        match lever {
            Lever::NationalId => self.national_id_coverage,
            Lever::DigitalAccess => self.digital_access,
            Lever::Education => self.education,
            Lever::Wealth => self.wealth,
            Lever::Infrastructure => self.infrastructure,
            Lever::Income => self.income,
            Lever::Urbanization => self.urbanization,
            Lever::SavingsPromotion => self.savings_promotion.then_some(1.0),
            Lever::IncomeDiversification => self.income_diversification.then_some(1.0),
        }
    }

    /// For toggle levers any `Some` switches the lever on.
    pub fn set_target(&mut self, lever: Lever, value: Option<f64>) {
        match lever {
            Lever::NationalId => self.national_id_coverage = value,
            Lever::DigitalAccess => self.digital_access = value,
            Lever::Education => self.education = value,
            Lever::Wealth => self.wealth = value,
            Lever::Infrastructure => self.infrastructure = value,
            Lever::Income => self.income = value,
            Lever::Urbanization => self.urbanization = value,
            Lever::SavingsPromotion => self.savings_promotion = value.is_some(),
            Lever::IncomeDiversification => self.income_diversification = value.is_some(),
        }
    }

    pub fn with_target(mut self, lever: Lever, value: f64) -> Self {
        self.set_target(lever, Some(value));
        self
    }
}

// ── Current levels ───────────────────────────────────────────────────────────

/// The population's current position on every supported slider lever.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineLevels {
    pub population:    usize,
    pub levels:        BTreeMap<Lever, f64>,
    /// Share of labelled records observed as included, when labels exist.
    pub observed_rate: Option<f64>,
}

impl BaselineLevels {
    pub fn measure(config: &ModelConfig, population: &[FeatureRecord]) -> Self {
        let n = population.len();
        let mut levels = BTreeMap::new();
        for lever in Lever::ALL.iter().filter(|l| !l.is_toggle() && l.is_supported(config)) {
            let mean = if n == 0 {
                0.0
            } else {
                population.iter().map(|r| r.value_or_zero(lever.feature())).sum::<f64>() / n as f64
            };
            let level = if lever.is_percentage() { mean * 100.0 } else { mean };
            levels.insert(*lever, level);
        }

        let labelled: Vec<bool> = population.iter().filter_map(|r| r.formally_included).collect();
        let observed_rate = (!labelled.is_empty())
            .then(|| labelled.iter().filter(|&&l| l).count() as f64 / labelled.len() as f64);

        Self {
            population: n,
            levels,
            observed_rate,
        }
    }

    pub fn level(&self, lever: Lever) -> Option<f64> {
        self.levels.get(&lever).copied()
    }

    /// The target set that requests no change.
    pub fn as_targets(&self) -> PolicyTargets {
        let mut targets = PolicyTargets::default();
        for (lever, level) in &self.levels {
            targets.set_target(*lever, Some(*level));
        }
        targets
    }
}

// ── Change detection ─────────────────────────────────────────────────────────

/// Which levers a simulation applies, and at what clamped target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeverPlan {
    pub targets:     BTreeMap<Lever, f64>,
    pub changed:     Vec<Lever>,
    pub clamped:     Vec<Lever>,
    pub unsupported: Vec<Lever>,
}

impl LeverPlan {
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn target(&self, lever: Lever) -> f64 {
        self.targets.get(&lever).copied().unwrap_or(0.0)
    }
}

pub fn plan(
    config: &ModelConfig,
    targets: &PolicyTargets,
    levels: &BaselineLevels,
    tolerances: &ChangeTolerances,
) -> LeverPlan {
    let mut plan = LeverPlan::default();

    for lever in Lever::ALL {
        let Some(raw) = targets.target(lever) else { continue };
        if !raw.is_finite() {
            log::warn!("policy: ignoring non-finite target {raw} for {}", lever.name());
            continue;
        }
        if !lever.is_supported(config) {
            log::warn!(
                "policy: lever {} is not supported by model '{}', ignoring",
                lever.name(),
                config.label()
            );
            plan.unsupported.push(lever);
            continue;
        }

        let target = match lever.domain() {
            Some(domain) => {
                let clamped = domain.clamp(raw);
                if clamped != raw {
                    log::warn!(
                        "policy: {} target {raw} clamped to {clamped} [{}, {}]",
                        lever.name(),
                        domain.min,
                        domain.max
                    );
                    plan.clamped.push(lever);
                }
                clamped
            }
            None => raw,
        };

        let changed = if lever.is_toggle() {
            true
        } else {
            let current = levels.level(lever).unwrap_or(0.0);
            (target - current).abs() > lever.tolerance(tolerances)
        };

        if changed {
            log::debug!("policy: {} changed to {target}", lever.name());
            plan.targets.insert(lever, target);
            plan.changed.push(lever);
        }
    }

    plan
}
