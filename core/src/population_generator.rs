//! Synthetic survey-like populations.
//!
//! Records carry exactly the base features the active model requires,
//! are reconciled against its schema, and are labelled by a Bernoulli
//! draw on their own model probability.

use crate::{
    error::ModelResult,
    record::FeatureRecord,
    rng::SimRng,
    scorer::Scorer,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
    pub size:              usize,
    pub male_share:        f64,
    pub urban_share:       f64,
    pub national_id_share: f64,
    pub saves_share:       f64,
    /// Share with no income at all.
    pub zero_income_share: f64,
    pub income_min:        f64,
    pub income_alpha:      f64,
    pub income_cap:        f64,
    /// Weights over education levels 0..=3.
    pub education_weights: Vec<f64>,
    /// Weights over wealth quintiles 1..=5.
    pub wealth_weights:    Vec<f64>,
    /// Weights over digital-access tiers 0..=2.
    pub digital_weights:   Vec<f64>,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            size:              1_000,
            male_share:        0.5,
            urban_share:       0.38,
            national_id_share: 0.55,
            saves_share:       0.5,
            zero_income_share: 0.2,
            income_min:        3_000.0,
            income_alpha:      1.6,
            income_cap:        2_000_000.0,
            education_weights: vec![0.30, 0.25, 0.30, 0.15],
            wealth_weights:    vec![0.2, 0.2, 0.2, 0.2, 0.2],
            digital_weights:   vec![0.35, 0.40, 0.25],
        }
    }
}

impl GeneratorParams {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}

pub fn generate(scorer: &Scorer, params: &GeneratorParams, rng: &mut SimRng) -> ModelResult<Vec<FeatureRecord>> {
    let config = scorer.config();
    let state_levels: Vec<String> = level_names(config.categorical("state"));
    let age_levels: Vec<String> = level_names(config.categorical("age_group"));
    let mut population = Vec::with_capacity(params.size);

    for _ in 0..params.size {
        let attributes = draw_attributes(params, rng);

        let mut record = FeatureRecord::new();
        for feature in config.required_features() {
            let value = match attributes.get(feature) {
                Some(v) => *v,
                None => config
                    .feature_index(feature)
                    .map(|i| config.mean()[i])
                    .unwrap_or(0.0),
            };
            record.insert(feature, value);
        }
        if !state_levels.is_empty() {
            let i = rng.next_u64_below(state_levels.len() as u64) as usize;
            record.state = Some(state_levels[i].clone());
        }
        if !age_levels.is_empty() {
            let i = rng.next_u64_below(age_levels.len() as u64) as usize;
            record.age_group = Some(age_levels[i].clone());
        }
        record.reconcile(config.schema());

        let p = scorer.score(&record)?;
        record.formally_included = Some(rng.chance(p));
        population.push(record);
    }

    log::info!(
        "generator: {} records for model '{}' ({} labelled included)",
        population.len(),
        config.label(),
        population.iter().filter(|r| r.formally_included == Some(true)).count()
    );
    Ok(population)
}

/// Reference level first, then every dummy level.
fn level_names(slot: Option<&crate::config::CategoricalSlot>) -> Vec<String> {
    slot.map(|s| {
        std::iter::once(s.reference().to_string())
            .chain(s.levels().map(str::to_string))
            .collect()
    })
    .unwrap_or_default()
}

/// One person's raw attributes under every feature name any model uses.
fn draw_attributes(params: &GeneratorParams, rng: &mut SimRng) -> BTreeMap<&'static str, f64> {
    let mut a = BTreeMap::new();

    a.insert("gender_male", flag(rng, params.male_share));
    a.insert("urban", flag(rng, params.urban_share));
    a.insert("Age_numeric", 18.0 + rng.next_u64_below(62) as f64);
    a.insert("education_numeric", rng.weighted_index(&params.education_weights) as f64);
    a.insert("wealth_numeric", 1.0 + rng.weighted_index(&params.wealth_weights) as f64);
    a.insert("Digital_Access_Index", rng.weighted_index(&params.digital_weights) as f64);
    a.insert("Infrastructure_Access_Index", rng.next_u64_below(13) as f64);
    a.insert("Has_NIN", flag(rng, params.national_id_share));

    let income = if rng.chance(params.zero_income_share) {
        0.0
    } else {
        rng.pareto(params.income_min, params.income_alpha)
            .min(params.income_cap)
            .round()
    };
    a.insert("income_numeric", income);
    a.insert("Formal_Employment", flag(rng, 0.2));
    a.insert("Business_Income", flag(rng, 0.45));
    a.insert("Agricultural_Income", flag(rng, 0.3));
    a.insert("Passive_Income", flag(rng, 0.05));

    let shortage = 1.0 + rng.weighted_index(&[0.2, 0.3, 0.3, 0.2]) as f64;
    a.insert("money_shortage_frequency", shortage);
    a.insert("runs_out_of_money", if shortage >= 3.0 { 1.0 } else { 0.0 });

    let saves = rng.chance(params.saves_share);
    let regular = saves && rng.chance(0.4);
    let informal = saves && rng.chance(0.5);
    let diverse = saves && rng.chance(0.3);
    let frequency = if saves { 1.0 + rng.next_u64_below(4) as f64 } else { 0.0 };
    a.insert("Saves_Money", bit(saves));
    a.insert("Regular_Saver", bit(regular));
    a.insert("Informal_Savings_Mode", bit(informal));
    a.insert("Diverse_Savings_Reasons", bit(diverse));
    a.insert("savings_frequency_numeric", frequency);
    a.insert("Savings_Frequency_Score", if saves { frequency - 1.0 } else { 0.0 });
    a.insert(
        "Savings_Behavior_Score",
        if saves { 1.0 + bit(regular) + bit(informal) + bit(diverse) } else { 0.0 },
    );
    a.insert("Old_Age_Planning", flag(rng, 0.1));

    a
}

fn flag(rng: &mut SimRng, p: f64) -> f64 {
    bit(rng.chance(p))
}

fn bit(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
