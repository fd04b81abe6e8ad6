//! Inclusion rates by demographic group.

use crate::{
    config::ModelConfig,
    encoding,
    error::{ModelError, ModelResult},
    record::FeatureRecord,
    types::Probability,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Age buckets for models that take age as a number.
const AGE_BUCKETS: [(f64, &str); 5] = [
    (25.0, "18-24"),
    (35.0, "25-34"),
    (45.0, "35-44"),
    (55.0, "45-54"),
    (65.0, "55-64"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub included: usize,
    pub total:    usize,
    pub rate:     f64,
}

impl GroupStats {
    fn add(&mut self, included: bool) {
        self.total += 1;
        if included {
            self.included += 1;
        }
        self.rate = self.included as f64 / self.total as f64;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicBreakdown {
    pub gender:    BTreeMap<String, GroupStats>,
    pub location:  BTreeMap<String, GroupStats>,
    pub age_group: BTreeMap<String, GroupStats>,
    pub state:     BTreeMap<String, GroupStats>,
}

/// Group `probabilities` (aligned with `population`) by gender, location,
/// age group and state. Records without a value for a dimension are left
/// out of that dimension only.
pub fn by_group(
    config: &ModelConfig,
    population: &[FeatureRecord],
    probabilities: &[Probability],
    threshold: f64,
) -> ModelResult<DemographicBreakdown> {
    if population.len() != probabilities.len() {
        return Err(ModelError::LengthMismatch {
            expected: population.len(),
            actual:   probabilities.len(),
        });
    }

    let mut out = DemographicBreakdown::default();
    for (record, &p) in population.iter().zip(probabilities) {
        let included = p >= threshold;

        if let Some(male) = record.get("gender_male") {
            let key = if male >= 0.5 { "male" } else { "female" };
            out.gender.entry(key.into()).or_default().add(included);
        }
        if let Some(urban) = record.get("urban") {
            let key = if urban >= 0.5 { "urban" } else { "rural" };
            out.location.entry(key.into()).or_default().add(included);
        }
        if let Some(group) = age_group(config, record)? {
            out.age_group.entry(group).or_default().add(included);
        }
        if let Some(raw) = record.state.as_deref() {
            let key = match config.categorical("state") {
                Some(slot) => encoding::canonical_level(slot, raw).unwrap_or_else(|_| raw.to_string()),
                None => raw.to_string(),
            };
            out.state.entry(key).or_default().add(included);
        }
    }
    Ok(out)
}

fn age_group(config: &ModelConfig, record: &FeatureRecord) -> ModelResult<Option<String>> {
    if let Some(raw) = record.age_group.as_deref() {
        return match config.categorical("age_group") {
            Some(slot) => encoding::canonical_level(slot, raw).map(Some),
            None => Ok(Some(raw.to_string())),
        };
    }
    Ok(record.get("Age_numeric").map(|age| {
        AGE_BUCKETS
            .iter()
            .find(|(upper, _)| age < *upper)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| "65+".to_string())
    }))
}
