//! Feature records: one person's attributes as supplied by a caller or a
//! population file.
//!
//! RULE: a record that reaches the scorer satisfies the schema's
//! invariants. Income above zero needs at least one income source, zero
//! income clears every source, and the savings master flag gates every
//! dependent savings attribute. Editors go through `set`, loaders go
//! through `reconcile`, strict callers go through `check_invariants`.
//!
//! Derived features (diversity score, interaction terms) are never
//! stored here for scoring purposes. The scorer recomputes them.

use crate::{
    config::{ModelConfig, RecordSchema},
    error::{ModelError, ModelResult},
    types::FeatureName,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state:             Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group:         Option<String>,
    /// Observed survey label, when the record came from survey data.
    #[serde(rename = "Formally_Included", default, skip_serializing_if = "Option::is_none")]
    pub formally_included: Option<bool>,
    #[serde(flatten)]
    values:                BTreeMap<FeatureName, f64>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `insert`. No cascades.
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    pub fn with_age_group(mut self, age_group: &str) -> Self {
        self.age_group = Some(age_group.to_string());
        self
    }

    pub fn with_label(mut self, included: bool) -> Self {
        self.formally_included = Some(included);
        self
    }

    /// Raw write. Bypasses the cascades `set` applies.
    pub fn insert(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn value_or_zero(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Raw categorical value for a field (`state`, `age_group`).
    pub fn categorical(&self, field: &str) -> Option<&str> {
        match field {
            "state" => self.state.as_deref(),
            "age_group" => self.age_group.as_deref(),
            _ => None,
        }
    }

    /// Returns false for a field records do not carry.
    pub fn set_categorical(&mut self, field: &str, value: Option<String>) -> bool {
        match field {
            "state" => self.state = value,
            "age_group" => self.age_group = value,
            _ => return false,
        }
        true
    }

    fn flag(&self, name: &str) -> bool {
        self.value_or_zero(name) >= 0.5
    }

    fn income(&self, schema: &RecordSchema) -> f64 {
        schema
            .income_feature
            .as_deref()
            .map(|f| self.value_or_zero(f))
            .unwrap_or(0.0)
    }

    fn savings_enabled(&self, schema: &RecordSchema) -> bool {
        schema.savings_master.as_deref().map_or(true, |m| self.flag(m))
    }

    /// Number of enabled income-source flags.
    pub fn income_diversity(&self, schema: &RecordSchema) -> f64 {
        schema.income_sources.iter().filter(|s| self.flag(s)).count() as f64
    }

    /// Edit one feature the way the individual-mode editor does, applying
    /// the schema cascades. Returns false, leaving the record untouched,
    /// when the edit would break an invariant that has no cascade.
    pub fn set(&mut self, schema: &RecordSchema, name: &str, value: f64) -> bool {
        if !value.is_finite() {
            log::warn!("record: refusing non-finite value {value} for '{name}'");
            return false;
        }

        if schema.income_feature.as_deref() == Some(name) {
            let value = value.max(0.0);
            self.insert(name, value);
            if value <= 0.0 {
                for source in &schema.income_sources {
                    self.insert(source, 0.0);
                }
            } else if self.income_diversity(schema) == 0.0 {
                if let Some(source) = default_source(schema) {
                    self.insert(source, 1.0);
                }
            }
            return true;
        }

        if schema.is_income_source(name) {
            let enabling = value >= 0.5;
            let income = self.income(schema);
            if enabling && income <= 0.0 {
                return false;
            }
            if !enabling && income > 0.0 {
                let others = schema
                    .income_sources
                    .iter()
                    .filter(|s| s.as_str() != name && self.flag(s))
                    .count();
                if others == 0 {
                    return false;
                }
            }
            self.insert(name, if enabling { 1.0 } else { 0.0 });
            return true;
        }

        if schema.savings_master.as_deref() == Some(name) {
            self.insert(name, value);
            if value < 0.5 {
                for dependent in &schema.savings_dependents {
                    self.insert(dependent, 0.0);
                }
            }
            return true;
        }

        if schema.is_savings_dependent(name) && value != 0.0 && !self.savings_enabled(schema) {
            return false;
        }

        self.insert(name, value);
        true
    }

    /// Auto-correct into the invariant-satisfying form. Returns true when
    /// anything changed.
    pub fn reconcile(&mut self, schema: &RecordSchema) -> bool {
        let mut changed = false;

        if let Some(income_feature) = schema.income_feature.as_deref() {
            if !schema.income_sources.is_empty() {
                let income = self.value_or_zero(income_feature);
                if income <= 0.0 {
                    if income < 0.0 {
                        self.insert(income_feature, 0.0);
                        changed = true;
                    }
                    for source in &schema.income_sources {
                        if self.value_or_zero(source) != 0.0 {
                            self.insert(source, 0.0);
                            changed = true;
                        }
                    }
                } else if self.income_diversity(schema) == 0.0 {
                    if let Some(source) = default_source(schema) {
                        self.insert(source, 1.0);
                        changed = true;
                    }
                }
            }
        }

        if !self.savings_enabled(schema) {
            for dependent in &schema.savings_dependents {
                if self.value_or_zero(dependent) != 0.0 {
                    self.insert(dependent, 0.0);
                    changed = true;
                }
            }
        }

        changed
    }

    /// Reject a record that breaks an invariant instead of correcting it.
    pub fn check_invariants(&self, schema: &RecordSchema) -> ModelResult<()> {
        if !schema.income_sources.is_empty() {
            let income = self.income(schema);
            let diversity = self.income_diversity(schema);
            if income > 0.0 && diversity == 0.0 {
                return Err(ModelError::invariant(format!(
                    "income is {income} but no income source is enabled"
                )));
            }
            if income <= 0.0 && diversity > 0.0 {
                return Err(ModelError::invariant(format!(
                    "income is {income} but {diversity} income source(s) are enabled"
                )));
            }
        }

        if !self.savings_enabled(schema) {
            if let Some(dependent) = schema
                .savings_dependents
                .iter()
                .find(|d| self.value_or_zero(d) != 0.0)
            {
                return Err(ModelError::invariant(format!(
                    "'{dependent}' is set while the savings master flag is off"
                )));
            }
        }

        Ok(())
    }

    /// Build a record from one flat survey row. One-hot dummies of any
    /// configured categorical are lifted back into the categorical field;
    /// booleans become 0/1; strings other than the categorical fields are
    /// ignored.
    pub fn from_survey_row(config: &ModelConfig, row: &Map<String, Value>) -> ModelResult<Self> {
        let mut record = FeatureRecord::new();

        'keys: for (key, value) in row {
            match key.as_str() {
                "Formally_Included" | "formally_included" => {
                    record.formally_included = match value {
                        Value::Bool(b) => Some(*b),
                        Value::Number(n) => n.as_f64().map(|v| v >= 0.5),
                        Value::Null => None,
                        other => {
                            return Err(ModelError::invariant(format!(
                                "Formally_Included must be a bool or number, got {other}"
                            )))
                        }
                    };
                    continue;
                }
                "state" | "State" | "age_group" | "Age_Group" => {
                    // Blank survey cells mean "not answered".
                    if let Some(s) = value.as_str().filter(|s| !s.trim().is_empty()) {
                        record.set_categorical(&key.to_ascii_lowercase(), Some(s.to_string()));
                    }
                    continue;
                }
                _ => {}
            }

            for slot in config.categoricals() {
                if let Some(level) = key.strip_prefix(slot.spec().prefix.as_str()) {
                    if value.as_f64().is_some_and(|v| v >= 0.5) && record.categorical(slot.field()).is_none() {
                        record.set_categorical(slot.field(), Some(level.to_string()));
                    }
                    continue 'keys;
                }
            }

            match value {
                Value::Number(n) => {
                    if let Some(v) = n.as_f64() {
                        record.insert(key, v);
                    }
                }
                Value::Bool(b) => record.insert(key, if *b { 1.0 } else { 0.0 }),
                _ => {}
            }
        }

        Ok(record)
    }
}

fn default_source(schema: &RecordSchema) -> Option<&str> {
    schema
        .default_income_source
        .as_deref()
        .or_else(|| schema.income_sources.first().map(String::as_str))
}
