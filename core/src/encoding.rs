//! Categorical encoding: raw state / age-group names to one-hot dummies.
//!
//! RULE: an absent value means the reference level (all dummies zero).
//! A present value that matches neither a level, an alias nor the
//! reference is an error, never a silent fallback. A blank string is
//! present, so it is an error too; loaders map blank cells to absent.

use crate::{
    config::{CategoricalSlot, ModelConfig},
    error::{ModelError, ModelResult},
    record::FeatureRecord,
};

/// Canonical spelling used for matching: whitespace collapsed, uppercased.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

/// The canonical level name for `raw` (the reference included).
pub fn canonical_level(slot: &CategoricalSlot, raw: &str) -> ModelResult<String> {
    let normalized = normalize_label(raw);
    let level = slot
        .alias_target(&normalized)
        .map(str::to_string)
        .unwrap_or(normalized);
    if level == slot.reference() || slot.dummy_index(&level).is_some() {
        Ok(level)
    } else {
        Err(ModelError::UnknownCategory {
            field: slot.field().to_string(),
            value: raw.to_string(),
        })
    }
}

/// Dummy column for `raw`, or `None` for the reference level.
pub fn resolve(slot: &CategoricalSlot, raw: &str) -> ModelResult<Option<usize>> {
    let level = canonical_level(slot, raw)?;
    Ok(slot.dummy_index(&level))
}

/// Write every categorical's dummies for `record` into `out`.
pub fn expand_into(config: &ModelConfig, record: &FeatureRecord, out: &mut [f64]) -> ModelResult<()> {
    for slot in config.categoricals() {
        for i in slot.dummy_indices() {
            out[i] = 0.0;
        }
        if let Some(raw) = record.categorical(slot.field()) {
            if let Some(i) = resolve(slot, raw)? {
                out[i] = 1.0;
            }
        }
    }
    Ok(())
}
