//! Model and simulator configuration.
//!
//! RULE: a coefficient table, its standardisation parameters and its
//! feature order are one unit. `ModelConfig` is only built through
//! validating constructors and exposes no setters, so parts of two
//! model versions can never be mixed.

use crate::{
    encoding::normalize_label,
    error::{ModelError, ModelResult},
    model_tables::{self, RawTable},
    record::FeatureRecord,
    types::{FeatureName, INCLUSION_THRESHOLD},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

// ── Model versions ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVersion {
    /// 51 features: base attributes, continuous age, state dummies.
    StatesV2,
    /// 66 features: adds ID, digital and infrastructure access, income
    /// sources, agricultural interactions and age-group dummies.
    #[default]
    NonCircularV3,
}

impl ModelVersion {
    pub const ALL: [ModelVersion; 2] = [ModelVersion::StatesV2, ModelVersion::NonCircularV3];

    pub fn label(&self) -> &'static str {
        match self {
            Self::StatesV2 => "states_v2",
            Self::NonCircularV3 => "non_circular_v3",
        }
    }

    /// Accepts the short form (`v2`, `v3`) or the full label.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v2" | "states_v2" => Some(Self::StatesV2),
            "v3" | "non_circular_v3" => Some(Self::NonCircularV3),
            _ => None,
        }
    }

    fn raw_table(&self) -> &'static RawTable {
        match self {
            Self::StatesV2 => &model_tables::STATES_V2,
            Self::NonCircularV3 => &model_tables::NON_CIRCULAR_V3,
        }
    }

    /// The complete bundle for this version, in its external form.
    pub fn bundle(&self) -> ModelBundle {
        let raw = self.raw_table();
        let mut bundle = ModelBundle {
            label:                 self.label().to_string(),
            feature_order:         raw.feature_order.iter().map(|f| f.to_string()).collect(),
            standardization_mean:  raw.mean.to_vec(),
            standardization_scale: raw.scale.to_vec(),
            coefficients:          raw.coefficients.iter().map(|(f, c)| (f.to_string(), *c)).collect(),
            intercept:             raw.intercept,
            categoricals:          Vec::new(),
            derived:               Vec::new(),
            schema:                RecordSchema::default(),
            defaults:              BTreeMap::new(),
            default_state:         Some("LAGOS".into()),
            default_age_group:     None,
            calibration:           None,
        };

        match self {
            Self::StatesV2 => {
                bundle.categoricals.push(CategoricalSpec::new(
                    "state",
                    "state_",
                    "ABIA",
                    &[
                        ("AKWA IBOM", "AKWA-IBOM"),
                        ("CROSS-RIVER", "CROSS RIVER"),
                        ("FCT", "FCT ABUJA"),
                        ("FCT-ABUJA", "FCT ABUJA"),
                        ("ABUJA", "FCT ABUJA"),
                    ],
                ));
                bundle.schema = RecordSchema {
                    income_feature:        Some("income_numeric".into()),
                    income_sources:        Vec::new(),
                    default_income_source: None,
                    savings_master:        Some("Saves_Money".into()),
                    savings_dependents:    savings_dependents(),
                };
                bundle.defaults = defaults(&[
                    ("education_numeric", 2.0),
                    ("wealth_numeric", 3.0),
                    ("income_numeric", 31_900.0),
                    ("runs_out_of_money", 1.0),
                    ("savings_frequency_numeric", 1.0),
                    ("gender_male", 0.0),
                    ("urban", 0.0),
                    ("Age_numeric", 36.0),
                    ("Old_Age_Planning", 0.0),
                    ("Diverse_Savings_Reasons", 0.0),
                    ("Savings_Behavior_Score", 1.0),
                    ("Informal_Savings_Mode", 0.0),
                    ("Savings_Frequency_Score", 0.0),
                    ("Saves_Money", 0.0),
                    ("Regular_Saver", 0.0),
                ]);
            }
            Self::NonCircularV3 => {
                bundle.categoricals.push(CategoricalSpec::new(
                    "state",
                    "state_",
                    "ABIA",
                    &[
                        ("AKWA-IBOM", "AKWA IBOM"),
                        ("CROSS-RIVER", "CROSS RIVER"),
                        ("FCT ABUJA", "FCT"),
                        ("FCT-ABUJA", "FCT"),
                        ("ABUJA", "FCT"),
                    ],
                ));
                bundle.categoricals.push(CategoricalSpec::new("age_group", "age_", "18-24", &[]));
                bundle.derived = vec![
                    DerivedFeature::CountOf {
                        name:    "Income_Diversity_Score".into(),
                        sources: income_sources_v3(),
                    },
                    DerivedFeature::Product {
                        name:    "Ag_x_Formal".into(),
                        factors: vec!["Agricultural_Income".into(), "Formal_Employment".into()],
                    },
                    DerivedFeature::Product {
                        name:    "Ag_x_Business".into(),
                        factors: vec!["Agricultural_Income".into(), "Business_Income".into()],
                    },
                    DerivedFeature::Product {
                        name:    "Ag_x_Urban".into(),
                        factors: vec!["Agricultural_Income".into(), "urban".into()],
                    },
                ];
                bundle.schema = RecordSchema {
                    income_feature:        Some("income_numeric".into()),
                    income_sources:        income_sources_v3(),
                    default_income_source: Some("Business_Income".into()),
                    savings_master:        Some("Saves_Money".into()),
                    savings_dependents:    savings_dependents(),
                };
                bundle.defaults = defaults(&[
                    ("education_numeric", 0.0),
                    ("wealth_numeric", 1.0),
                    ("income_numeric", 5_000.0),
                    ("gender_male", 0.0),
                    ("urban", 0.0),
                    ("money_shortage_frequency", 3.0),
                    ("savings_frequency_numeric", 1.0),
                    ("Saves_Money", 0.0),
                    ("Regular_Saver", 0.0),
                    ("Informal_Savings_Mode", 0.0),
                    ("Diverse_Savings_Reasons", 0.0),
                    ("Savings_Frequency_Score", 0.0),
                    ("Savings_Behavior_Score", 1.0),
                    ("Old_Age_Planning", 0.0),
                    ("Has_NIN", 0.0),
                    ("Formal_Employment", 0.0),
                    ("Business_Income", 1.0),
                    ("Agricultural_Income", 0.0),
                    ("Passive_Income", 0.0),
                    ("Digital_Access_Index", 1.0),
                    ("Infrastructure_Access_Index", 3.0),
                ]);
                bundle.default_age_group = Some("18-24".into());
                bundle.calibration = Some(Calibration {
                    reference_rate: 0.64,
                    raw_rate:       0.6121,
                });
            }
        }
        bundle
    }
}

fn income_sources_v3() -> Vec<FeatureName> {
    ["Formal_Employment", "Business_Income", "Agricultural_Income", "Passive_Income"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn savings_dependents() -> Vec<FeatureName> {
    [
        "Regular_Saver",
        "Informal_Savings_Mode",
        "Diverse_Savings_Reasons",
        "Savings_Frequency_Score",
        "Savings_Behavior_Score",
        "savings_frequency_numeric",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn defaults(pairs: &[(&str, f64)]) -> BTreeMap<FeatureName, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

// ── Bundle: external, serde-friendly form ────────────────────────────────────

/// A categorical attribute expanded into one-hot dummies at scoring time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSpec {
    /// Record field carrying the raw value (`state`, `age_group`).
    pub field:     String,
    /// Prefix shared by every dummy feature name of this attribute.
    pub prefix:    String,
    /// Level whose dummies are implicitly all zero.
    pub reference: String,
    /// UI-facing names mapped onto the model's level names.
    #[serde(default)]
    pub aliases:   BTreeMap<String, String>,
}

impl CategoricalSpec {
    pub fn new(field: &str, prefix: &str, reference: &str, aliases: &[(&str, &str)]) -> Self {
        Self {
            field:     field.into(),
            prefix:    prefix.into(),
            reference: reference.into(),
            aliases:   aliases.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect(),
        }
    }
}

/// A feature computed from other features at assembly time, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedFeature {
    /// Number of enabled (>= 0.5) source flags.
    CountOf { name: FeatureName, sources: Vec<FeatureName> },
    /// Product of the raw factor values.
    Product { name: FeatureName, factors: Vec<FeatureName> },
}

impl DerivedFeature {
    pub fn name(&self) -> &str {
        match self {
            Self::CountOf { name, .. } | Self::Product { name, .. } => name,
        }
    }

    fn inputs(&self) -> &[FeatureName] {
        match self {
            Self::CountOf { sources, .. } => sources,
            Self::Product { factors, .. } => factors,
        }
    }
}

/// Which features take part in the record invariants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub income_feature:        Option<FeatureName>,
    #[serde(default)]
    pub income_sources:        Vec<FeatureName>,
    pub default_income_source: Option<FeatureName>,
    pub savings_master:        Option<FeatureName>,
    #[serde(default)]
    pub savings_dependents:    Vec<FeatureName>,
}

impl RecordSchema {
    pub fn is_income_source(&self, name: &str) -> bool {
        self.income_sources.iter().any(|s| s == name)
    }

    pub fn is_savings_dependent(&self, name: &str) -> bool {
        self.savings_dependents.iter().any(|s| s == name)
    }

    fn named_features(&self) -> impl Iterator<Item = &FeatureName> {
        self.income_feature
            .iter()
            .chain(self.income_sources.iter())
            .chain(self.default_income_source.iter())
            .chain(self.savings_master.iter())
            .chain(self.savings_dependents.iter())
    }
}

/// Rescales raw rates onto the survey's published baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub reference_rate: f64,
    pub raw_rate:       f64,
}

impl Calibration {
    pub fn factor(&self) -> f64 {
        self.reference_rate / self.raw_rate
    }

    pub fn apply(&self, rate: f64) -> f64 {
        (rate * self.factor()).min(1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub label:                 String,
    pub feature_order:         Vec<FeatureName>,
    pub standardization_mean:  Vec<f64>,
    pub standardization_scale: Vec<f64>,
    pub coefficients:          BTreeMap<FeatureName, f64>,
    pub intercept:             f64,
    #[serde(default)]
    pub categoricals:          Vec<CategoricalSpec>,
    #[serde(default)]
    pub derived:               Vec<DerivedFeature>,
    #[serde(default)]
    pub schema:                RecordSchema,
    #[serde(default)]
    pub defaults:              BTreeMap<FeatureName, f64>,
    #[serde(default)]
    pub default_state:         Option<String>,
    #[serde(default)]
    pub default_age_group:     Option<String>,
    #[serde(default)]
    pub calibration:           Option<Calibration>,
}

// ── Validated configuration ──────────────────────────────────────────────────

/// One categorical attribute bound to its dummy columns.
#[derive(Debug, Clone)]
pub struct CategoricalSlot {
    spec:    CategoricalSpec,
    /// Normalised level name → feature index, reference excluded.
    levels:  BTreeMap<String, usize>,
    /// Normalised alias → normalised level name.
    aliases: HashMap<String, String>,
}

impl CategoricalSlot {
    pub fn field(&self) -> &str {
        &self.spec.field
    }

    pub fn reference(&self) -> &str {
        &self.spec.reference
    }

    pub fn spec(&self) -> &CategoricalSpec {
        &self.spec
    }

    /// Non-reference levels, in name order.
    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    pub(crate) fn dummy_index(&self, level: &str) -> Option<usize> {
        self.levels.get(level).copied()
    }

    pub(crate) fn alias_target(&self, normalized: &str) -> Option<&str> {
        self.aliases.get(normalized).map(String::as_str)
    }

    pub(crate) fn dummy_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.levels.values().copied()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum DerivedSlot {
    CountOf { index: usize, sources: Vec<usize> },
    Product { index: usize, factors: Vec<usize> },
}

impl DerivedSlot {
    pub(crate) fn index(&self) -> usize {
        match self {
            Self::CountOf { index, .. } | Self::Product { index, .. } => *index,
        }
    }

    pub(crate) fn evaluate(&self, values: &[f64]) -> f64 {
        match self {
            Self::CountOf { sources, .. } => {
                sources.iter().filter(|&&i| values[i] >= 0.5).count() as f64
            }
            Self::Product { factors, .. } => factors.iter().map(|&i| values[i]).product(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    label:             String,
    version:           Option<ModelVersion>,
    feature_order:     Vec<FeatureName>,
    index:             HashMap<FeatureName, usize>,
    mean:              Vec<f64>,
    scale:             Vec<f64>,
    /// Aligned with `feature_order`.
    coefficients:      Vec<f64>,
    intercept:         f64,
    categoricals:      Vec<CategoricalSlot>,
    derived:           Vec<DerivedSlot>,
    derived_specs:     Vec<DerivedFeature>,
    required:          Vec<usize>,
    schema:            RecordSchema,
    defaults:          BTreeMap<FeatureName, f64>,
    default_state:     Option<String>,
    default_age_group: Option<String>,
    calibration:       Option<Calibration>,
}

impl ModelConfig {
    /// The built-in bundle for `version`.
    pub fn for_version(version: ModelVersion) -> ModelResult<Self> {
        let mut config = Self::from_bundle(version.bundle())?;
        config.version = Some(version);
        Ok(config)
    }

    /// Load and validate a bundle from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let bundle: ModelBundle = serde_json::from_str(&content)?;
        let config = Self::from_bundle(bundle)?;
        log::info!(
            "config: loaded model '{}' ({} features) from {}",
            config.label,
            config.feature_order.len(),
            path.as_ref().display()
        );
        Ok(config)
    }

    /// Validate a bundle. Every inconsistency is reported here,
    /// never later at score time.
    pub fn from_bundle(bundle: ModelBundle) -> ModelResult<Self> {
        let n = bundle.feature_order.len();
        if n == 0 {
            return Err(ModelError::config("feature order is empty"));
        }
        if bundle.standardization_mean.len() != n || bundle.standardization_scale.len() != n {
            return Err(ModelError::config(format!(
                "feature order has {n} entries but mean has {} and scale has {}",
                bundle.standardization_mean.len(),
                bundle.standardization_scale.len()
            )));
        }

        let mut index = HashMap::with_capacity(n);
        for (i, name) in bundle.feature_order.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(ModelError::config(format!("duplicate feature '{name}'")));
            }
        }

        for (i, name) in bundle.feature_order.iter().enumerate() {
            let (m, s) = (bundle.standardization_mean[i], bundle.standardization_scale[i]);
            if !m.is_finite() || !s.is_finite() || s <= 0.0 {
                return Err(ModelError::config(format!(
                    "invalid standardisation for '{name}': mean={m}, scale={s}"
                )));
            }
        }

        if let Some(unknown) = bundle.coefficients.keys().find(|k| !index.contains_key(*k)) {
            return Err(ModelError::config(format!(
                "coefficient for '{unknown}' which is not in the feature order"
            )));
        }
        let mut coefficients = Vec::with_capacity(n);
        for name in &bundle.feature_order {
            match bundle.coefficients.get(name) {
                Some(c) if c.is_finite() => coefficients.push(*c),
                Some(c) => {
                    return Err(ModelError::config(format!("non-finite coefficient {c} for '{name}'")))
                }
                None => return Err(ModelError::config(format!("no coefficient for '{name}'"))),
            }
        }
        if !bundle.intercept.is_finite() {
            return Err(ModelError::config("intercept is not finite"));
        }

        // Categoricals claim their dummy columns.
        let mut claimed: HashSet<usize> = HashSet::new();
        let mut categoricals = Vec::with_capacity(bundle.categoricals.len());
        for spec in &bundle.categoricals {
            if categoricals.iter().any(|c: &CategoricalSlot| c.spec.field == spec.field) {
                return Err(ModelError::config(format!("categorical '{}' declared twice", spec.field)));
            }
            let reference = normalize_label(&spec.reference);
            let mut levels = BTreeMap::new();
            for (i, name) in bundle.feature_order.iter().enumerate() {
                if let Some(level) = name.strip_prefix(spec.prefix.as_str()) {
                    if !claimed.insert(i) {
                        return Err(ModelError::config(format!("feature '{name}' claimed by two categoricals")));
                    }
                    levels.insert(normalize_label(level), i);
                }
            }
            if levels.is_empty() {
                return Err(ModelError::config(format!(
                    "categorical '{}' has no '{}' features",
                    spec.field, spec.prefix
                )));
            }
            if levels.contains_key(&reference) {
                return Err(ModelError::config(format!(
                    "reference level '{}' of '{}' has its own dummy",
                    spec.reference, spec.field
                )));
            }
            let mut aliases = HashMap::new();
            for (alias, target) in &spec.aliases {
                let target = normalize_label(target);
                if target != reference && !levels.contains_key(&target) {
                    return Err(ModelError::config(format!(
                        "alias '{alias}' of '{}' points at unknown level '{target}'",
                        spec.field
                    )));
                }
                aliases.insert(normalize_label(alias), target);
            }
            categoricals.push(CategoricalSlot {
                spec: CategoricalSpec { reference, ..spec.clone() },
                levels,
                aliases,
            });
        }

        // Derived features are computed from base features only.
        let derived_names: HashSet<&str> = bundle.derived.iter().map(|d| d.name()).collect();
        if derived_names.len() != bundle.derived.len() {
            return Err(ModelError::config("derived feature declared twice"));
        }
        let mut derived = Vec::with_capacity(bundle.derived.len());
        for spec in &bundle.derived {
            let target = *index.get(spec.name()).ok_or_else(|| {
                ModelError::config(format!("derived feature '{}' is not in the feature order", spec.name()))
            })?;
            if claimed.contains(&target) {
                return Err(ModelError::config(format!("derived feature '{}' is a dummy", spec.name())));
            }
            let mut inputs = Vec::with_capacity(spec.inputs().len());
            for input in spec.inputs() {
                let i = *index.get(input).ok_or_else(|| {
                    ModelError::config(format!("'{}' depends on unknown feature '{input}'", spec.name()))
                })?;
                if claimed.contains(&i) || derived_names.contains(input.as_str()) {
                    return Err(ModelError::config(format!(
                        "'{}' must depend on base features only, not '{input}'",
                        spec.name()
                    )));
                }
                inputs.push(i);
            }
            derived.push(match spec {
                DerivedFeature::CountOf { .. } => DerivedSlot::CountOf { index: target, sources: inputs },
                DerivedFeature::Product { .. } => DerivedSlot::Product { index: target, factors: inputs },
            });
        }

        let required: Vec<usize> = (0..n)
            .filter(|i| !claimed.contains(i) && !derived.iter().any(|d| d.index() == *i))
            .collect();
        let is_required = |name: &str| index.get(name).is_some_and(|i| required.contains(i));

        if let Some(bad) = bundle.schema.named_features().find(|f| !is_required(f)) {
            return Err(ModelError::config(format!(
                "record schema names '{bad}' which is not a base feature"
            )));
        }
        if let Some(default_source) = &bundle.schema.default_income_source {
            if !bundle.schema.is_income_source(default_source) {
                return Err(ModelError::config(format!(
                    "default income source '{default_source}' is not an income source"
                )));
            }
        }
        if let Some(bad) = bundle.defaults.keys().find(|f| !is_required(f)) {
            return Err(ModelError::config(format!("default given for non-base feature '{bad}'")));
        }

        let config = Self {
            label: bundle.label,
            version: None,
            feature_order: bundle.feature_order,
            index,
            mean: bundle.standardization_mean,
            scale: bundle.standardization_scale,
            coefficients,
            intercept: bundle.intercept,
            categoricals,
            derived,
            derived_specs: bundle.derived,
            required,
            schema: bundle.schema,
            defaults: bundle.defaults,
            default_state: bundle.default_state,
            default_age_group: bundle.default_age_group,
            calibration: bundle.calibration,
        };

        // Default categorical values must resolve like any caller value.
        for (field, value) in [
            ("state", config.default_state.as_deref()),
            ("age_group", config.default_age_group.as_deref()),
        ] {
            if let (Some(value), Some(slot)) = (value, config.categorical(field)) {
                crate::encoding::resolve(slot, value)
                    .map_err(|e| ModelError::config(format!("default {field}: {e}")))?;
            }
        }

        if let Some(cal) = config.calibration {
            if !(cal.reference_rate > 0.0 && cal.raw_rate > 0.0)
                || !cal.factor().is_finite()
            {
                return Err(ModelError::config("calibration rates must be positive"));
            }
        }

        Ok(config)
    }

    /// The external form of this configuration.
    pub fn to_bundle(&self) -> ModelBundle {
        ModelBundle {
            label:                 self.label.clone(),
            feature_order:         self.feature_order.clone(),
            standardization_mean:  self.mean.clone(),
            standardization_scale: self.scale.clone(),
            coefficients:          self.coefficients().map(|(f, c)| (f.to_string(), c)).collect(),
            intercept:             self.intercept,
            categoricals:          self.categoricals.iter().map(|c| c.spec.clone()).collect(),
            derived:               self.derived_specs.clone(),
            schema:                self.schema.clone(),
            defaults:              self.defaults.clone(),
            default_state:         self.default_state.clone(),
            default_age_group:     self.default_age_group.clone(),
            calibration:           self.calibration,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The built-in version this bundle came from, if any.
    pub fn version(&self) -> Option<ModelVersion> {
        self.version
    }

    pub fn feature_order(&self) -> &[FeatureName] {
        &self.feature_order
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficients in feature order. Every feature has one.
    pub fn coefficients(&self) -> impl Iterator<Item = (&str, f64)> {
        self.feature_order
            .iter()
            .map(String::as_str)
            .zip(self.coefficients.iter().copied())
    }

    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.feature_index(name).map(|i| self.coefficients[i])
    }

    pub(crate) fn coefficient_slice(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn categoricals(&self) -> &[CategoricalSlot] {
        &self.categoricals
    }

    pub fn categorical(&self, field: &str) -> Option<&CategoricalSlot> {
        self.categoricals.iter().find(|c| c.field() == field)
    }

    pub(crate) fn derived_slots(&self) -> &[DerivedSlot] {
        &self.derived
    }

    pub fn is_derived(&self, name: &str) -> bool {
        self.feature_index(name)
            .is_some_and(|i| self.derived.iter().any(|d| d.index() == i))
    }

    pub(crate) fn required_indices(&self) -> &[usize] {
        &self.required
    }

    /// Base features every record must carry.
    pub fn required_features(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(|&i| self.feature_order[i].as_str())
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration
    }

    /// The survey-typical individual: configured defaults, falling back
    /// to the standardisation mean, reconciled against the schema.
    pub fn default_record(&self) -> FeatureRecord {
        let mut record = FeatureRecord::new();
        for &i in &self.required {
            let name = &self.feature_order[i];
            let value = self.defaults.get(name).copied().unwrap_or(self.mean[i]);
            record.insert(name, value);
        }
        if self.categorical("state").is_some() {
            record.state = self.default_state.clone();
        }
        if self.categorical("age_group").is_some() {
            record.age_group = self.default_age_group.clone();
        }
        record.reconcile(&self.schema);
        record
    }
}

// ── Simulator configuration ──────────────────────────────────────────────────

/// How far a target must move from the current level to count as a change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChangeTolerances {
    /// For percentage levers (ID coverage, urbanisation), in points.
    pub coverage_pct: f64,
    /// For tier and level levers (digital, education, wealth, infrastructure).
    pub level:        f64,
    /// For the income lever, in currency units.
    pub income:       f64,
}

impl Default for ChangeTolerances {
    fn default() -> Self {
        Self {
            coverage_pct: 1.0,
            level:        0.1,
            income:       1_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SavingsPromotionConstants {
    pub saves_money_prob:     f64,
    pub regular_saver_prob:   f64,
    pub diverse_reasons_prob: f64,
    pub old_age_plan_prob:    f64,
    pub score_cap:            f64,
}

impl Default for SavingsPromotionConstants {
    fn default() -> Self {
        Self {
            saves_money_prob:     0.30,
            regular_saver_prob:   0.25,
            diverse_reasons_prob: 0.20,
            old_age_plan_prob:    0.40,
            score_cap:            5.0,
        }
    }
}

/// Per-lever upgrade constants. Probabilities are clamped into [0, 1] on use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LeverConstants {
    /// Share of the closable ID gap that enrols per run.
    pub national_id_uptake:         f64,
    /// Multiplier on the per-person tier gap (out of 2).
    pub digital_uptake:             f64,
    pub education_upgrade_prob:     f64,
    pub wealth_upgrade_prob:        f64,
    /// Largest single infrastructure increment.
    pub infrastructure_max_step:    f64,
    pub infrastructure_uptake:      f64,
    /// Target must exceed income by this ratio before income grows.
    pub income_gap_ratio:           f64,
    pub income_growth:              f64,
    /// Multiplier on the urbanisation target share.
    pub urbanization_uptake:        f64,
    pub savings:                    SavingsPromotionConstants,
    pub diversification_prob:       f64,
    /// People at or above this many income sources are not targeted.
    pub diversification_max_sources: f64,
}

impl Default for LeverConstants {
    fn default() -> Self {
        Self {
            national_id_uptake:          0.5,
            digital_uptake:              0.4,
            education_upgrade_prob:      0.25,
            wealth_upgrade_prob:         0.15,
            infrastructure_max_step:     3.0,
            infrastructure_uptake:       0.5,
            income_gap_ratio:            1.1,
            income_growth:               1.15,
            urbanization_uptake:         0.1,
            savings:                     SavingsPromotionConstants::default(),
            diversification_prob:        0.2,
            diversification_max_sources: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    pub seed:                u64,
    pub inclusion_threshold: f64,
    /// Trials averaged per lever contribution.
    pub attribution_trials:  u64,
    /// Keep projected per-record probabilities in the result.
    pub keep_predictions:    bool,
    pub tolerances:          ChangeTolerances,
    pub levers:              LeverConstants,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed:                0x5EED_1A2B_3C4D_5E6F,
            inclusion_threshold: INCLUSION_THRESHOLD,
            attribution_trials:  30,
            keep_predictions:    false,
            tolerances:          ChangeTolerances::default(),
            levers:              LeverConstants::default(),
        }
    }
}

impl SimulatorConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimulatorConfig = serde_json::from_str(&content)?;
        if !(0.0..=1.0).contains(&config.inclusion_threshold) {
            anyhow::bail!(
                "inclusion_threshold {} in {path} is outside [0, 1]",
                config.inclusion_threshold
            );
        }
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
