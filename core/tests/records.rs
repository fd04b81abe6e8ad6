use inclusion_core::{FeatureRecord, ModelConfig, ModelError, ModelVersion, Scorer};
use serde_json::json;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn v3() -> ModelConfig {
    ModelConfig::for_version(ModelVersion::NonCircularV3).unwrap()
}

const SOURCES: [&str; 4] = ["Formal_Employment", "Business_Income", "Agricultural_Income", "Passive_Income"];

/// Income above zero with every income source switched off.
fn sourceless(config: &ModelConfig) -> FeatureRecord {
    let mut record = config.default_record().with("income_numeric", 20_000.0);
    for source in SOURCES {
        record.insert(source, 0.0);
    }
    record
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Strict path: income without a source is rejected before scoring.
#[test]
fn sourceless_income_is_rejected() {
    let config = v3();
    let record = sourceless(&config);
    assert!(matches!(
        record.check_invariants(config.schema()),
        Err(ModelError::InvariantViolation { .. })
    ));

    let scorer = Scorer::new(std::sync::Arc::new(config));
    assert!(matches!(
        scorer.score_individual(&record),
        Err(ModelError::InvariantViolation { .. })
    ));
}

/// Loader path: the same record is auto-corrected to the default source.
#[test]
fn sourceless_income_is_auto_corrected() {
    let config = v3();
    let mut record = sourceless(&config);
    assert!(record.reconcile(config.schema()), "reconcile should report a change");
    assert_eq!(record.get("Business_Income"), Some(1.0));
    assert_eq!(record.income_diversity(config.schema()), 1.0);
    assert!(record.check_invariants(config.schema()).is_ok());
    assert!(!record.reconcile(config.schema()), "second reconcile must be a no-op");
}

/// Zero income clears every source, through either path.
#[test]
fn zero_income_clears_sources() {
    let config = v3();
    let schema = config.schema();
    let mut edited = config.default_record();
    assert!(edited.set(schema, "Passive_Income", 1.0));
    assert!(edited.set(schema, "income_numeric", 0.0));
    for source in SOURCES {
        assert_eq!(edited.get(source), Some(0.0), "{source} survived zero income");
    }
    assert_eq!(edited.income_diversity(schema), 0.0);

    let mut loaded = config.default_record().with("income_numeric", 0.0);
    loaded.reconcile(schema);
    assert!(loaded.check_invariants(schema).is_ok());
}

/// The editor enables the default source when income appears.
#[test]
fn income_edit_enables_default_source() {
    let config = v3();
    let schema = config.schema();
    let mut record = config.default_record();
    record.set(schema, "income_numeric", 0.0);
    assert!(record.set(schema, "income_numeric", 12_000.0));
    assert_eq!(record.get("Business_Income"), Some(1.0));
}

/// The last enabled source cannot be cleared while income remains.
#[test]
fn last_source_cannot_be_cleared() {
    let config = v3();
    let schema = config.schema();
    let mut record = config.default_record();
    let before = record.clone();
    assert!(!record.set(schema, "Business_Income", 0.0));
    assert_eq!(record, before, "a refused edit must leave the record untouched");

    assert!(record.set(schema, "Formal_Employment", 1.0));
    assert!(record.set(schema, "Business_Income", 0.0));
    assert_eq!(record.income_diversity(schema), 1.0);
}

/// No source may be switched on without income.
#[test]
fn source_needs_income() {
    let config = v3();
    let schema = config.schema();
    let mut record = config.default_record();
    record.set(schema, "income_numeric", 0.0);
    assert!(!record.set(schema, "Passive_Income", 1.0));
    assert_eq!(record.get("Passive_Income"), Some(0.0));
}

/// Clearing the savings master flag zeroes every dependent.
#[test]
fn savings_master_gates_dependents() {
    let config = v3();
    let schema = config.schema();
    let mut record = config.default_record();
    assert!(!record.set(schema, "Regular_Saver", 1.0), "dependent set while master is off");

    assert!(record.set(schema, "Saves_Money", 1.0));
    assert!(record.set(schema, "Regular_Saver", 1.0));
    assert!(record.set(schema, "Savings_Behavior_Score", 3.0));
    assert!(record.set(schema, "Saves_Money", 0.0));
    for dependent in &schema.savings_dependents {
        assert_eq!(record.value_or_zero(dependent), 0.0, "{dependent} survived");
    }
    assert!(record.check_invariants(schema).is_ok());
}

/// The default individual already satisfies every invariant.
#[test]
fn default_records_are_consistent() {
    for version in ModelVersion::ALL {
        let config = ModelConfig::for_version(version).unwrap();
        let record = config.default_record();
        assert!(record.check_invariants(config.schema()).is_ok(), "{version:?}");
        for feature in config.required_features() {
            assert!(record.get(feature).is_some(), "{version:?} default lacks {feature}");
        }
    }
}

/// Survey rows: dummies lift into categoricals, labels accept 0/1.
#[test]
fn survey_row_lifts_categoricals_and_label() {
    let config = v3();
    let row = json!({
        "education_numeric": 2,
        "Has_NIN": true,
        "age_25-34": 0,
        "age_35-44": 1,
        "state_KANO": 1,
        "Formally_Included": 1,
        "respondent": "r-0001"
    });
    let record = FeatureRecord::from_survey_row(&config, row.as_object().unwrap()).unwrap();
    assert_eq!(record.age_group.as_deref(), Some("35-44"));
    assert_eq!(record.state.as_deref(), Some("KANO"));
    assert_eq!(record.formally_included, Some(true));
    assert_eq!(record.get("education_numeric"), Some(2.0));
    assert_eq!(record.get("Has_NIN"), Some(1.0));
    assert_eq!(record.get("age_35-44"), None);
    assert_eq!(record.get("respondent"), None);
}

/// An explicit state field wins over absent dummies, and no dummy means reference.
#[test]
fn survey_row_without_dummies_is_reference() {
    let config = v3();
    let row = json!({ "State": "Lagos", "age_25-34": 0, "Formally_Included": false });
    let record = FeatureRecord::from_survey_row(&config, row.as_object().unwrap()).unwrap();
    assert_eq!(record.state.as_deref(), Some("Lagos"));
    assert_eq!(record.age_group, None);
    assert_eq!(record.formally_included, Some(false));
}

/// Blank survey cells leave the categorical unset, so the record scores as the reference.
#[test]
fn blank_survey_cells_are_absent() {
    let config = v3();
    let row = json!({ "State": "  ", "Age_Group": "", "Formally_Included": 0 });
    let record = FeatureRecord::from_survey_row(&config, row.as_object().unwrap()).unwrap();
    assert_eq!(record.state, None);
    assert_eq!(record.age_group, None);
}
