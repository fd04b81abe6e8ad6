use inclusion_core::{encoding, FeatureRecord, ModelError, ModelVersion, Scorer};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn scorer(version: ModelVersion) -> Scorer {
    Scorer::for_version(version).unwrap()
}

fn base(scorer: &Scorer) -> FeatureRecord {
    let mut record = scorer.config().default_record();
    record.state = None;
    record.age_group = None;
    record
}

fn dummy_sum(scorer: &Scorer, record: &FeatureRecord, prefix: &str) -> f64 {
    let x = scorer.assemble(record).unwrap();
    scorer
        .config()
        .feature_order()
        .iter()
        .zip(&x)
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(_, v)| v)
        .sum()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Naming the reference state and age group is the same as naming nothing.
#[test]
fn reference_category_matches_unspecified() {
    let s = scorer(ModelVersion::NonCircularV3);
    let unspecified = base(&s);
    let reference = base(&s).with_state("ABIA").with_age_group("18-24");

    assert_eq!(
        s.standardized(&unspecified).unwrap(),
        s.standardized(&reference).unwrap()
    );
    assert_eq!(dummy_sum(&s, &reference, "state_"), 0.0);
    assert_eq!(dummy_sum(&s, &reference, "age_"), 0.0);
}

/// Exactly one dummy is set for a non-reference level.
#[test]
fn non_reference_level_sets_one_dummy() {
    let s = scorer(ModelVersion::NonCircularV3);
    let record = base(&s).with_state("LAGOS").with_age_group("45-54");
    assert_eq!(dummy_sum(&s, &record, "state_"), 1.0);
    assert_eq!(dummy_sum(&s, &record, "age_"), 1.0);

    let x = s.assemble(&record).unwrap();
    let i = s.config().feature_index("state_LAGOS").unwrap();
    assert_eq!(x[i], 1.0);
}

/// UI spellings resolve onto the model's own level names.
#[test]
fn aliases_resolve_per_version() {
    let v3 = scorer(ModelVersion::NonCircularV3);
    let slot = v3.config().categorical("state").unwrap();
    assert_eq!(encoding::canonical_level(slot, "AKWA-IBOM").unwrap(), "AKWA IBOM");
    assert_eq!(encoding::canonical_level(slot, "Cross-River").unwrap(), "CROSS RIVER");
    assert_eq!(encoding::canonical_level(slot, "fct abuja").unwrap(), "FCT");
    assert_eq!(encoding::canonical_level(slot, " FCT-ABUJA ").unwrap(), "FCT");

    let v2 = scorer(ModelVersion::StatesV2);
    let slot = v2.config().categorical("state").unwrap();
    assert_eq!(encoding::canonical_level(slot, "AKWA IBOM").unwrap(), "AKWA-IBOM");
    assert_eq!(encoding::canonical_level(slot, "FCT").unwrap(), "FCT ABUJA");
    assert!(v2.config().categorical("age_group").is_none());
}

/// An alias and the canonical name produce the same probability.
#[test]
fn alias_scores_like_canonical_name() {
    let s = scorer(ModelVersion::NonCircularV3);
    let canonical = s.score(&base(&s).with_state("FCT")).unwrap();
    let alias = s.score(&base(&s).with_state("FCT ABUJA")).unwrap();
    assert_eq!(canonical, alias);
}

/// Unknown values fail instead of falling back to the reference.
#[test]
fn unknown_category_is_rejected() {
    let s = scorer(ModelVersion::NonCircularV3);
    match s.score(&base(&s).with_state("ATLANTIS")) {
        Err(ModelError::UnknownCategory { field, value }) => {
            assert_eq!(field, "state");
            assert_eq!(value, "ATLANTIS");
        }
        other => panic!("expected UnknownCategory, got {other:?}"),
    }
    assert!(matches!(
        s.score(&base(&s).with_age_group("16-17")),
        Err(ModelError::UnknownCategory { .. })
    ));
}

/// A blank value is not a level: it fails like any unknown name.
#[test]
fn blank_value_is_rejected() {
    let s = scorer(ModelVersion::NonCircularV3);
    let slot = s.config().categorical("state").unwrap();
    assert!(matches!(
        encoding::resolve(slot, "   "),
        Err(ModelError::UnknownCategory { .. })
    ));
    assert_eq!(encoding::resolve(slot, "abia").unwrap(), None);
    assert!(matches!(
        s.score(&base(&s).with_state(" ")),
        Err(ModelError::UnknownCategory { .. })
    ));
}
