use inclusion_core::{
    scorer::ProbabilityBand, FeatureRecord, ModelConfig, ModelError, ModelVersion, Scorer,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn scorer(version: ModelVersion) -> Scorer {
    Scorer::for_version(version).unwrap()
}

fn default_record(scorer: &Scorer) -> FeatureRecord {
    scorer.config().default_record()
}

fn edited(scorer: &Scorer, edits: &[(&str, f64)]) -> FeatureRecord {
    let schema = scorer.config().schema();
    let mut record = default_record(scorer);
    for (name, value) in edits {
        assert!(record.set(schema, name, *value), "edit {name}={value} was refused");
    }
    record
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Scoring is a pure function: the same record always yields the same bits.
#[test]
fn scoring_is_deterministic() {
    for version in ModelVersion::ALL {
        let s = scorer(version);
        let record = default_record(&s);
        let first = s.score_individual(&record).unwrap();
        for _ in 0..10 {
            let again = s.score_individual(&record).unwrap();
            assert_eq!(first.to_bits(), again.to_bits(), "{version:?} score drifted");
        }
    }
}

/// Even absurd finite inputs stay strictly inside (0, 1).
#[test]
fn probability_is_strictly_inside_unit_interval() {
    let s = scorer(ModelVersion::NonCircularV3);
    let cases = [
        edited(&s, &[("income_numeric", 1e12), ("education_numeric", 3.0), ("Has_NIN", 1.0)]),
        edited(&s, &[("income_numeric", 0.0), ("wealth_numeric", 1.0), ("Digital_Access_Index", 0.0)]),
        default_record(&s).with("Infrastructure_Access_Index", -1e9),
    ];
    for record in &cases {
        let p = s.score(record).unwrap();
        assert!(p > 0.0 && p < 1.0, "probability {p} escaped (0, 1)");
    }
}

/// Raising education moves the score in the direction of its coefficient.
#[test]
fn education_is_monotone_in_coefficient_direction() {
    for version in ModelVersion::ALL {
        let s = scorer(version);
        let coefficient = s.config().coefficient("education_numeric").unwrap();
        let scores: Vec<f64> = (0..=3)
            .map(|level| s.score(&edited(&s, &[("education_numeric", level as f64)])).unwrap())
            .collect();
        for pair in scores.windows(2) {
            if coefficient > 0.0 {
                assert!(pair[1] >= pair[0], "{version:?}: score fell with education: {scores:?}");
            } else {
                assert!(pair[1] <= pair[0], "{version:?}: score rose with education: {scores:?}");
            }
        }
    }
}

/// A well-resourced profile scores far above a deprived one.
#[test]
fn high_profile_outscores_low_profile() {
    let s = scorer(ModelVersion::NonCircularV3);
    let high = edited(
        &s,
        &[
            ("education_numeric", 3.0),
            ("wealth_numeric", 5.0),
            ("urban", 1.0),
            ("Has_NIN", 1.0),
            ("Digital_Access_Index", 2.0),
        ],
    );
    let low = edited(
        &s,
        &[
            ("education_numeric", 0.0),
            ("wealth_numeric", 1.0),
            ("urban", 0.0),
            ("Has_NIN", 0.0),
            ("Digital_Access_Index", 0.0),
        ],
    );
    let (p_high, p_low) = (s.score_individual(&high).unwrap(), s.score_individual(&low).unwrap());
    assert!(p_high > 0.7, "high profile scored {p_high}");
    assert!(p_low < 0.3, "low profile scored {p_low}");
    assert_eq!(ProbabilityBand::of(p_high), ProbabilityBand::Saturated);
    assert_eq!(ProbabilityBand::of(p_low), ProbabilityBand::Low);
}

/// A record without a required base feature fails and names it.
#[test]
fn missing_feature_is_reported_by_name() {
    let s = scorer(ModelVersion::NonCircularV3);
    let mut record = default_record(&s);
    record.remove("wealth_numeric");
    match s.score(&record) {
        Err(ModelError::MissingFeature { feature }) => assert_eq!(feature, "wealth_numeric"),
        other => panic!("expected MissingFeature, got {other:?}"),
    }
}

/// Derived features are recomputed, so a stale stored value has no effect.
#[test]
fn stored_derived_values_are_ignored() {
    let s = scorer(ModelVersion::NonCircularV3);
    let record = edited(&s, &[("Agricultural_Income", 1.0), ("urban", 1.0)]);
    let stale = record
        .clone()
        .with("Income_Diversity_Score", 9.0)
        .with("Ag_x_Urban", 0.0);
    assert_eq!(s.score(&record).unwrap(), s.score(&stale).unwrap());

    let x = s.assemble(&record).unwrap();
    let config = s.config();
    let at = |name: &str| x[config.feature_index(name).unwrap()];
    assert_eq!(at("Income_Diversity_Score"), 2.0, "Business + Agricultural");
    assert_eq!(at("Ag_x_Urban"), 1.0);
    assert_eq!(at("Ag_x_Business"), 1.0);
    assert_eq!(at("Ag_x_Formal"), 0.0);
}

/// Parallel batch scoring matches one-by-one scoring exactly.
#[test]
fn batch_scoring_matches_sequential() {
    let s = scorer(ModelVersion::NonCircularV3);
    let records: Vec<FeatureRecord> = (0..200)
        .map(|i| {
            edited(
                &s,
                &[
                    ("education_numeric", (i % 4) as f64),
                    ("wealth_numeric", (1 + i % 5) as f64),
                    ("income_numeric", 1_000.0 * (i % 11) as f64),
                ],
            )
        })
        .collect();
    let batch = s.score_batch(&records).unwrap();
    for (record, p) in records.iter().zip(&batch) {
        assert_eq!(s.score(record).unwrap().to_bits(), p.to_bits());
    }
}

/// Contributions add back up to the logit and are sorted by magnitude.
#[test]
fn explanation_reconstructs_logit() {
    let s = scorer(ModelVersion::NonCircularV3);
    let record = edited(&s, &[("Has_NIN", 1.0), ("education_numeric", 2.0)]).with_state("KANO");
    let contributions = s.explain(&record).unwrap();
    assert_eq!(contributions.len(), s.config().feature_order().len());

    let total: f64 = contributions.iter().map(|c| c.contribution).sum();
    let logit = s.logit(&record).unwrap();
    assert!((s.config().intercept() + total - logit).abs() < 1e-9);

    let shares: f64 = contributions.iter().map(|c| c.share).sum();
    assert!((shares - 1.0).abs() < 1e-9, "shares sum to {shares}");
    for pair in contributions.windows(2) {
        assert!(pair[0].contribution.abs() >= pair[1].contribution.abs());
    }
}

/// Category effects resolve aliases and are zero for the reference.
#[test]
fn category_effect_uses_dummy_coefficient() {
    let s = scorer(ModelVersion::NonCircularV3);
    assert_eq!(s.category_effect("state", "ABIA").unwrap(), 0.0);
    assert_eq!(s.category_effect("age_group", "18-24").unwrap(), 0.0);
    assert_eq!(
        s.category_effect("state", "akwa-ibom").unwrap(),
        s.config().coefficient("state_AKWA IBOM").unwrap()
    );
    assert!(matches!(
        s.category_effect("state", "ATLANTIS"),
        Err(ModelError::UnknownCategory { .. })
    ));
}

/// The continuous-age model scores its own default individual.
#[test]
fn states_model_scores_default_individual() {
    let config = ModelConfig::for_version(ModelVersion::StatesV2).unwrap();
    let s = Scorer::new(std::sync::Arc::new(config));
    let record = default_record(&s);
    assert!(record.get("Age_numeric").is_some());
    assert!(record.age_group.is_none());
    let p = s.score_individual(&record).unwrap();
    assert!(p > 0.0 && p < 1.0);
}
