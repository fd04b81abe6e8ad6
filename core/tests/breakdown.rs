use inclusion_core::{breakdown, FeatureRecord, ModelConfig, ModelError, ModelVersion};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn person(male: bool, urban: bool) -> FeatureRecord {
    FeatureRecord::new()
        .with("gender_male", if male { 1.0 } else { 0.0 })
        .with("urban", if urban { 1.0 } else { 0.0 })
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Group totals add up and rates use the inclusion threshold.
#[test]
fn groups_partition_population() {
    let config = ModelConfig::for_version(ModelVersion::NonCircularV3).unwrap();
    let population = vec![
        person(true, true).with_state("FCT").with_age_group("25-34"),
        person(true, false).with_state("FCT ABUJA").with_age_group("25-34"),
        person(false, true).with_state("Lagos"),
        person(false, false),
    ];
    let probabilities = [0.9, 0.2, 0.5, 0.49];

    let groups = breakdown::by_group(&config, &population, &probabilities, 0.5).unwrap();

    let male = &groups.gender["male"];
    assert_eq!((male.included, male.total), (1, 2));
    assert_eq!(male.rate, 0.5);
    let female = &groups.gender["female"];
    assert_eq!((female.included, female.total), (1, 2));

    assert_eq!(groups.location["urban"].included, 2);
    assert_eq!(groups.location["rural"].included, 0);

    assert_eq!(groups.state["FCT"].total, 2, "aliases merge into one state");
    assert_eq!(groups.state["LAGOS"].total, 1);
    assert_eq!(groups.age_group["25-34"].total, 2);
    let states: usize = groups.state.values().map(|g| g.total).sum();
    assert_eq!(states, 3, "records without a state are left out");
}

/// Continuous ages fall into the survey buckets.
#[test]
fn numeric_age_is_bucketed() {
    let config = ModelConfig::for_version(ModelVersion::StatesV2).unwrap();
    let population: Vec<FeatureRecord> = [19.0, 24.0, 25.0, 64.0, 65.0, 90.0]
        .iter()
        .map(|age| person(true, true).with("Age_numeric", *age))
        .collect();
    let probabilities = vec![0.6; population.len()];

    let groups = breakdown::by_group(&config, &population, &probabilities, 0.5).unwrap();
    assert_eq!(groups.age_group["18-24"].total, 2);
    assert_eq!(groups.age_group["25-34"].total, 1);
    assert_eq!(groups.age_group["55-64"].total, 1);
    assert_eq!(groups.age_group["65+"].total, 2);
}

#[test]
fn misaligned_inputs_rejected() {
    let config = ModelConfig::for_version(ModelVersion::NonCircularV3).unwrap();
    let population = vec![person(true, true); 3];
    assert!(matches!(
        breakdown::by_group(&config, &population, &[0.5, 0.5], 0.5),
        Err(ModelError::LengthMismatch { expected: 3, actual: 2 })
    ));
}
