use inclusion_core::{
    policy::Lever, FeatureRecord, ModelVersion, PolicyTargets, PopulationSimulator, Scorer,
    SimulatorConfig,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn simulator(trials: u64, seed: u64) -> PopulationSimulator {
    let config = SimulatorConfig {
        attribution_trials: trials,
        ..SimulatorConfig::default().with_seed(seed)
    };
    PopulationSimulator::new(Scorer::for_version(ModelVersion::NonCircularV3).unwrap(), config)
}

fn population(sim: &PopulationSimulator, n: usize) -> Vec<FeatureRecord> {
    let config = sim.scorer().config();
    let schema = config.schema();
    (0..n)
        .map(|i| {
            let mut r = config.default_record().with_state("KANO");
            r.set(schema, "education_numeric", (i % 4) as f64);
            r.set(schema, "wealth_numeric", (1 + i % 5) as f64);
            r.set(schema, "Digital_Access_Index", (i % 3) as f64);
            r.set(schema, "Has_NIN", (i % 2) as f64);
            r.set(schema, "urban", ((i / 2) % 2) as f64);
            r
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// With one changed lever and one trial, its contribution is the combined delta.
#[test]
fn single_lever_owns_the_whole_delta() {
    let sim = simulator(1, 31);
    let pop = population(&sim, 500);
    let targets = PolicyTargets::default().with_target(Lever::Education, 3.0);

    let result = sim.simulate_with_contributions(&pop, &targets).unwrap();
    let contributions = result.lever_contributions.unwrap();
    assert_eq!(contributions.len(), 1);
    assert_eq!(contributions[0].lever, Lever::Education);
    assert_eq!(contributions[0].trials, 1);
    assert_eq!(contributions[0].std_error, 0.0);
    assert_eq!(
        contributions[0].delta_percentage_points,
        result.impact.delta_percentage_points
    );
}

/// Every changed lever gets an averaged, finite estimate.
#[test]
fn each_changed_lever_is_attributed() {
    let sim = simulator(30, 8);
    let pop = population(&sim, 400);
    let targets = PolicyTargets::default()
        .with_target(Lever::NationalId, 100.0)
        .with_target(Lever::Wealth, 5.0)
        .with_target(Lever::Urbanization, 50.0);

    let result = sim.simulate_with_contributions(&pop, &targets).unwrap();
    let contributions = result.lever_contributions.unwrap();
    let levers: Vec<Lever> = contributions.iter().map(|c| c.lever).collect();
    assert_eq!(levers, result.changed_levers);
    assert!(
        !levers.contains(&Lever::Urbanization),
        "urban share is already 50%, so urbanisation must not be attributed"
    );
    for c in &contributions {
        assert_eq!(c.trials, 30);
        assert!(c.delta_percentage_points.is_finite());
        assert!(c.std_error.is_finite() && c.std_error >= 0.0);
    }

    let id = contributions.iter().find(|c| c.lever == Lever::NationalId).unwrap();
    assert!(id.delta_percentage_points >= 0.0, "ID contribution {}", id.delta_percentage_points);
}

/// Same seed, same contributions.
#[test]
fn attribution_is_reproducible() {
    let targets = PolicyTargets::default()
        .with_target(Lever::Education, 3.0)
        .with_target(Lever::DigitalAccess, 2.0);
    let run = |seed| {
        let sim = simulator(10, seed);
        let pop = population(&sim, 300);
        sim.simulate_with_contributions(&pop, &targets)
            .unwrap()
            .lever_contributions
            .unwrap()
    };
    assert_eq!(run(4), run(4));
}

/// No change requested: an empty contribution list, not a missing one.
#[test]
fn noop_has_empty_contributions() {
    let sim = simulator(30, 2);
    let pop = population(&sim, 100);
    let result = sim.simulate_with_contributions(&pop, &PolicyTargets::default()).unwrap();
    assert!(result.skipped);
    assert_eq!(result.lever_contributions, Some(Vec::new()));
}
