//! policy-runner: headless scoring and policy simulation.
//!
//! Usage:
//!   policy-runner --seed 12345 --synthetic 5000
//!   policy-runner --version v2 --population survey.json --targets '{"education":2.5}'
//!   policy-runner --population survey.json --ipc-mode

use anyhow::{anyhow, bail, Context, Result};
use inclusion_core::{
    breakdown,
    population_generator::{self, GeneratorParams},
    rng::{RngBank, StreamSlot},
    scorer::ProbabilityBand,
    FeatureRecord, ModelVersion, PolicyTargets, PopulationSimulator, Scorer, SimulationResult,
    SimulatorConfig,
};
use serde_json::Value;
use std::env;
use std::io::{self, BufRead, Write};

/// Contributions shown per score response.
const TOP_CONTRIBUTIONS: usize = 8;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Score {
        record: serde_json::Map<String, Value>,
    },
    Baseline,
    Simulate {
        #[serde(default)]
        targets: PolicyTargets,
        #[serde(default)]
        contributions: bool,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct ScoreResponse {
    probability: f64,
    band: ProbabilityBand,
    contributions: Vec<inclusion_core::scorer::FeatureContribution>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", SimulatorConfig::default().seed);
    let synthetic = parse_arg(&args, "--synthetic", 1_000usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let version_arg = string_arg(&args, "--version").unwrap_or("v3");
    let version = ModelVersion::parse(version_arg)
        .ok_or_else(|| anyhow!("unknown model version '{version_arg}' (expected v2 or v3)"))?;
    let population_path = string_arg(&args, "--population");
    let config_path = string_arg(&args, "--config");
    let targets: PolicyTargets = match string_arg(&args, "--targets") {
        Some(json) => serde_json::from_str(json).context("--targets is not a valid target object")?,
        None => PolicyTargets::default(),
    };

    let sim_config = match config_path {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    }
    .with_seed(seed);

    let scorer = Scorer::for_version(version)?;
    let population = match population_path {
        Some(path) => load_population(&scorer, path)?,
        None => {
            let mut rng = RngBank::new(seed).for_stream(0, StreamSlot::Generator);
            let params = GeneratorParams::default().with_size(synthetic);
            population_generator::generate(&scorer, &params, &mut rng)?
        }
    };

    if !ipc_mode {
        println!("policy-runner");
        println!("  seed:        {seed}");
        println!("  model:       {}", version.label());
        println!("  population:  {} ({})", population.len(), population_path.unwrap_or("synthetic"));
        println!();
    }

    let simulator = PopulationSimulator::new(scorer, sim_config);

    if ipc_mode {
        run_ipc_loop(&simulator, &population)?;
    } else {
        let result = simulator.simulate_with_contributions(&population, &targets)?;
        print_summary(&simulator, &population, &result)?;
    }

    Ok(())
}

/// Reads a JSON array of survey rows, or an object with a `population` array.
fn load_population(scorer: &Scorer, path: &str) -> Result<Vec<FeatureRecord>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    let json: Value = serde_json::from_str(&content).with_context(|| format!("{path} is not valid JSON"))?;
    let rows = match json {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("population") {
            Some(Value::Array(rows)) => rows,
            _ => bail!("{path}: expected an array or an object with a 'population' array"),
        },
        _ => bail!("{path}: expected an array or an object with a 'population' array"),
    };

    let config = scorer.config();
    let mut corrected = 0usize;
    let mut population = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let Value::Object(map) = row else {
            bail!("{path}: row {i} is not an object");
        };
        let mut record = FeatureRecord::from_survey_row(config, map)?;
        if record.reconcile(config.schema()) {
            corrected += 1;
        }
        population.push(record);
    }
    if corrected > 0 {
        log::warn!("{path}: {corrected} of {} records auto-corrected to satisfy invariants", population.len());
    }
    log::info!("{path}: loaded {} records", population.len());
    Ok(population)
}

fn run_ipc_loop(simulator: &PopulationSimulator, population: &[FeatureRecord]) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, e)?;
                continue;
            }
        };

        let response = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Score { record } => score_record(simulator.scorer(), &record),
            IpcCommand::Baseline => simulator
                .baseline(population)
                .map_err(anyhow::Error::from)
                .map(|b| serde_json::json!({ "baseline": b.summary, "levels": b.levels })),
            IpcCommand::Simulate { targets, contributions } => {
                let result = if contributions {
                    simulator.simulate_with_contributions(population, &targets)
                } else {
                    simulator.simulate(population, &targets)
                };
                result
                    .map_err(anyhow::Error::from)
                    .and_then(|r| Ok(serde_json::to_value(&r)?))
            }
        };

        match response {
            Ok(value) => writeln!(stdout, "{value}")?,
            Err(e) => write_error(&mut stdout, e)?,
        }
        stdout.flush()?;
    }
    Ok(())
}

fn score_record(scorer: &Scorer, row: &serde_json::Map<String, Value>) -> Result<Value> {
    let record = FeatureRecord::from_survey_row(scorer.config(), row)?;
    let probability = scorer.score_individual(&record)?;
    let mut contributions = scorer.explain(&record)?;
    contributions.truncate(TOP_CONTRIBUTIONS);
    Ok(serde_json::to_value(ScoreResponse {
        probability,
        band: ProbabilityBand::of(probability),
        contributions,
    })?)
}

fn write_error(stdout: &mut io::Stdout, e: impl std::fmt::Display) -> Result<()> {
    let err_json = serde_json::json!({ "error": e.to_string() });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(
    simulator: &PopulationSimulator,
    population: &[FeatureRecord],
    result: &SimulationResult,
) -> Result<()> {
    println!("=== CURRENT LEVELS ===");
    for (lever, level) in &result.levels.levels {
        let unit = if lever.is_percentage() { "%" } else { "" };
        println!("  {:<24}{level:.2}{unit}", lever.name());
    }
    if let Some(observed) = result.observed_rate {
        println!("  {:<24}{:.2}%", "observed inclusion", observed * 100.0);
    }

    println!();
    println!("=== SIMULATION ===");
    println!("  model:          {}", result.model);
    println!("  baseline:       {} ({:.2}%)", result.baseline.count, result.baseline.rate * 100.0);
    if let Some(calibrated) = result.baseline.calibrated_rate {
        println!("  calibrated:     {:.2}%", calibrated * 100.0);
    }
    if result.skipped {
        println!("  (no lever moved beyond tolerance, nothing simulated)");
    } else {
        println!("  projected:      {} ({:.2}%)", result.projected.count, result.projected.rate * 100.0);
        println!("  delta:          {:+.2} pp", result.impact.delta_percentage_points);
        println!("  newly included: {}", result.impact.newly_included);
        println!("  newly excluded: {}", result.impact.newly_excluded);
        println!("  affected:       {:.2}%", result.impact.percent_affected);
    }
    for lever in &result.clamped_levers {
        println!("  clamped:        {}", lever.name());
    }
    for lever in &result.unsupported_levers {
        println!("  unsupported:    {}", lever.name());
    }

    if let Some(contributions) = result.lever_contributions.as_ref().filter(|c| !c.is_empty()) {
        println!();
        println!("=== LEVER CONTRIBUTIONS ===");
        for c in contributions {
            println!(
                "  {:<24}{:+.2} pp (se {:.2}, {} trials)",
                c.lever.name(),
                c.delta_percentage_points,
                c.std_error,
                c.trials
            );
        }
    }

    let baseline = simulator.baseline(population)?;
    let groups = breakdown::by_group(
        simulator.scorer().config(),
        population,
        &baseline.probabilities,
        simulator.config().inclusion_threshold,
    )?;
    println!();
    println!("=== BASELINE BY GROUP ===");
    for (dimension, stats) in [
        ("gender", &groups.gender),
        ("location", &groups.location),
        ("age", &groups.age_group),
    ] {
        for (group, s) in stats {
            println!("  {dimension:<9}{group:<12}{:>6}/{:<6} {:.1}%", s.included, s.total, s.rate * 100.0);
        }
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
