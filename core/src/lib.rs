//! Financial-inclusion scoring and population policy simulation.
//!
//! `Scorer` turns one person's attributes into a probability of formal
//! inclusion using a versioned logistic-regression bundle.
//! `PopulationSimulator` applies policy levers to copies of a population
//! and reports how the included share moves.

pub mod breakdown;
pub mod config;
pub mod encoding;
pub mod error;
pub mod model_tables;
pub mod perturbation;
pub mod policy;
pub mod population_generator;
pub mod record;
pub mod rng;
pub mod scorer;
pub mod simulator;
pub mod types;

pub use config::{ModelConfig, ModelVersion, SimulatorConfig};
pub use error::{ModelError, ModelResult};
pub use policy::{Lever, PolicyTargets};
pub use record::FeatureRecord;
pub use scorer::Scorer;
pub use simulator::{PopulationSimulator, SimulationResult};

/// Score one individual with the default model version.
pub fn score_individual(record: &FeatureRecord) -> ModelResult<types::Probability> {
    Scorer::for_version(ModelVersion::default())?.score_individual(record)
}

/// Simulate `targets` over `population` with the default model version
/// and simulator settings.
pub fn simulate_policy(population: &[FeatureRecord], targets: &PolicyTargets) -> ModelResult<SimulationResult> {
    let scorer = Scorer::for_version(ModelVersion::default())?;
    PopulationSimulator::new(scorer, SimulatorConfig::default()).simulate(population, targets)
}
