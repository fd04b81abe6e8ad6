//! Per-record lever application.
//!
//! RULE: levers only ever raise an attribute, never lower it, and never
//! touch the shared population. Each lever reads a fixed number of
//! uniforms per record from its own stream, qualifying or not, so the
//! same record sees the same draws in every leave-one-out run.

use crate::{
    config::{LeverConstants, ModelConfig},
    policy::{BaselineLevels, Lever, LeverPlan},
    record::FeatureRecord,
    rng::RngBank,
    types::TrialIndex,
};

/// Income sources enabled by the diversification lever, in order of preference.
const DIVERSIFICATION_ORDER: [&str; 3] = ["Business_Income", "Passive_Income", "Formal_Employment"];

/// Everything a lever needs to know beyond the record itself.
pub struct LeverContext<'a> {
    pub config:    &'a ModelConfig,
    pub constants: &'a LeverConstants,
    /// Clamped target for the lever being applied.
    pub target:    f64,
    /// The population's current level for the lever.
    pub current:   f64,
}

/// Apply one lever to one record using `draws` (exactly
/// `lever.draws_per_record()` uniforms). Returns true when the record changed.
pub fn apply_lever(lever: Lever, record: &mut FeatureRecord, draws: &[f64], ctx: &LeverContext) -> bool {
    let k = ctx.constants;
    let schema = ctx.config.schema();
    let u = draws.first().copied().unwrap_or(1.0);
    let feature = lever.feature();
    let max = lever.domain().map(|d| d.max).unwrap_or(f64::INFINITY);

    match lever {
        Lever::NationalId => {
            if record.value_or_zero(feature) >= 0.5 {
                return false;
            }
            let gap = ctx.target - ctx.current;
            let lacking = 100.0 - ctx.current;
            if gap <= 0.0 || lacking <= 0.0 {
                return false;
            }
            let p = (gap / lacking).min(1.0) * k.national_id_uptake;
            if u < p.clamp(0.0, 1.0) {
                record.insert(feature, 1.0);
                return true;
            }
            false
        }

        Lever::DigitalAccess => {
            let tier = record.value_or_zero(feature);
            if tier >= ctx.target {
                return false;
            }
            let p = (ctx.target - tier) / max * k.digital_uptake;
            step_up(record, feature, tier, 1.0, max, u < p.clamp(0.0, 1.0))
        }

        Lever::Education | Lever::Wealth => {
            let level = record.value_or_zero(feature);
            if level >= ctx.target {
                return false;
            }
            let p = if lever == Lever::Education {
                k.education_upgrade_prob
            } else {
                k.wealth_upgrade_prob
            };
            step_up(record, feature, level, 1.0, max, u < p.clamp(0.0, 1.0))
        }

        Lever::Infrastructure => {
            let index = record.value_or_zero(feature);
            if index >= ctx.target {
                return false;
            }
            let step = k.infrastructure_max_step.min(ctx.target - index);
            let p = step / max * k.infrastructure_uptake;
            step_up(record, feature, index, step, max, u < p.clamp(0.0, 1.0))
        }

        Lever::Income => {
            let income = record.value_or_zero(feature);
            if income <= 0.0 || ctx.target <= income * k.income_gap_ratio {
                return false;
            }
            let raised = income * k.income_growth.max(1.0);
            record.set(schema, feature, raised) && raised != income
        }

        Lever::Urbanization => {
            if record.value_or_zero(feature) >= 0.5 {
                return false;
            }
            let p = ctx.target / 100.0 * k.urbanization_uptake;
            if u < p.clamp(0.0, 1.0) {
                record.insert(feature, 1.0);
                return true;
            }
            false
        }

        Lever::SavingsPromotion => promote_savings(record, draws, ctx),

        Lever::IncomeDiversification => {
            let Some(income_feature) = schema.income_feature.as_deref() else { return false };
            if record.value_or_zero(income_feature) <= 0.0
                || record.income_diversity(schema) >= k.diversification_max_sources
                || u >= k.diversification_prob.clamp(0.0, 1.0)
            {
                return false;
            }
            let missing = DIVERSIFICATION_ORDER
                .iter()
                .find(|s| schema.is_income_source(s) && record.value_or_zero(s) < 0.5);
            match missing {
                Some(source) => record.set(schema, source, 1.0),
                None => false,
            }
        }
    }
}

fn step_up(record: &mut FeatureRecord, feature: &str, current: f64, step: f64, max: f64, hit: bool) -> bool {
    if !hit {
        return false;
    }
    let next = (current + step).min(max).max(current);
    record.insert(feature, next);
    next != current
}

/// Saving turns on the master flag and lifts the behaviour score;
/// becoming a regular saver lifts the frequency scale. The other flags
/// only switch on. Dependents are never touched while the master is off.
fn promote_savings(record: &mut FeatureRecord, draws: &[f64], ctx: &LeverContext) -> bool {
    let k = &ctx.constants.savings;
    let schema = ctx.config.schema();
    let Some(master) = schema.savings_master.as_deref() else { return false };
    let draw = |i: usize| draws.get(i).copied().unwrap_or(1.0);
    let mut changed = false;

    if record.value_or_zero(master) < 0.5 {
        if draw(0) >= k.saves_money_prob {
            return false;
        }
        record.set(schema, master, 1.0);
        raise_score(record, ctx, "Savings_Behavior_Score", k.score_cap);
        changed = true;
    }

    let flags = [
        ("Regular_Saver", k.regular_saver_prob, 1),
        ("Diverse_Savings_Reasons", k.diverse_reasons_prob, 2),
        ("Old_Age_Planning", k.old_age_plan_prob, 3),
    ];
    for (flag, p, i) in flags {
        if ctx.config.has_feature(flag) && record.value_or_zero(flag) < 0.5 && draw(i) < p {
            record.set(schema, flag, 1.0);
            if flag == "Regular_Saver" {
                raise_score(record, ctx, "savings_frequency_numeric", k.score_cap);
            }
            changed = true;
        }
    }

    changed
}

fn raise_score(record: &mut FeatureRecord, ctx: &LeverContext, feature: &str, cap: f64) {
    if !ctx.config.has_feature(feature) {
        return;
    }
    let score = record.value_or_zero(feature);
    let raised = (score + 1.0).min(cap).max(score);
    record.set(ctx.config.schema(), feature, raised);
}

/// Clone `population` and apply `levers` (a subset of `plan.changed`)
/// using trial `trial`'s streams.
#[allow(clippy::too_many_arguments)]
pub fn perturb_population(
    config: &ModelConfig,
    constants: &LeverConstants,
    plan: &LeverPlan,
    levels: &BaselineLevels,
    population: &[FeatureRecord],
    levers: &[Lever],
    bank: &RngBank,
    trial: TrialIndex,
) -> Vec<FeatureRecord> {
    let mut perturbed = population.to_vec();

    for &lever in levers {
        let ctx = LeverContext {
            config,
            constants,
            target: plan.target(lever),
            current: levels.level(lever).unwrap_or(0.0),
        };
        let mut rng = bank.for_stream(trial, lever.stream_slot());
        let mut draws = vec![0.0; lever.draws_per_record()];
        let mut upgraded = 0usize;

        for record in perturbed.iter_mut() {
            rng.fill_uniform(&mut draws);
            if apply_lever(lever, record, &draws, &ctx) {
                upgraded += 1;
            }
        }
        log::debug!(
            "trial={trial} stream={} target={} upgraded={upgraded}/{}",
            rng.name,
            ctx.target,
            perturbed.len()
        );
    }

    perturbed
}
