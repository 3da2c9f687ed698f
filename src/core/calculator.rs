use crate::domain::model::{AverageSummary, Module};

pub const PASS_THRESHOLD: f64 = 10.0;

/// Σ(coef × avg) / Σcoef, or `None` when there is nothing to weigh.
pub fn weighted_average(modules: &[Module]) -> Option<f64> {
    let total_coefficients: f64 = modules.iter().map(|m| m.coefficient).sum();
    if modules.is_empty() || total_coefficients == 0.0 {
        return None;
    }
    let weighted_total: f64 = modules.iter().map(Module::weighted_score).sum();
    Some(weighted_total / total_coefficients)
}

pub fn summarize(modules: &[Module]) -> Option<AverageSummary> {
    let average = weighted_average(modules)?;
    Some(AverageSummary {
        average,
        total_coefficients: modules.iter().map(|m| m.coefficient).sum(),
        weighted_total: modules.iter().map(Module::weighted_score).sum(),
        passed: average >= PASS_THRESHOLD,
    })
}
