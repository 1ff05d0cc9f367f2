//! Normalised [0, 1] suitability curves for the three ranking dimensions.

pub const SEASONAL_THRESHOLD: f64 = 60.0;
pub const NEUTRAL_BUDGET_FITNESS: f64 = 0.5;

/// Seasonal fitness with a steep penalty below `threshold`.
///
/// Below the threshold the score maps onto `[0, 0.5)`, at or above it the
/// remaining range maps linearly onto `[0.5, 1]`.
pub fn seasonal_fitness(seasonal_score: f64, threshold: f64) -> f64 {
    let fitness = if seasonal_score < threshold {
        seasonal_score / (threshold * 2.0)
    } else {
        0.5 + (seasonal_score - threshold) / (100.0 - threshold) * 0.5
    };
    fitness.clamp(0.0, 1.0)
}

/// Budget fitness of a destination against what the traveller can spend.
///
/// At or under budget rewards cheaper trips in `[0.7, 1]`; over budget
/// decays quadratically and hits zero once the ratio passes `1 + 1/sqrt(2)`.
pub fn budget_fitness(destination_budget: f64, user_budget: Option<f64>) -> f64 {
    let user_budget = match user_budget {
        Some(budget) if budget > 0.0 => budget,
        _ => return NEUTRAL_BUDGET_FITNESS,
    };

    let ratio = destination_budget / user_budget;
    let fitness = if ratio <= 1.0 {
        0.7 + (1.0 - ratio) * 0.3
    } else {
        1.0 - (ratio - 1.0).powi(2) * 2.0
    };
    fitness.clamp(0.0, 1.0)
}

pub fn popularity_fitness(popularity_score: f64) -> f64 {
    (popularity_score / 100.0).clamp(0.0, 1.0)
}
