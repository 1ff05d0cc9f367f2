use crate::ml::season::Season;
use crate::models::search::TravelType;

pub const DEFAULT_POPULARITY: f64 = 75.0;

const INTERCEPT: f64 = 5000.0;
const PER_DAY: f64 = 800.0;
const PER_TRAVEL_TYPE: f64 = 1500.0;
const PER_COMFORT_POINT: f64 = 20.0;
const PER_POPULARITY_POINT: f64 = 15.0;

pub const MIN_BUDGET: i64 = 3000;
pub const MAX_BUDGET: i64 = 100_000;

/// Inputs to the budget formula.
#[derive(Debug, Clone, Copy)]
pub struct BudgetInput {
    pub days: u32,
    pub travel_type_code: u8,
    pub season_comfort: f64,
    pub popularity: f64,
}

impl BudgetInput {
    pub fn new(
        days: u32,
        travel_type: Option<TravelType>,
        season: Season,
        average_popularity: Option<f64>,
    ) -> Self {
        Self {
            days,
            travel_type_code: TravelType::code_or_default(travel_type),
            season_comfort: season.comfort_score(),
            popularity: average_popularity.unwrap_or(DEFAULT_POPULARITY),
        }
    }
}

/// Estimated trip budget in whole rupees, clamped to `[MIN_BUDGET, MAX_BUDGET]`.
pub fn estimate_budget(input: &BudgetInput) -> i64 {
    let days = input.days.max(1) as f64;
    let raw = INTERCEPT
        + PER_DAY * days
        + PER_TRAVEL_TYPE * input.travel_type_code as f64
        + PER_COMFORT_POINT * input.season_comfort
        + PER_POPULARITY_POINT * input.popularity;

    (raw.round() as i64).clamp(MIN_BUDGET, MAX_BUDGET)
}

/// Mean popularity of the catalogue, `None` when there is nothing to average.
pub fn average_popularity<I>(scores: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), score| (sum + score, count + 1));
    (count > 0).then(|| sum / count as f64)
}
