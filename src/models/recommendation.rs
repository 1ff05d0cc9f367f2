use serde::Serialize;

use crate::ml::season::Season;
use crate::models::{destination::Destination, tip::Tip};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub destination: Destination,
    /// 0-100
    pub match_score: u32,
    pub seasonal_match: f64,
    pub budget_fit: f64,
    pub tips: Vec<Tip>,
    pub reasons: Vec<String>,
    /// 0-100
    pub confidence: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub season: Season,
    /// Budget used for scoring, explicit or estimated
    pub budget: Option<f64>,
    pub budget_estimated: bool,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetEstimate {
    pub days: u32,
    pub travel_type_code: u8,
    pub season: Season,
    pub estimated_budget: i64,
}
