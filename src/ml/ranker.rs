use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::ml::fitness::{budget_fitness, popularity_fitness, seasonal_fitness, SEASONAL_THRESHOLD};
use crate::models::destination::Destination;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingWeights {
    /// Weight of the seasonal fitness
    pub seasonal_weight: f64,
    /// Weight of the budget fitness
    pub budget_weight: f64,
    /// Weight of the popularity fitness
    pub popularity_weight: f64,
    /// Minimum match score (0-100) required to appear in results
    pub minimum_score: u32,
    /// Maximum number of ranked destinations returned
    pub max_results: usize,
    /// Seasonal score below which destinations are penalised
    pub seasonal_threshold: f64,
    /// Seasonal score used when a destination has no row for the season
    pub default_seasonal_score: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            seasonal_weight: 0.40,
            budget_weight: 0.30,
            popularity_weight: 0.30,
            minimum_score: 40,
            max_results: 10,
            seasonal_threshold: SEASONAL_THRESHOLD,
            default_seasonal_score: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub seasonal_fit: f64,
    pub budget_fit: f64,
    pub popularity_fit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedDestination {
    pub destination: Destination,
    pub match_score: u32,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Default)]
pub struct DestinationRanker {
    pub weights: RankingWeights,
}

impl DestinationRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: RankingWeights) -> Self {
        Self { weights }
    }

    /// Weighted 0-100 match score for a set of fitness values.
    pub fn combine(&self, breakdown: &ScoreBreakdown) -> u32 {
        let weighted = breakdown.seasonal_fit * self.weights.seasonal_weight
            + breakdown.budget_fit * self.weights.budget_weight
            + breakdown.popularity_fit * self.weights.popularity_weight;

        (100.0 * weighted).round().clamp(0.0, 100.0) as u32
    }

    pub fn score_destination(
        &self,
        destination: &Destination,
        seasonal_score: Option<f64>,
        user_budget: Option<f64>,
    ) -> RankedDestination {
        let seasonal_score = seasonal_score.unwrap_or(self.weights.default_seasonal_score);

        let breakdown = ScoreBreakdown {
            seasonal_fit: seasonal_fitness(seasonal_score, self.weights.seasonal_threshold),
            budget_fit: budget_fitness(destination.average_budget, user_budget),
            popularity_fit: popularity_fitness(destination.popularity_score),
        };

        RankedDestination {
            destination: destination.clone(),
            match_score: self.combine(&breakdown),
            breakdown,
        }
    }

    /// Score every destination, drop weak matches and keep the best few.
    ///
    /// Ties keep the input order, so identical inputs always rank identically.
    pub fn rank(
        &self,
        destinations: &[Destination],
        seasonal_scores: &HashMap<ObjectId, f64>,
        user_budget: Option<f64>,
    ) -> Vec<RankedDestination> {
        let mut ranked: Vec<RankedDestination> = destinations
            .iter()
            .map(|destination| {
                let seasonal_score = destination
                    .id
                    .and_then(|id| seasonal_scores.get(&id).copied());
                self.score_destination(destination, seasonal_score, user_budget)
            })
            .filter(|ranked| ranked.match_score >= self.weights.minimum_score)
            .collect();

        ranked.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        ranked.truncate(self.weights.max_results);

        log::debug!(
            "Ranked {} of {} destinations",
            ranked.len(),
            destinations.len()
        );

        ranked
    }
}
