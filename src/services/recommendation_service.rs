use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Database,
};

use crate::db::mongo::{DESTINATIONS, SEASONAL_WEATHER, TIPS};
use crate::error::ApiError;
use crate::ml::budget::{average_popularity, estimate_budget, BudgetInput};
use crate::ml::ranker::{DestinationRanker, RankedDestination};
use crate::ml::season::Season;
use crate::models::destination::{Destination, SeasonalWeather};
use crate::models::recommendation::{BudgetEstimate, Recommendation, RecommendationResponse};
use crate::models::search::SearchParams;
use crate::models::tip::Tip;

pub const TIPS_PER_RECOMMENDATION: i64 = 3;
const MAX_REASONS: usize = 4;

/// Reads the recommendation pipeline needs from storage.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn all_destinations(&self) -> Result<Vec<Destination>, ApiError>;

    async fn seasonal_weather(&self, season: Season) -> Result<Vec<SeasonalWeather>, ApiError>;

    /// Up to `limit` tips for a destination, most upvoted first.
    async fn top_tips(&self, destination_id: ObjectId, limit: i64) -> Result<Vec<Tip>, ApiError>;
}

pub struct MongoRecommendationStore {
    db: Database,
}

impl MongoRecommendationStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecommendationStore for MongoRecommendationStore {
    async fn all_destinations(&self) -> Result<Vec<Destination>, ApiError> {
        let cursor = self
            .db
            .collection::<Destination>(DESTINATIONS)
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn seasonal_weather(&self, season: Season) -> Result<Vec<SeasonalWeather>, ApiError> {
        let cursor = self
            .db
            .collection::<SeasonalWeather>(SEASONAL_WEATHER)
            .find(doc! { "season": season.as_str() })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn top_tips(&self, destination_id: ObjectId, limit: i64) -> Result<Vec<Tip>, ApiError> {
        let cursor = self
            .db
            .collection::<Tip>(TIPS)
            .find(doc! { "destination_id": destination_id })
            .sort(doc! { "upvotes": -1, "_id": 1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

/// Resolved inputs of one recommendation request.
#[derive(Debug, Clone, Copy)]
struct ResolvedSearch {
    season: Season,
    budget: Option<f64>,
    budget_estimated: bool,
    explicit_budget: bool,
}

pub struct RecommendationService {
    store: Arc<dyn RecommendationStore>,
    ranker: DestinationRanker,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn RecommendationStore>) -> Self {
        Self {
            store,
            ranker: DestinationRanker::new(),
        }
    }

    pub fn with_ranker(store: Arc<dyn RecommendationStore>, ranker: DestinationRanker) -> Self {
        Self { store, ranker }
    }

    /// Rank the catalogue for a search. Storage failures are logged and
    /// produce an empty list instead of an error.
    pub async fn recommend(&self, params: &SearchParams) -> RecommendationResponse {
        let season = params.season.unwrap_or_else(Season::current);

        let destinations = match self.store.all_destinations().await {
            Ok(destinations) => destinations,
            Err(err) => {
                log::error!("Failed to load destinations for recommendations: {}", err);
                return empty_response(season, params.budget, false);
            }
        };

        let resolved = resolve_search(params, season, &destinations);

        if destinations.is_empty() {
            log::warn!("No destinations available to recommend");
            return empty_response(season, resolved.budget, resolved.budget_estimated);
        }

        let seasonal_scores: HashMap<ObjectId, f64> =
            match self.store.seasonal_weather(season).await {
                Ok(rows) => rows
                    .into_iter()
                    .map(|row| (row.destination_id, row.seasonal_score))
                    .collect(),
                Err(err) => {
                    log::error!("Failed to load {} weather for recommendations: {}", season, err);
                    return empty_response(season, resolved.budget, resolved.budget_estimated);
                }
            };

        let ranked = self
            .ranker
            .rank(&destinations, &seasonal_scores, resolved.budget);

        let recommendations = self.assemble(ranked, &resolved).await;

        log::info!(
            "Recommended {} destinations for season {} (budget {:?}, estimated: {})",
            recommendations.len(),
            season,
            resolved.budget,
            resolved.budget_estimated
        );

        RecommendationResponse {
            season,
            budget: resolved.budget,
            budget_estimated: resolved.budget_estimated,
            recommendations,
        }
    }

    /// Budget estimate for a trip, using the catalogue's average popularity.
    pub async fn estimate(&self, params: &SearchParams) -> BudgetEstimate {
        let season = params.season.unwrap_or_else(Season::current);
        let days = params.days.unwrap_or(1).max(1);

        let popularity = match self.store.all_destinations().await {
            Ok(destinations) => average_popularity(destinations.iter().map(|d| d.popularity_score)),
            Err(err) => {
                log::warn!("Falling back to default popularity for estimate: {}", err);
                None
            }
        };

        let input = BudgetInput::new(days, params.travel_type(), season, popularity);
        BudgetEstimate {
            days,
            travel_type_code: input.travel_type_code,
            season,
            estimated_budget: estimate_budget(&input),
        }
    }

    async fn assemble(
        &self,
        ranked: Vec<RankedDestination>,
        resolved: &ResolvedSearch,
    ) -> Vec<Recommendation> {
        let futures = ranked.into_iter().map(|ranked| async move {
            let tips = match ranked.destination.id {
                Some(id) => match self.store.top_tips(id, TIPS_PER_RECOMMENDATION).await {
                    Ok(tips) => tips,
                    Err(err) => {
                        log::warn!("Failed to load tips for {}: {}", ranked.destination.name, err);
                        Vec::new()
                    }
                },
                None => Vec::new(),
            };
            build_recommendation(ranked, tips, resolved)
        });

        // join_all keeps the ranked order.
        join_all(futures).await
    }
}

fn empty_response(
    season: Season,
    budget: Option<f64>,
    budget_estimated: bool,
) -> RecommendationResponse {
    RecommendationResponse {
        season,
        budget,
        budget_estimated,
        recommendations: Vec::new(),
    }
}

/// An explicit budget wins; otherwise a known trip length lets the
/// estimator fill one in. With neither, budget fitness stays neutral.
fn resolve_search(
    params: &SearchParams,
    season: Season,
    destinations: &[Destination],
) -> ResolvedSearch {
    if let Some(budget) = params.budget {
        return ResolvedSearch {
            season,
            budget: Some(budget),
            budget_estimated: false,
            explicit_budget: true,
        };
    }

    match params.days {
        Some(days) => {
            let popularity = average_popularity(destinations.iter().map(|d| d.popularity_score));
            let input = BudgetInput::new(days, params.travel_type(), season, popularity);
            ResolvedSearch {
                season,
                budget: Some(estimate_budget(&input) as f64),
                budget_estimated: true,
                explicit_budget: false,
            }
        }
        None => ResolvedSearch {
            season,
            budget: None,
            budget_estimated: false,
            explicit_budget: false,
        },
    }
}

fn build_recommendation(
    ranked: RankedDestination,
    tips: Vec<Tip>,
    resolved: &ResolvedSearch,
) -> Recommendation {
    let breakdown = ranked.breakdown;
    let reasons = generate_reasons(&ranked, resolved.season, !tips.is_empty());
    let confidence = confidence(
        breakdown.seasonal_fit,
        breakdown.budget_fit,
        !tips.is_empty(),
        resolved.explicit_budget,
    );

    Recommendation {
        destination: ranked.destination,
        match_score: ranked.match_score,
        seasonal_match: breakdown.seasonal_fit,
        budget_fit: breakdown.budget_fit,
        tips,
        reasons,
        confidence,
    }
}

pub fn generate_reasons(ranked: &RankedDestination, season: Season, has_tips: bool) -> Vec<String> {
    let breakdown = &ranked.breakdown;
    let destination = &ranked.destination;
    let mut reasons = Vec::new();

    if breakdown.seasonal_fit > 0.8 {
        reasons.push(format!("Perfect for {} season", season));
    } else if breakdown.seasonal_fit > 0.6 {
        reasons.push(format!("Good option for {} travel", season));
    }

    if breakdown.budget_fit > 0.8 {
        reasons.push("Matches your budget perfectly".to_string());
    } else if breakdown.budget_fit > 0.6 {
        reasons.push("Within your budget range".to_string());
    }

    if destination.popularity_score > 80.0 {
        reasons.push("Highly rated by travelers".to_string());
    } else if destination.popularity_score > 60.0 {
        reasons.push("Popular destination".to_string());
    }

    if !destination.category.trim().is_empty() {
        reasons.push(format!("{} experience", capitalize(destination.category.trim())));
    }

    if has_tips {
        reasons.push("Community tips available".to_string());
    }

    if reasons.is_empty() {
        reasons.push("Matches your search".to_string());
    }
    reasons.truncate(MAX_REASONS);
    reasons
}

/// Confidence as a 0-100 percentage.
pub fn confidence(
    seasonal_fit: f64,
    budget_fit: f64,
    has_tips: bool,
    explicit_budget: bool,
) -> u32 {
    let mut value = (seasonal_fit + budget_fit) / 2.0;
    if has_tips {
        value += 0.10;
    }
    if explicit_budget {
        value += 0.05;
    }
    (value * 100.0).round().clamp(0.0, 100.0) as u32
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
