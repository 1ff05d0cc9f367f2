use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::ml::season::Season;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Typical trip cost in whole rupees
    pub average_budget: f64,
    pub average_duration_days: i32,
    /// 0-100
    pub popularity_score: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Weather and suitability of one destination in one season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalWeather {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub destination_id: ObjectId,
    pub season: Season,
    /// Raw suitability for the season, 0-100
    pub seasonal_score: f64,
    pub comfort_score: f64,
    pub avg_temperature_c: Option<f64>,
    pub rainfall_mm: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub description: Option<String>,
}
