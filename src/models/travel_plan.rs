use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::search::TravelType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelPlan {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub destination_id: ObjectId,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub travel_type: Option<TravelType>,
    pub budget: Option<f64>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of create and update requests.
#[derive(Debug, Clone, Deserialize)]
pub struct TravelPlanInput {
    pub destination_id: String,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub travel_type: Option<TravelType>,
    pub budget: Option<f64>,
    pub notes: Option<String>,
}

impl TravelPlanInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err("end_date must not be before start_date".to_string());
            }
        }
        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err("budget must not be negative".to_string());
            }
        }
        Ok(())
    }

    /// Trip length in days, counting both ends.
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((end - start).num_days() + 1),
            _ => None,
        }
    }
}
