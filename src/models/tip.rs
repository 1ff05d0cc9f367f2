use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::ml::season::Season;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub destination_id: ObjectId,
    pub user_id: ObjectId,
    pub content: String,
    pub season: Option<Season>,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NewTip {
    pub content: String,
    pub season: Option<Season>,
}
