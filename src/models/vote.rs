use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Up,
    Down,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Up => "up",
            VoteKind::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteTarget {
    Tip,
    Post,
}

impl VoteTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteTarget::Tip => "tip",
            VoteTarget::Post => "post",
        }
    }
}

/// Ledger row: the current vote of one user on one tip or post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub target: VoteTarget,
    pub target_id: ObjectId,
    pub kind: VoteKind,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote: VoteKind,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    /// The caller's vote after the request, `None` when toggled off
    pub vote: Option<VoteKind>,
    pub upvotes: i64,
    pub downvotes: i64,
}
