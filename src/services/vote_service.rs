use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::ReturnDocument,
    Collection, Database,
};

use crate::db::mongo::{POSTS, TIPS, VOTES};
use crate::error::{is_duplicate_key, ApiError};
use crate::models::vote::{Vote, VoteKind, VoteResponse, VoteTarget};

/// What a vote request does to the caller's existing vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No previous vote: record it.
    Cast(VoteKind),
    /// Same direction again: remove it.
    Retract(VoteKind),
    /// Opposite direction: flip it.
    Switch { from: VoteKind, to: VoteKind },
}

impl VoteTransition {
    pub fn resolve(existing: Option<VoteKind>, requested: VoteKind) -> Self {
        match existing {
            None => VoteTransition::Cast(requested),
            Some(previous) if previous == requested => VoteTransition::Retract(requested),
            Some(previous) => VoteTransition::Switch {
                from: previous,
                to: requested,
            },
        }
    }

    /// Change to the (upvotes, downvotes) counters.
    pub fn counter_delta(&self) -> (i64, i64) {
        let delta = |kind: VoteKind, amount: i64| match kind {
            VoteKind::Up => (amount, 0),
            VoteKind::Down => (0, amount),
        };
        match *self {
            VoteTransition::Cast(kind) => delta(kind, 1),
            VoteTransition::Retract(kind) => delta(kind, -1),
            VoteTransition::Switch { from, to } => {
                let (up_from, down_from) = delta(from, -1);
                let (up_to, down_to) = delta(to, 1);
                (up_from + up_to, down_from + down_to)
            }
        }
    }

    /// The caller's vote once the transition is applied.
    pub fn resulting_vote(&self) -> Option<VoteKind> {
        match *self {
            VoteTransition::Cast(kind) => Some(kind),
            VoteTransition::Retract(_) => None,
            VoteTransition::Switch { to, .. } => Some(to),
        }
    }
}

/// Ledger and counter writes behind a vote.
#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn target_exists(
        &self,
        target: VoteTarget,
        target_id: ObjectId,
    ) -> Result<bool, ApiError>;

    async fn current_vote(
        &self,
        user_id: ObjectId,
        target_id: ObjectId,
    ) -> Result<Option<VoteKind>, ApiError>;

    /// Record a first vote. `false` when the user already has one.
    async fn insert_vote(&self, vote: &Vote) -> Result<bool, ApiError>;

    /// Remove the vote if it still points `kind`.
    async fn delete_vote(
        &self,
        user_id: ObjectId,
        target_id: ObjectId,
        kind: VoteKind,
    ) -> Result<bool, ApiError>;

    /// Flip the vote if it still points `from`.
    async fn switch_vote(
        &self,
        user_id: ObjectId,
        target_id: ObjectId,
        from: VoteKind,
        to: VoteKind,
    ) -> Result<bool, ApiError>;

    /// Move the counters and return them as (upvotes, downvotes), `None` when
    /// the target is gone.
    async fn increment_counters(
        &self,
        target: VoteTarget,
        target_id: ObjectId,
        upvotes: i64,
        downvotes: i64,
    ) -> Result<Option<(i64, i64)>, ApiError>;
}

pub struct MongoVoteStore {
    db: Database,
}

impl MongoVoteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn targets(&self, target: VoteTarget) -> Collection<Document> {
        let name = match target {
            VoteTarget::Tip => TIPS,
            VoteTarget::Post => POSTS,
        };
        self.db.collection::<Document>(name)
    }

    fn votes(&self) -> Collection<Vote> {
        self.db.collection::<Vote>(VOTES)
    }
}

#[async_trait]
impl VoteStore for MongoVoteStore {
    async fn target_exists(
        &self,
        target: VoteTarget,
        target_id: ObjectId,
    ) -> Result<bool, ApiError> {
        Ok(self
            .targets(target)
            .find_one(doc! { "_id": target_id })
            .await?
            .is_some())
    }

    async fn current_vote(
        &self,
        user_id: ObjectId,
        target_id: ObjectId,
    ) -> Result<Option<VoteKind>, ApiError> {
        let vote = self
            .votes()
            .find_one(doc! { "user_id": user_id, "target_id": target_id })
            .await?;
        Ok(vote.map(|v| v.kind))
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<bool, ApiError> {
        match self.votes().insert_one(vote).await {
            Ok(_) => Ok(true),
            Err(err) if is_duplicate_key(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_vote(
        &self,
        user_id: ObjectId,
        target_id: ObjectId,
        kind: VoteKind,
    ) -> Result<bool, ApiError> {
        let filter = doc! { "user_id": user_id, "target_id": target_id, "kind": kind.as_str() };
        Ok(self.votes().delete_one(filter).await?.deleted_count == 1)
    }

    async fn switch_vote(
        &self,
        user_id: ObjectId,
        target_id: ObjectId,
        from: VoteKind,
        to: VoteKind,
    ) -> Result<bool, ApiError> {
        let filter = doc! { "user_id": user_id, "target_id": target_id, "kind": from.as_str() };
        let result = self
            .votes()
            .update_one(filter, doc! { "$set": { "kind": to.as_str() } })
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn increment_counters(
        &self,
        target: VoteTarget,
        target_id: ObjectId,
        upvotes: i64,
        downvotes: i64,
    ) -> Result<Option<(i64, i64)>, ApiError> {
        let updated = self
            .targets(target)
            .find_one_and_update(
                doc! { "_id": target_id },
                doc! { "$inc": { "upvotes": upvotes, "downvotes": downvotes } },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated.map(|document| {
            (
                counter(&document, "upvotes"),
                counter(&document, "downvotes"),
            )
        }))
    }
}

async fn write_ledger(
    store: &dyn VoteStore,
    user_id: ObjectId,
    target: VoteTarget,
    target_id: ObjectId,
    transition: VoteTransition,
) -> Result<bool, ApiError> {
    match transition {
        VoteTransition::Cast(kind) => {
            let vote = Vote {
                id: None,
                user_id,
                target,
                target_id,
                kind,
                created_at: Some(Utc::now()),
            };
            store.insert_vote(&vote).await
        }
        VoteTransition::Retract(kind) => store.delete_vote(user_id, target_id, kind).await,
        VoteTransition::Switch { from, to } => {
            store.switch_vote(user_id, target_id, from, to).await
        }
    }
}

/// Put the ledger back the way it was before `transition`.
async fn undo_ledger(
    store: &dyn VoteStore,
    user_id: ObjectId,
    target: VoteTarget,
    target_id: ObjectId,
    transition: VoteTransition,
) -> Result<bool, ApiError> {
    let reverse = match transition {
        VoteTransition::Cast(kind) => VoteTransition::Retract(kind),
        VoteTransition::Retract(kind) => VoteTransition::Cast(kind),
        VoteTransition::Switch { from, to } => VoteTransition::Switch { from: to, to: from },
    };
    write_ledger(store, user_id, target, target_id, reverse).await
}

/// Apply a vote on a tip or post.
///
/// The ledger write is conditional on the state the transition was computed
/// from, and counters only move through `$inc` once that write succeeded, so
/// concurrent requests cannot double count. A request that loses a race gets
/// a conflict and may be resent. When the counters cannot be moved the ledger
/// write is undone, so a retry starts from the same state.
pub async fn apply_vote(
    store: &dyn VoteStore,
    user_id: ObjectId,
    target: VoteTarget,
    target_id: ObjectId,
    requested: VoteKind,
) -> Result<VoteResponse, ApiError> {
    if !store.target_exists(target, target_id).await? {
        return Err(ApiError::NotFound(capitalized(target)));
    }

    let existing = store.current_vote(user_id, target_id).await?;
    let transition = VoteTransition::resolve(existing, requested);

    if !write_ledger(store, user_id, target, target_id, transition).await? {
        log::warn!(
            "Concurrent vote on {} {} by {}, rejecting",
            target.as_str(),
            target_id,
            user_id
        );
        return Err(ApiError::Conflict(
            "vote changed concurrently, please retry".to_string(),
        ));
    }

    let (up, down) = transition.counter_delta();
    let counters = match store.increment_counters(target, target_id, up, down).await {
        Ok(Some(counters)) => counters,
        outcome => {
            if let Err(err) = undo_ledger(store, user_id, target, target_id, transition).await {
                log::error!(
                    "Failed to undo vote {:?} on {} {} by {}: {}",
                    transition,
                    target.as_str(),
                    target_id,
                    user_id,
                    err
                );
            }
            return match outcome {
                Err(err) => Err(err),
                _ => Err(ApiError::NotFound(capitalized(target))),
            };
        }
    };

    log::debug!(
        "Vote {:?} on {} {} by {}",
        transition,
        target.as_str(),
        target_id,
        user_id
    );

    Ok(VoteResponse {
        vote: transition.resulting_vote(),
        upvotes: counters.0,
        downvotes: counters.1,
    })
}

fn counter(document: &Document, field: &str) -> i64 {
    document
        .get_i64(field)
        .or_else(|_| document.get_i32(field).map(i64::from))
        .unwrap_or(0)
}

fn capitalized(target: VoteTarget) -> String {
    match target {
        VoteTarget::Tip => "Tip".to_string(),
        VoteTarget::Post => "Post".to_string(),
    }
}
