use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Database,
};

use crate::db::mongo::{BOOKMARKS, DESTINATIONS, POSTS, REPLIES};
use crate::error::{is_duplicate_key, ApiError};
use crate::models::bookmark::Bookmark;
use crate::models::post::{Post, Reply};

/// Writes behind replies and bookmarks, where a row and a counter or a
/// unique pair have to stay in step.
#[async_trait]
pub trait CommunityStore: Send + Sync {
    async fn post_exists(&self, post_id: ObjectId) -> Result<bool, ApiError>;

    async fn destination_exists(&self, destination_id: ObjectId) -> Result<bool, ApiError>;

    async fn insert_reply(&self, reply: &Reply) -> Result<Option<ObjectId>, ApiError>;

    async fn find_reply(
        &self,
        post_id: ObjectId,
        reply_id: ObjectId,
    ) -> Result<Option<Reply>, ApiError>;

    /// Remove a reply written by `user_id`. `false` when nothing was removed.
    async fn delete_reply(&self, reply_id: ObjectId, user_id: ObjectId) -> Result<bool, ApiError>;

    /// Move `replies_count` by `delta`, never below zero.
    async fn adjust_replies_count(&self, post_id: ObjectId, delta: i64) -> Result<(), ApiError>;

    /// Store a bookmark. `None` when the user already bookmarked the destination.
    async fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<Option<ObjectId>, ApiError>;

    async fn delete_bookmark(
        &self,
        user_id: ObjectId,
        destination_id: ObjectId,
    ) -> Result<bool, ApiError>;
}

pub struct MongoCommunityStore {
    db: Database,
}

impl MongoCommunityStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommunityStore for MongoCommunityStore {
    async fn post_exists(&self, post_id: ObjectId) -> Result<bool, ApiError> {
        Ok(self
            .db
            .collection::<Document>(POSTS)
            .find_one(doc! { "_id": post_id })
            .await?
            .is_some())
    }

    async fn destination_exists(&self, destination_id: ObjectId) -> Result<bool, ApiError> {
        Ok(self
            .db
            .collection::<Document>(DESTINATIONS)
            .find_one(doc! { "_id": destination_id })
            .await?
            .is_some())
    }

    async fn insert_reply(&self, reply: &Reply) -> Result<Option<ObjectId>, ApiError> {
        let result = self.db.collection::<Reply>(REPLIES).insert_one(reply).await?;
        Ok(result.inserted_id.as_object_id())
    }

    async fn find_reply(
        &self,
        post_id: ObjectId,
        reply_id: ObjectId,
    ) -> Result<Option<Reply>, ApiError> {
        Ok(self
            .db
            .collection::<Reply>(REPLIES)
            .find_one(doc! { "_id": reply_id, "post_id": post_id })
            .await?)
    }

    async fn delete_reply(&self, reply_id: ObjectId, user_id: ObjectId) -> Result<bool, ApiError> {
        let result = self
            .db
            .collection::<Reply>(REPLIES)
            .delete_one(doc! { "_id": reply_id, "user_id": user_id })
            .await?;
        Ok(result.deleted_count == 1)
    }

    async fn adjust_replies_count(&self, post_id: ObjectId, delta: i64) -> Result<(), ApiError> {
        let mut filter = doc! { "_id": post_id };
        if delta < 0 {
            filter.insert("replies_count", doc! { "$gte": -delta });
        }
        self.db
            .collection::<Post>(POSTS)
            .update_one(filter, doc! { "$inc": { "replies_count": delta } })
            .await?;
        Ok(())
    }

    async fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<Option<ObjectId>, ApiError> {
        match self
            .db
            .collection::<Bookmark>(BOOKMARKS)
            .insert_one(bookmark)
            .await
        {
            Ok(result) => Ok(result.inserted_id.as_object_id()),
            Err(err) if is_duplicate_key(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_bookmark(
        &self,
        user_id: ObjectId,
        destination_id: ObjectId,
    ) -> Result<bool, ApiError> {
        let result = self
            .db
            .collection::<Bookmark>(BOOKMARKS)
            .delete_one(doc! { "user_id": user_id, "destination_id": destination_id })
            .await?;
        Ok(result.deleted_count == 1)
    }
}

/// Store a reply and bump the post's reply counter. The reply is removed
/// again if the counter cannot be moved.
pub async fn add_reply(
    store: &dyn CommunityStore,
    user_id: ObjectId,
    post_id: ObjectId,
    content: String,
) -> Result<Reply, ApiError> {
    if !store.post_exists(post_id).await? {
        return Err(ApiError::NotFound("Post".to_string()));
    }

    let mut reply = Reply {
        id: None,
        post_id,
        user_id,
        content,
        created_at: Some(Utc::now()),
    };
    reply.id = store.insert_reply(&reply).await?;

    if let Err(err) = store.adjust_replies_count(post_id, 1).await {
        if let Some(reply_id) = reply.id {
            if let Err(undo) = store.delete_reply(reply_id, user_id).await {
                log::error!("Failed to remove reply {} after counter error: {}", reply_id, undo);
            }
        }
        return Err(err);
    }

    Ok(reply)
}

/// Delete a reply by its author. Only the request that removed the row
/// moves the counter.
pub async fn delete_reply(
    store: &dyn CommunityStore,
    user_id: ObjectId,
    post_id: ObjectId,
    reply_id: ObjectId,
) -> Result<(), ApiError> {
    let reply = store
        .find_reply(post_id, reply_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reply".to_string()))?;
    if reply.user_id != user_id {
        return Err(ApiError::Forbidden(
            "only the author can delete a reply".to_string(),
        ));
    }

    if store.delete_reply(reply_id, user_id).await? {
        store.adjust_replies_count(post_id, -1).await?;
    }
    Ok(())
}

pub async fn add_bookmark(
    store: &dyn CommunityStore,
    user_id: ObjectId,
    destination_id: ObjectId,
) -> Result<Bookmark, ApiError> {
    if !store.destination_exists(destination_id).await? {
        return Err(ApiError::NotFound("Destination".to_string()));
    }

    let mut bookmark = Bookmark {
        id: None,
        user_id,
        destination_id,
        created_at: Some(Utc::now()),
    };
    match store.insert_bookmark(&bookmark).await? {
        Some(id) => bookmark.id = Some(id),
        None => return Err(ApiError::Conflict("Bookmark already exists".to_string())),
    }

    Ok(bookmark)
}

pub async fn remove_bookmark(
    store: &dyn CommunityStore,
    user_id: ObjectId,
    destination_id: ObjectId,
) -> Result<(), ApiError> {
    if !store.delete_bookmark(user_id, destination_id).await? {
        return Err(ApiError::NotFound("Bookmark".to_string()));
    }
    Ok(())
}
