use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Database;
use serde::Deserialize;

use crate::db::mongo::{DESTINATIONS, POSTS, REPLIES};
use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::post::{NewPost, NewReply, Post, PostWithReplies, Reply};
use crate::models::vote::{VoteRequest, VoteTarget};
use crate::routes::parse_id;
use crate::services::community_service::{self, MongoCommunityStore};
use crate::services::vote_service::{self, MongoVoteStore};

const MAX_TITLE_LENGTH: usize = 200;
const MAX_CONTENT_LENGTH: usize = 5000;
const PAGE_SIZE: i64 = 50;
const MAX_PAGE: u64 = 10_000;

#[derive(Debug, Deserialize)]
pub struct PostQuery {
    pub destination_id: Option<String>,
    pub page: Option<u64>,
}

/// Documents to skip for a zero-based page.
fn page_offset(page: Option<u64>) -> Result<u64, ApiError> {
    let page = page.unwrap_or(0);
    if page > MAX_PAGE {
        return Err(ApiError::BadRequest(format!(
            "page must be at most {}",
            MAX_PAGE
        )));
    }
    Ok(page.saturating_mul(PAGE_SIZE as u64))
}

fn require_text(value: &str, field: &str, max: usize) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max {
        return Err(ApiError::BadRequest(format!(
            "{} must be between 1 and {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

/*
    /api/posts
*/
pub async fn list(
    db: web::Data<Database>,
    query: web::Query<PostQuery>,
) -> Result<HttpResponse, ApiError> {
    let mut filter = Document::new();
    if let Some(destination_id) = query.destination_id.as_deref() {
        filter.insert("destination_id", parse_id(destination_id)?);
    }
    let skip = page_offset(query.page)?;

    let cursor = db
        .collection::<Post>(POSTS)
        .find(filter)
        .sort(doc! { "_id": -1 })
        .skip(skip)
        .limit(PAGE_SIZE)
        .await?;
    let posts: Vec<Post> = cursor.try_collect().await?;

    Ok(HttpResponse::Ok().json(posts))
}

/*
    /api/posts/{id}
*/
pub async fn get_by_id(
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let post = db
        .collection::<Post>(POSTS)
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

    let cursor = db
        .collection::<Reply>(REPLIES)
        .find(doc! { "post_id": id })
        .sort(doc! { "_id": 1 })
        .await?;
    let replies: Vec<Reply> = cursor.try_collect().await?;

    Ok(HttpResponse::Ok().json(PostWithReplies { post, replies }))
}

/*
    /api/posts
*/
pub async fn create(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    input: web::Json<NewPost>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let title = require_text(&input.title, "title", MAX_TITLE_LENGTH)?;
    let content = require_text(&input.content, "content", MAX_CONTENT_LENGTH)?;

    let destination_id = match input.destination_id.as_deref() {
        Some(raw) => {
            let id = parse_id(raw)?;
            let exists = db
                .collection::<Document>(DESTINATIONS)
                .find_one(doc! { "_id": id })
                .await?
                .is_some();
            if !exists {
                return Err(ApiError::NotFound("Destination".to_string()));
            }
            Some(id)
        }
        None => None,
    };

    let now = Utc::now();
    let mut post = Post {
        id: None,
        user_id: user.user_id,
        title,
        content,
        destination_id,
        upvotes: 0,
        downvotes: 0,
        replies_count: 0,
        created_at: Some(now),
        updated_at: Some(now),
    };
    let result = db.collection::<Post>(POSTS).insert_one(&post).await?;
    post.id = result.inserted_id.as_object_id();

    Ok(HttpResponse::Created().json(post))
}

/*
    /api/posts/{id}/replies
*/
pub async fn add_reply(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    input: web::Json<NewReply>,
) -> Result<HttpResponse, ApiError> {
    let post_id = parse_id(&path)?;
    let content = require_text(&input.content, "content", MAX_CONTENT_LENGTH)?;

    let store = MongoCommunityStore::new(db.get_ref().clone());
    let reply = community_service::add_reply(&store, user.user_id, post_id, content).await?;

    Ok(HttpResponse::Created().json(reply))
}

/*
    /api/posts/{id}/replies/{reply_id}
*/
pub async fn delete_reply(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (post_id, reply_id) = path.into_inner();
    let post_id = parse_id(&post_id)?;
    let reply_id = parse_id(&reply_id)?;

    let store = MongoCommunityStore::new(db.get_ref().clone());
    community_service::delete_reply(&store, user.user_id, post_id, reply_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/*
    /api/posts/{id}/vote
*/
pub async fn vote(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    input: web::Json<VoteRequest>,
) -> Result<HttpResponse, ApiError> {
    let post_id = parse_id(&path)?;
    let store = MongoVoteStore::new(db.get_ref().clone());
    let response =
        vote_service::apply_vote(&store, user.user_id, VoteTarget::Post, post_id, input.vote)
            .await?;
    Ok(HttpResponse::Ok().json(response))
}
