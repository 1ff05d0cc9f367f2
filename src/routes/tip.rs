use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Database;
use serde::Deserialize;

use crate::db::mongo::{DESTINATIONS, TIPS};
use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::ml::season::Season;
use crate::models::tip::{NewTip, Tip};
use crate::models::vote::{VoteRequest, VoteTarget};
use crate::routes::parse_id;
use crate::services::vote_service::{self, MongoVoteStore};

const MAX_TIP_LENGTH: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct TipQuery {
    pub season: Option<Season>,
}

/// Tips for a destination; with a season, only tips for that season or for
/// no particular season.
fn tips_filter(destination_id: mongodb::bson::oid::ObjectId, season: Option<Season>) -> Document {
    match season {
        Some(season) => doc! {
            "destination_id": destination_id,
            "$or": [
                { "season": season.as_str() },
                { "season": null },
            ],
        },
        None => doc! { "destination_id": destination_id },
    }
}

/*
    /api/destinations/{id}/tips
*/
pub async fn list_for_destination(
    db: web::Data<Database>,
    path: web::Path<String>,
    query: web::Query<TipQuery>,
) -> Result<HttpResponse, ApiError> {
    let destination_id = parse_id(&path)?;
    let cursor = db
        .collection::<Tip>(TIPS)
        .find(tips_filter(destination_id, query.season))
        .sort(doc! { "is_featured": -1, "upvotes": -1, "_id": 1 })
        .await?;
    let tips: Vec<Tip> = cursor.try_collect().await?;

    Ok(HttpResponse::Ok().json(tips))
}

/*
    /api/destinations/{id}/tips
*/
pub async fn create(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    input: web::Json<NewTip>,
) -> Result<HttpResponse, ApiError> {
    let destination_id = parse_id(&path)?;
    let input = input.into_inner();
    let content = input.content.trim();
    if content.is_empty() || content.chars().count() > MAX_TIP_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "tip content must be between 1 and {} characters",
            MAX_TIP_LENGTH
        )));
    }

    let exists = db
        .collection::<Document>(DESTINATIONS)
        .find_one(doc! { "_id": destination_id })
        .await?
        .is_some();
    if !exists {
        return Err(ApiError::NotFound("Destination".to_string()));
    }

    let mut tip = Tip {
        id: None,
        destination_id,
        user_id: user.user_id,
        content: content.to_string(),
        season: input.season,
        upvotes: 0,
        downvotes: 0,
        is_featured: false,
        created_at: Some(Utc::now()),
    };
    let result = db.collection::<Tip>(TIPS).insert_one(&tip).await?;
    tip.id = result.inserted_id.as_object_id();

    Ok(HttpResponse::Created().json(tip))
}

/*
    /api/tips/{id}/vote
*/
pub async fn vote(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    input: web::Json<VoteRequest>,
) -> Result<HttpResponse, ApiError> {
    let tip_id = parse_id(&path)?;
    let store = MongoVoteStore::new(db.get_ref().clone());
    let response =
        vote_service::apply_vote(&store, user.user_id, VoteTarget::Tip, tip_id, input.vote)
            .await?;
    Ok(HttpResponse::Ok().json(response))
}
