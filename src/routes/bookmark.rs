use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Database;

use crate::db::mongo::BOOKMARKS;
use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::bookmark::{Bookmark, NewBookmark};
use crate::routes::parse_id;
use crate::services::community_service::{self, MongoCommunityStore};

/*
    /api/bookmarks
*/
pub async fn list(
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> Result<HttpResponse, ApiError> {
    let cursor = db
        .collection::<Bookmark>(BOOKMARKS)
        .find(doc! { "user_id": user.user_id })
        .sort(doc! { "_id": -1 })
        .await?;
    let bookmarks: Vec<Bookmark> = cursor.try_collect().await?;

    Ok(HttpResponse::Ok().json(bookmarks))
}

/*
    /api/bookmarks
*/
pub async fn add(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    input: web::Json<NewBookmark>,
) -> Result<HttpResponse, ApiError> {
    let destination_id = parse_id(&input.destination_id)?;
    let store = MongoCommunityStore::new(db.get_ref().clone());
    let bookmark = community_service::add_bookmark(&store, user.user_id, destination_id).await?;

    Ok(HttpResponse::Created().json(bookmark))
}

/*
    /api/bookmarks/{destination_id}
*/
pub async fn remove(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let destination_id = parse_id(&path)?;
    let store = MongoCommunityStore::new(db.get_ref().clone());
    community_service::remove_bookmark(&store, user.user_id, destination_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
