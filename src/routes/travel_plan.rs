use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;
use mongodb::Database;

use crate::db::mongo::{DESTINATIONS, TRAVEL_PLANS};
use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::travel_plan::{TravelPlan, TravelPlanInput};
use crate::routes::parse_id;

async fn checked_destination(db: &Database, input: &TravelPlanInput) -> Result<ObjectId, ApiError> {
    input.validate().map_err(ApiError::BadRequest)?;
    let destination_id = parse_id(&input.destination_id)?;

    let exists = db
        .collection::<Document>(DESTINATIONS)
        .find_one(doc! { "_id": destination_id })
        .await?
        .is_some();
    if !exists {
        return Err(ApiError::NotFound("Destination".to_string()));
    }
    Ok(destination_id)
}

/// Plans are only visible to their owner; anyone else gets a 404.
fn owned(plan_id: ObjectId, user: &AuthenticatedUser) -> Document {
    doc! { "_id": plan_id, "user_id": user.user_id }
}

/*
    /api/plans
*/
pub async fn list(
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> Result<HttpResponse, ApiError> {
    let cursor = db
        .collection::<TravelPlan>(TRAVEL_PLANS)
        .find(doc! { "user_id": user.user_id })
        .sort(doc! { "start_date": 1, "_id": 1 })
        .await?;
    let plans: Vec<TravelPlan> = cursor.try_collect().await?;

    Ok(HttpResponse::Ok().json(plans))
}

/*
    /api/plans
*/
pub async fn create(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    input: web::Json<TravelPlanInput>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let destination_id = checked_destination(&db, &input).await?;

    let now = Utc::now();
    let mut plan = TravelPlan {
        id: None,
        user_id: user.user_id,
        destination_id,
        title: input.title.trim().to_string(),
        start_date: input.start_date,
        end_date: input.end_date,
        travel_type: input.travel_type,
        budget: input.budget,
        notes: input.notes,
        created_at: Some(now),
        updated_at: Some(now),
    };
    let result = db
        .collection::<TravelPlan>(TRAVEL_PLANS)
        .insert_one(&plan)
        .await?;
    plan.id = result.inserted_id.as_object_id();

    Ok(HttpResponse::Created().json(plan))
}

/*
    /api/plans/{id}
*/
pub async fn get_by_id(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let plan_id = parse_id(&path)?;
    let plan = db
        .collection::<TravelPlan>(TRAVEL_PLANS)
        .find_one(owned(plan_id, &user))
        .await?
        .ok_or_else(|| ApiError::NotFound("Travel plan".to_string()))?;

    Ok(HttpResponse::Ok().json(plan))
}

/*
    /api/plans/{id}
*/
pub async fn update(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    input: web::Json<TravelPlanInput>,
) -> Result<HttpResponse, ApiError> {
    let plan_id = parse_id(&path)?;
    let input = input.into_inner();
    let destination_id = checked_destination(&db, &input).await?;

    let changes = doc! {
        "destination_id": destination_id,
        "title": input.title.trim(),
        "start_date": mongodb::bson::to_bson(&input.start_date)
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        "end_date": mongodb::bson::to_bson(&input.end_date)
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        "travel_type": mongodb::bson::to_bson(&input.travel_type)
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        "budget": input.budget,
        "notes": input.notes,
        "updated_at": Utc::now().to_rfc3339(),
    };

    let plan = db
        .collection::<TravelPlan>(TRAVEL_PLANS)
        .find_one_and_update(owned(plan_id, &user), doc! { "$set": changes })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| ApiError::NotFound("Travel plan".to_string()))?;

    Ok(HttpResponse::Ok().json(plan))
}

/*
    /api/plans/{id}
*/
pub async fn delete(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let plan_id = parse_id(&path)?;
    let result = db
        .collection::<TravelPlan>(TRAVEL_PLANS)
        .delete_one(owned(plan_id, &user))
        .await?;

    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("Travel plan".to_string()));
    }
    Ok(HttpResponse::NoContent().finish())
}
