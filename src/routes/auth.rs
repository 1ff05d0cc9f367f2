use actix_web::{web, HttpResponse};
use chrono::Utc;
use mongodb::bson::doc;
use mongodb::Database;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::db::mongo::USERS;
use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::user::{SigninRequest, SignupRequest, User, UserSession};
use crate::services::auth_service;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/*
    /api/auth/signup
*/
pub async fn signup(
    db: web::Data<Database>,
    auth: web::Data<AuthConfig>,
    input: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let email = input.email.trim().to_lowercase();
    auth_service::validate_credentials(&email, &input.password).map_err(ApiError::BadRequest)?;

    let now = Utc::now();
    let user = User {
        id: None,
        email: email.clone(),
        password: auth_service::hash_password(&input.password)?,
        name: input.name.filter(|name| !name.trim().is_empty()),
        last_signin: None,
        failed_signins: Some(0),
        created_at: Some(now),
        updated_at: Some(now),
    };

    let collection = db.collection::<User>(USERS);
    let result = collection.insert_one(&user).await.map_err(|err| {
        let err = ApiError::from(err);
        match err {
            ApiError::Conflict(_) => ApiError::Conflict("User already exists".to_string()),
            other => other,
        }
    })?;

    let user_id = result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| ApiError::Internal("inserted user has no ObjectId".to_string()))?;

    log::info!("New user signed up: {}", user_id);

    let token =
        auth_service::generate_token(&email, user_id, &auth.jwt_secret, auth.token_ttl_hours)?;
    Ok(HttpResponse::Created().json(TokenResponse { auth_token: token }))
}

/*
    /api/auth/signin
*/
pub async fn signin(
    db: web::Data<Database>,
    auth: web::Data<AuthConfig>,
    input: web::Json<SigninRequest>,
) -> Result<HttpResponse, ApiError> {
    let input = input.into_inner();
    let email = input.email.trim().to_lowercase();
    let collection = db.collection::<User>(USERS);

    let user = collection
        .find_one(doc! { "email": &email })
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if !auth_service::verify_password(&input.password, &user.password) {
        collection
            .update_one(
                doc! { "email": &email },
                doc! { "$inc": { "failed_signins": 1 } },
            )
            .await?;
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal("stored user has no id".to_string()))?;

    collection
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "last_signin": Utc::now().to_rfc3339(), "failed_signins": 0 } },
        )
        .await?;

    let token =
        auth_service::generate_token(&email, user_id, &auth.jwt_secret, auth.token_ttl_hours)?;
    Ok(HttpResponse::Ok().json(TokenResponse { auth_token: token }))
}

/*
    /api/auth/session
*/
pub async fn session(
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> Result<HttpResponse, ApiError> {
    let stored = db
        .collection::<User>(USERS)
        .find_one(doc! { "_id": user.user_id })
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    Ok(HttpResponse::Ok().json(UserSession {
        id: user.user_id,
        email: stored.email,
        name: stored.name.unwrap_or_default(),
        created_at: stored.created_at.unwrap_or_default(),
    }))
}
