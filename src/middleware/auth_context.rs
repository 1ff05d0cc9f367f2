use std::future::{ready, Ready};

use actix_web::{
    dev::Payload, error::ErrorUnauthorized, web, Error, FromRequest, HttpMessage, HttpRequest,
};
use mongodb::bson::oid::ObjectId;

use crate::config::AuthConfig;
use crate::middleware::auth::Claims;
use crate::services::auth_service;

/// The caller behind an authenticated request.
///
/// Uses the claims stored by [`AuthMiddleware`](super::auth::AuthMiddleware)
/// when present, otherwise decodes the `Bearer` token itself.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: ObjectId,
    pub email: String,
}

impl AuthenticatedUser {
    fn from_claims(claims: &Claims) -> Option<Self> {
        ObjectId::parse_str(&claims.user_id)
            .ok()
            .map(|user_id| AuthenticatedUser {
                user_id,
                email: claims.sub.clone(),
            })
    }
}

fn claims_from_header(req: &HttpRequest) -> Option<Claims> {
    let auth = req.app_data::<web::Data<AuthConfig>>()?;
    let token = req
        .headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;

    auth_service::decode_token(token, &auth.jwt_secret).ok()
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let stored = req.extensions().get::<Claims>().cloned();
        let user = stored
            .or_else(|| claims_from_header(req))
            .as_ref()
            .and_then(AuthenticatedUser::from_claims);

        match user {
            Some(user) => ready(Ok(user)),
            None => ready(Err(ErrorUnauthorized("User not authenticated"))),
        }
    }
}
