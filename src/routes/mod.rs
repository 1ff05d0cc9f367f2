use actix_web::web;
use mongodb::bson::oid::ObjectId;

use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::middleware::auth::AuthMiddleware;

pub mod auth;
pub mod bookmark;
pub mod destination;
pub mod health;
pub mod post;
pub mod recommendation;
pub mod tip;
pub mod travel_plan;

pub fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    Ok(ObjectId::parse_str(id)?)
}

/// Register every route. Shared by the server and the HTTP tests.
///
/// Scopes that are protected end to end sit behind [`AuthMiddleware`]; paths
/// mixing public reads and authenticated writes rely on the
/// `AuthenticatedUser` extractor instead.
pub fn configure(cfg: &mut web::ServiceConfig, auth_config: &AuthConfig) {
    let secret = auth_config.jwt_secret.clone();

    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .route("/signup", web::post().to(auth::signup))
                        .route("/signin", web::post().to(auth::signin))
                        .service(
                            web::resource("/session")
                                .wrap(AuthMiddleware::new(secret.clone()))
                                .route(web::get().to(auth::session)),
                        ),
                )
                .route(
                    "/season/current",
                    web::get().to(recommendation::current_season),
                )
                .service(
                    web::scope("/recommendations")
                        .route(
                            "/estimate-budget",
                            web::get().to(recommendation::estimate_budget),
                        )
                        .service(
                            web::resource("")
                                .route(web::get().to(recommendation::recommend_query))
                                .route(web::post().to(recommendation::recommend)),
                        ),
                )
                .service(
                    web::scope("/destinations")
                        .route("", web::get().to(destination::list))
                        .route("/{id}", web::get().to(destination::get_by_id))
                        .route("/{id}/weather", web::get().to(destination::weather))
                        .service(
                            web::resource("/{id}/tips")
                                .route(web::get().to(tip::list_for_destination))
                                .route(web::post().to(tip::create)),
                        ),
                )
                .service(
                    web::scope("/tips")
                        .wrap(AuthMiddleware::new(secret.clone()))
                        .route("/{id}/vote", web::post().to(tip::vote)),
                )
                .service(
                    web::scope("/posts")
                        .service(
                            web::resource("")
                                .route(web::get().to(post::list))
                                .route(web::post().to(post::create)),
                        )
                        .route("/{id}", web::get().to(post::get_by_id))
                        .route("/{id}/replies", web::post().to(post::add_reply))
                        .route(
                            "/{id}/replies/{reply_id}",
                            web::delete().to(post::delete_reply),
                        )
                        .route("/{id}/vote", web::post().to(post::vote)),
                )
                .service(
                    web::scope("/bookmarks")
                        .wrap(AuthMiddleware::new(secret.clone()))
                        .service(
                            web::resource("")
                                .route(web::get().to(bookmark::list))
                                .route(web::post().to(bookmark::add)),
                        )
                        .route("/{destination_id}", web::delete().to(bookmark::remove)),
                )
                .service(
                    web::scope("/plans")
                        .wrap(AuthMiddleware::new(secret))
                        .service(
                            web::resource("")
                                .route(web::get().to(travel_plan::list))
                                .route(web::post().to(travel_plan::create)),
                        )
                        .service(
                            web::resource("/{id}")
                                .route(web::get().to(travel_plan::get_by_id))
                                .route(web::put().to(travel_plan::update))
                                .route(web::delete().to(travel_plan::delete)),
                        ),
                ),
        );
}
