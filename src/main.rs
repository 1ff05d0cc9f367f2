use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use tourism_api::config::AppConfig;
use tourism_api::db::mongo;
use tourism_api::routes;
use tourism_api::services::recommendation_service::{
    MongoRecommendationStore, RecommendationService,
};

fn cors(origin: Option<&str>) -> Cors {
    let cors = match origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };
    cors.allow_any_method().allow_any_header().max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()));
        }
    };

    let client = mongo::create_mongo_client(&config.mongo_uri)
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;
    let db = client.database(&config.database_name);

    if let Err(err) = mongo::ensure_indexes(&db).await {
        log::warn!("Failed to ensure indexes: {}", err);
    }

    let recommendations = web::Data::new(RecommendationService::new(Arc::new(
        MongoRecommendationStore::new(db.clone()),
    )));
    let auth_config = config.auth.clone();
    let cors_origin = config.cors_origin.clone();

    log::info!("Starting HTTP server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(cors_origin.as_deref()))
            .wrap(Logger::default())
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(auth_config.clone()))
            .app_data(recommendations.clone())
            .configure(|cfg| routes::configure(cfg, &auth_config))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
