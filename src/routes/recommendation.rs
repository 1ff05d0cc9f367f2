use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::ApiError;
use crate::ml::season::Season;
use crate::models::search::{SearchParams, SearchQuery};
use crate::services::recommendation_service::RecommendationService;

#[derive(Serialize)]
struct CurrentSeason {
    season: Season,
    comfort_score: f64,
}

async fn run(
    service: &RecommendationService,
    params: SearchParams,
) -> Result<HttpResponse, ApiError> {
    params.validate().map_err(ApiError::BadRequest)?;
    let response = service.recommend(&params).await;
    Ok(HttpResponse::Ok().json(response))
}

/*
    POST /api/recommendations
*/
pub async fn recommend(
    service: web::Data<RecommendationService>,
    input: web::Json<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    run(&service, input.into_inner()).await
}

/*
    GET /api/recommendations
*/
pub async fn recommend_query(
    service: web::Data<RecommendationService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    run(&service, query.into_inner().into()).await
}

/*
    GET /api/recommendations/estimate-budget
*/
pub async fn estimate_budget(
    service: web::Data<RecommendationService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let params: SearchParams = query.into_inner().into();
    params.validate().map_err(ApiError::BadRequest)?;
    Ok(HttpResponse::Ok().json(service.estimate(&params).await))
}

/*
    GET /api/season/current
*/
pub async fn current_season() -> HttpResponse {
    let season = Season::current();
    HttpResponse::Ok().json(CurrentSeason {
        season,
        comfort_score: season.comfort_score(),
    })
}
