use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Database;
use serde::Deserialize;

use crate::db::mongo::{DESTINATIONS, SEASONAL_WEATHER};
use crate::error::ApiError;
use crate::models::destination::{Destination, SeasonalWeather};
use crate::routes::parse_id;

const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct DestinationQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

fn destination_filter(query: &DestinationQuery) -> Document {
    let mut filter = Document::new();
    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        filter.insert(
            "category",
            doc! { "$regex": format!("^{}$", regex::escape(category)), "$options": "i" },
        );
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = regex::escape(search);
        filter.insert(
            "$or",
            vec![
                doc! { "name": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "tags": { "$regex": pattern.as_str(), "$options": "i" } },
            ],
        );
    }
    filter
}

/*
    /api/destinations
*/
pub async fn list(
    db: web::Data<Database>,
    query: web::Query<DestinationQuery>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.limit.unwrap_or(MAX_LIMIT).clamp(1, MAX_LIMIT);
    let cursor = db
        .collection::<Destination>(DESTINATIONS)
        .find(destination_filter(&query))
        .sort(doc! { "popularity_score": -1, "_id": 1 })
        .limit(limit)
        .await?;
    let destinations: Vec<Destination> = cursor.try_collect().await?;

    Ok(HttpResponse::Ok().json(destinations))
}

/*
    /api/destinations/{id}
*/
pub async fn get_by_id(
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let destination = db
        .collection::<Destination>(DESTINATIONS)
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| ApiError::NotFound("Destination".to_string()))?;

    Ok(HttpResponse::Ok().json(destination))
}

/*
    /api/destinations/{id}/weather
*/
pub async fn weather(
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let cursor = db
        .collection::<SeasonalWeather>(SEASONAL_WEATHER)
        .find(doc! { "destination_id": id })
        .await?;
    let rows: Vec<SeasonalWeather> = cursor.try_collect().await?;

    Ok(HttpResponse::Ok().json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_matches_everything() {
        let query = DestinationQuery {
            category: None,
            search: Some(String::new()),
            limit: None,
        };
        assert!(destination_filter(&query).is_empty());
    }

    #[test]
    fn test_search_is_escaped() {
        let query = DestinationQuery {
            category: Some("beach".to_string()),
            search: Some("goa.*".to_string()),
            limit: None,
        };
        let filter = destination_filter(&query);
        assert!(filter.contains_key("category"));
        let alternatives = filter.get_array("$or").unwrap();
        let name = alternatives[0].as_document().unwrap().get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"goa\.\*");
    }
}
