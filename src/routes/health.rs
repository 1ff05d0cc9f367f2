use actix_web::{web, HttpResponse};
use mongodb::{bson::doc, Database};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(db: Option<web::Data<Database>>) -> HttpResponse {
    let mongo = match db {
        Some(db) => check_mongodb(&db).await,
        None => ServiceStatus {
            status: "error".to_string(),
            details: Some("Database not configured".to_string()),
        },
    };

    let status = if mongo.status == "ok" { "ok" } else { "degraded" };

    let mut services = HashMap::new();
    services.insert("mongodb".to_string(), mongo);

    HttpResponse::Ok().json(HealthStatus {
        status: status.to_string(),
        services,
        environment: env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_mongodb(db: &Database) -> ServiceStatus {
    match db.run_command(doc! {"ping": 1}).await {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Connected successfully to MongoDB".to_string()),
        },
        Err(e) => {
            log::error!("MongoDB health check failed: {}", e);
            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("Failed to connect: {}", e)),
            }
        }
    }
}
