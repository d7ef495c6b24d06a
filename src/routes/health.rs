use std::collections::HashMap;
use std::env;

use actix_web::{HttpResponse, Responder};
use serde::Serialize;

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

/*
    GET /
*/
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "message": "여행 플래너 AI API" }))
}

/*
    GET /health
*/
pub async fn health_check() -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let composer_status = check_key("OPENAI_API_KEY");
    health
        .services
        .insert("composer".to_string(), composer_status.clone());

    let geocoder_status = check_key("KAKAO_REST_API_KEY");
    health
        .services
        .insert("geocoder".to_string(), geocoder_status.clone());

    // geocoding is optional, a missing key degrades instead of failing
    if composer_status.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

fn check_key(name: &str) -> ServiceStatus {
    match env::var(name) {
        Ok(key) => {
            let masked = if key.len() > 8 {
                format!("{}***{}", &key[0..4], &key[key.len() - 4..])
            } else {
                "***".to_string()
            };
            ServiceStatus {
                status: "ok".to_string(),
                details: Some(format!("{} configured ({})", name, masked)),
            }
        }
        Err(_) => ServiceStatus {
            status: "error".to_string(),
            details: Some(format!("{} not configured", name)),
        },
    }
}
