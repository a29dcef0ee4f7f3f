use actix_web::{web, HttpResponse, Result};

use crate::models::{ErrorResponse, HealthResponse, MessageResponse};
use crate::AppState;

pub async fn index() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Welcome to the Free Courses API! 🚀".to_string(),
    }))
}

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        youtube_configured: state.config.youtube.api_key.is_some(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

pub async fn not_found() -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(ErrorResponse::new("Endpoint not found")))
}
