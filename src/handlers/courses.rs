use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::models::{ErrorResponse, Language};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(custom = "validate_query")]
    pub q: String,
    pub lang: Option<Language>,
    pub num_items: Option<u32>,
}

fn validate_query(q: &str) -> Result<(), ValidationError> {
    if q.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Search query cannot be empty".into());
        return Err(error);
    }
    Ok(())
}

/// JSON 400 bodies for query-string deserialization failures (missing `q`,
/// unsupported `lang`, non-numeric `num_items`).
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::with_details("Invalid query parameters", err.to_string());
        actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
            .into()
    })
}

pub async fn search_courses(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse> {
    // Validate request
    if let Err(e) = params.validate() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::with_details(
            "Invalid query parameters",
            format!("Validation error: {}", e),
        )));
    }

    let max_items = state.config.search.max_num_items;
    let num_items = params
        .num_items
        .unwrap_or(state.config.search.default_num_items);
    if num_items == 0 || num_items > max_items {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::with_details(
            "Invalid query parameters",
            format!("num_items must be between 1 and {}", max_items),
        )));
    }

    let query = params.q.trim();
    let lang = params.lang.unwrap_or_default();

    debug!(
        query,
        lang = lang.full_name(),
        num_items,
        "dispatching course search"
    );

    let response = state.aggregator.search(query, lang, num_items).await;
    Ok(HttpResponse::Ok().json(response))
}
