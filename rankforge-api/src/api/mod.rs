//! HTTP API handlers for rankforge-api

pub mod health;
pub mod keywords;
pub mod plans;
pub mod projects;
pub mod research;

pub use health::health_routes;
pub use keywords::keyword_routes;
pub use plans::plan_routes;
pub use projects::project_routes;
pub use research::research_routes;

use axum::http::{Method, Uri};

use crate::error::ApiError;

/// Fallback for unknown routes
pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {} {}", method, uri.path()))
}

/// Trim every keyword and drop blank entries
///
/// An empty result is rejected: every endpoint that takes keywords needs at
/// least one.
pub(crate) fn normalize_keywords(raw: Vec<String>) -> Result<Vec<String>, ApiError> {
    let keywords: Vec<String> = raw
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    if keywords.is_empty() {
        return Err(ApiError::BadRequest(
            "Keywords array is required and must contain at least one keyword".to_string(),
        ));
    }
    Ok(keywords)
}

/// Trimmed value of a required text field
pub(crate) fn required_text(value: &str, field: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Reject authority targets outside the 0-100 scale
pub(crate) fn check_target_da(target_da: Option<u32>) -> Result<(), ApiError> {
    match target_da {
        Some(value) if value > 100 => Err(ApiError::BadRequest(format!(
            "target DA must be between 0 and 100, got {}",
            value
        ))),
        _ => Ok(()),
    }
}
