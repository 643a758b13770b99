//! rankforge-api library interface
//!
//! Exposes the router and application state so integration tests can drive
//! the HTTP surface without binding a socket.

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use rankforge_common::config::{DelayConfig, ServerConfig};
use rankforge_common::{Clusterer, Estimator, Store, UniformEstimator};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Every project and plan the process holds
    pub store: Arc<Store>,
    pub clusterer: Clusterer,
    pub estimator: Arc<dyn Estimator>,
    pub delays: DelayConfig,
    /// Deployment name reported by /healthz
    pub env: String,
    pub allowed_origins: Vec<String>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// State backed by the uniform-random estimator
    pub fn new(config: &ServerConfig) -> rankforge_common::Result<Self> {
        let estimator = UniformEstimator::new(config.ranges.clone())?;
        Ok(Self::with_estimator(config, Arc::new(estimator)))
    }

    /// State backed by any estimator implementation
    pub fn with_estimator(config: &ServerConfig, estimator: Arc<dyn Estimator>) -> Self {
        Self {
            store: Arc::new(Store::new()),
            clusterer: Clusterer::new(config.clustering.policy),
            estimator,
            delays: config.delays.clone(),
            env: config.env.clone(),
            allowed_origins: config.cors.allowed_origins.clone(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .merge(api::health_routes())
        .merge(api::project_routes())
        .merge(api::keyword_routes())
        .merge(api::plan_routes())
        .merge(api::research_routes())
        .fallback(api::route_not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Turn a handler panic into a JSON 500 instead of a dropped connection
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Request handler panicked: {}", detail);

    ApiError::Internal("Request handler failed".to_string()).into_response()
}

/// CORS for the development front-end origins
///
/// Credentials are allowed, so methods and headers mirror the preflight
/// request instead of using a wildcard.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Skipping invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
