//! Keyword research endpoint
//!
//! Runs a simulated research pass for a query and returns fabricated
//! opportunity numbers. Runs are not stored.

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use rankforge_common::ids::TimestampIds;
use rankforge_common::models::ResearchRun;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::required_text;
use crate::{ApiError, ApiResult, AppState};

static RESEARCH_IDS: TimestampIds = TimestampIds::new("research");

const DEFAULT_DEPTH: &str = "standard";

#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub depth: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResearchResponse {
    pub success: bool,
    pub results: ResearchRun,
}

/// POST /research/run
pub async fn run_research(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> ApiResult<Json<ResearchResponse>> {
    let query = required_text(&request.query, "query")
        .map_err(|_| ApiError::BadRequest("Query is required".to_string()))?;
    let domains: Vec<String> = request
        .domains
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect();
    let depth = request
        .depth
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DEPTH.to_string());

    tokio::time::sleep(state.delays.research()).await;

    let estimate = state.estimator.estimate_research(&query);
    let run = ResearchRun {
        id: RESEARCH_IDS.next(),
        query,
        domains,
        depth,
        status: "completed".to_string(),
        findings: estimate.findings,
        opportunities: estimate.opportunities,
        created_at: Utc::now(),
    };

    info!(
        research_id = %run.id,
        query = %run.query,
        opportunities = run.findings.total_opportunities,
        "Research run complete"
    );
    Ok(Json(ResearchResponse {
        success: true,
        results: run,
    }))
}

pub fn research_routes() -> Router<AppState> {
    Router::new().route("/research/run", post(run_research))
}
