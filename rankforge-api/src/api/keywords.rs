//! Keyword intake and direct clustering endpoints
//!
//! Intake turns every cluster into a stored plan. Direct clustering only
//! reports clusters, after a configurable simulated-work pause.

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use rankforge_common::models::{Cluster, IntakeOptions, Plan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::info;

use super::{normalize_keywords, required_text};
use crate::{ApiError, ApiResult, AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    pub project_id: u64,
    pub domain: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub options: IntakeOptions,
}

#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    pub project_id: u64,
    pub domain: String,
    pub clusters: Vec<Cluster>,
    pub plans_created: usize,
    /// Cluster name -> plan id; on name collisions the later cluster wins
    pub details: BTreeMap<String, u64>,
    /// Cluster id -> plan id; one entry per cluster
    pub plan_ids: BTreeMap<String, u64>,
    pub options: IntakeOptions,
}

#[derive(Debug, Deserialize)]
pub struct ClusterRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Cluster decorated with estimator difficulty and volume
#[derive(Debug, Serialize)]
pub struct ScoredCluster {
    #[serde(flatten)]
    pub cluster: Cluster,
    pub difficulty: u32,
    pub volume: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResponse {
    pub success: bool,
    pub clusters: Vec<ScoredCluster>,
    pub total_keywords: usize,
    pub processing_time: String,
}

fn validate_options(options: &IntakeOptions) -> ApiResult<()> {
    if !(0.0..=1.0).contains(&options.avg_link_strength) {
        return Err(ApiError::BadRequest(format!(
            "options.avg_link_strength must be between 0 and 1, got {}",
            options.avg_link_strength
        )));
    }
    if options.kd_bucket > 100 {
        return Err(ApiError::BadRequest(format!(
            "options.kd_bucket must be between 0 and 100, got {}",
            options.kd_bucket
        )));
    }
    Ok(())
}

/// `2.04s` style elapsed time
pub fn format_processing_time(elapsed: Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /keywords/intake
///
/// Clusters the keywords and stores one plan per cluster. Nothing is written
/// unless the project exists.
pub async fn keyword_intake(
    State(state): State<AppState>,
    Json(request): Json<IntakeRequest>,
) -> ApiResult<Json<IntakeResponse>> {
    let domain = required_text(&request.domain, "domain")?;
    let keywords = normalize_keywords(request.keywords)?;
    validate_options(&request.options)?;

    let project = state.store.projects.get(request.project_id).await?;

    let clusters = state.clusterer.cluster(&keywords);
    let estimates: Vec<_> = clusters
        .iter()
        .map(|cluster| {
            let metrics = state
                .estimator
                .estimate_plan(&cluster.primary_keyword, &domain, None);
            (cluster.primary_keyword.clone(), metrics)
        })
        .collect();

    let plans = state
        .store
        .plans
        .append_batch(estimates, |id, (keyword, metrics)| Plan {
            id,
            project_id: project.id,
            keyword,
            domain: domain.clone(),
            metrics,
            created_at: Utc::now(),
        })
        .await;

    let mut details = BTreeMap::new();
    let mut plan_ids = BTreeMap::new();
    for (cluster, plan) in clusters.iter().zip(&plans) {
        details.insert(cluster.name.clone(), plan.id);
        plan_ids.insert(cluster.id.clone(), plan.id);
    }

    info!(
        project_id = project.id,
        keywords = keywords.len(),
        clusters = clusters.len(),
        policy = %state.clusterer.policy(),
        "Keyword intake complete"
    );

    Ok(Json(IntakeResponse {
        project_id: project.id,
        domain,
        plans_created: plans.len(),
        clusters,
        details,
        plan_ids,
        options: request.options,
    }))
}

/// POST /keywords/cluster
pub async fn cluster_keywords(
    State(state): State<AppState>,
    Json(request): Json<ClusterRequest>,
) -> ApiResult<Json<ClusterResponse>> {
    let keywords = normalize_keywords(request.keywords)?;
    let started = Instant::now();

    tokio::time::sleep(state.delays.cluster()).await;

    let clusters: Vec<ScoredCluster> = state
        .clusterer
        .cluster(&keywords)
        .into_iter()
        .map(|cluster| {
            let estimate = state.estimator.estimate_cluster(&cluster);
            ScoredCluster {
                cluster,
                difficulty: estimate.difficulty,
                volume: estimate.volume,
            }
        })
        .collect();

    let processing_time = format_processing_time(started.elapsed());
    info!(
        keywords = keywords.len(),
        clusters = clusters.len(),
        processing_time = %processing_time,
        "Keywords clustered"
    );

    Ok(Json(ClusterResponse {
        success: true,
        clusters,
        total_keywords: keywords.len(),
        processing_time,
    }))
}

pub fn keyword_routes() -> Router<AppState> {
    Router::new()
        .route("/keywords/intake", post(keyword_intake))
        .route("/keywords/cluster", post(cluster_keywords))
}
