//! Plan endpoints
//!
//! `/plans/auto` stores a single-keyword plan. `/plans/generate` and
//! `/plans/create` return roadmap plans that are never stored; their ids are
//! timestamp strings rather than store ids.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use rankforge_common::ids::TimestampIds;
use rankforge_common::models::{
    default_roadmap, CampaignMetrics, Plan, ProjectStatus, RoadmapPlan,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{check_target_da, normalize_keywords, required_text};
use crate::{ApiError, ApiResult, AppState};

static GENERATED_PLAN_IDS: TimestampIds = TimestampIds::new("auto-plan");
static NAMED_PLAN_IDS: TimestampIds = TimestampIds::new("plan");

/// Authority target used when the caller supplies none
const DEFAULT_TARGET_DA: u32 = 50;
const GENERATED_PLAN_DAYS: i64 = 45;
const NAMED_PLAN_DAYS: i64 = 30;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AutoPlanRequest {
    pub project_id: u64,
    pub keyword: String,
    pub domain: String,
    /// Used verbatim instead of a sampled target
    #[serde(default)]
    pub target_da: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ListPlansQuery {
    pub project_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Cluster count to report; derived from the keywords when absent
    #[serde(default)]
    pub clusters: Option<usize>,
    #[serde(default)]
    pub target_da: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePlanResponse {
    pub success: bool,
    pub plan: RoadmapPlan,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub target_da: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CreatePlanResponse {
    pub success: bool,
    pub plan: RoadmapPlan,
}

// ============================================================================
// Stored plans
// ============================================================================

/// POST /plans/auto
///
/// The referenced project must exist.
pub async fn create_auto_plan(
    State(state): State<AppState>,
    Json(request): Json<AutoPlanRequest>,
) -> ApiResult<Json<Plan>> {
    let keyword = required_text(&request.keyword, "keyword")?;
    let domain = required_text(&request.domain, "domain")?;
    check_target_da(request.target_da)?;

    let project = state.store.projects.get(request.project_id).await?;
    let metrics = state
        .estimator
        .estimate_plan(&keyword, &domain, request.target_da);

    let plan = state
        .store
        .plans
        .append(|id| Plan {
            id,
            project_id: project.id,
            keyword,
            domain,
            metrics,
            created_at: Utc::now(),
        })
        .await;

    info!(plan_id = plan.id, project_id = plan.project_id, "Plan created");
    Ok(Json(plan))
}

/// GET /plans?project_id=
pub async fn list_plans(
    State(state): State<AppState>,
    Query(query): Query<ListPlansQuery>,
) -> Json<Vec<Plan>> {
    Json(state.store.plans_for(query.project_id).await)
}

/// GET /plans/:id
pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Plan>> {
    Ok(Json(state.store.plans.get(id).await?))
}

// ============================================================================
// Roadmap plans
// ============================================================================

/// POST /plans/generate
pub async fn generate_plan(
    State(state): State<AppState>,
    Json(request): Json<GeneratePlanRequest>,
) -> ApiResult<Json<GeneratePlanResponse>> {
    let keywords = normalize_keywords(request.keywords)?;
    check_target_da(request.target_da)?;

    tokio::time::sleep(state.delays.generate()).await;

    let cluster_count = match request.clusters {
        Some(count) => count,
        None => state.clusterer.cluster(&keywords).len(),
    };
    let campaign = state.estimator.estimate_campaign(&keywords);
    let now = Utc::now();

    let plan = RoadmapPlan {
        id: GENERATED_PLAN_IDS.next(),
        name: format!("Auto SEO Plan - {} Clusters", cluster_count),
        description: format!(
            "Automatically generated SEO plan for {} keywords across {} clusters",
            keywords.len(),
            cluster_count
        ),
        target_da: request.target_da.unwrap_or(DEFAULT_TARGET_DA),
        status: ProjectStatus::Active,
        progress: 0,
        estimated_completion: now + Duration::days(GENERATED_PLAN_DAYS),
        created_at: now,
        metrics: CampaignMetrics {
            total_keywords: keywords.len(),
            clusters: Some(cluster_count),
            difficulty: campaign.difficulty,
            estimated_traffic: campaign.estimated_traffic,
            budget: campaign.budget,
            timeline: Some("6-8 weeks".to_string()),
        },
        roadmap: default_roadmap(),
        keywords,
    };

    info!(plan_id = %plan.id, keywords = plan.keywords.len(), "Roadmap plan generated");
    Ok(Json(GeneratePlanResponse {
        success: true,
        plan,
        message: "Auto SEO plan generated successfully".to_string(),
    }))
}

/// POST /plans/create
pub async fn create_named_plan(
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> ApiResult<Json<CreatePlanResponse>> {
    let name = required_text(&request.name, "name")
        .map_err(|_| ApiError::BadRequest("Name and keywords array are required".to_string()))?;
    let keywords = normalize_keywords(request.keywords)?;
    check_target_da(request.target_da)?;

    tokio::time::sleep(state.delays.create()).await;

    let campaign = state.estimator.estimate_campaign(&keywords);
    let now = Utc::now();
    let description = request
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("SEO plan for {} keywords", keywords.len()));

    let plan = RoadmapPlan {
        id: NAMED_PLAN_IDS.next(),
        name,
        description,
        target_da: request.target_da.unwrap_or(DEFAULT_TARGET_DA),
        status: ProjectStatus::Active,
        progress: 0,
        estimated_completion: now + Duration::days(NAMED_PLAN_DAYS),
        created_at: now,
        metrics: CampaignMetrics {
            total_keywords: keywords.len(),
            clusters: None,
            difficulty: campaign.difficulty,
            estimated_traffic: campaign.estimated_traffic,
            budget: campaign.budget,
            timeline: None,
        },
        roadmap: Vec::new(),
        keywords,
    };

    info!(plan_id = %plan.id, name = %plan.name, "Named plan created");
    Ok(Json(CreatePlanResponse {
        success: true,
        plan,
    }))
}

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/plans/auto", post(create_auto_plan))
        .route("/plans/generate", post(generate_plan))
        .route("/plans/create", post(create_named_plan))
        .route("/plans/:id", get(get_plan))
}
