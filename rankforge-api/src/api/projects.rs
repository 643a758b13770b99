//! Project endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use rankforge_common::models::Project;
use serde::Deserialize;
use tracing::info;

use super::required_text;
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub domain: String,
    #[serde(default)]
    pub industry: Option<String>,
}

/// POST /projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let domain = required_text(&request.domain, "domain")?;
    let industry = request
        .industry
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty());

    let project = state
        .store
        .projects
        .append(|id| Project::new(id, domain, industry))
        .await;

    info!(project_id = project.id, domain = %project.domain, "Project created");
    Ok(Json(project))
}

/// GET /projects
pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.store.projects.list().await)
}

/// GET /projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.store.projects.get(id).await?))
}

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", get(get_project))
}
