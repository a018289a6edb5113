use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, JSend};
use crate::ops::{projects, Principal};
use crate::storage::models::ProjectRecord;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameProjectRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteProjectResponse {
    pub deleted: bool,
    pub files_deleted: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub storage_warnings: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    AppJson(req): AppJson<CreateProjectRequest>,
) -> Result<Json<JSend<ProjectResponse>>, ApiError> {
    let project = projects::create_project(&state, &principal, &req.name)?;
    Ok(JSend::success(project_to_response(&project)))
}

pub async fn rename_project(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
    AppJson(req): AppJson<RenameProjectRequest>,
) -> Result<Json<JSend<ProjectResponse>>, ApiError> {
    let project = projects::rename_project(&state, &principal, &id, &req.name)?;
    Ok(JSend::success(project_to_response(&project)))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<JSend<DeleteProjectResponse>>, ApiError> {
    let cascade = projects::delete_project(&state, &principal, &id).await?;
    Ok(JSend::success(DeleteProjectResponse {
        deleted: true,
        files_deleted: cascade.files_deleted,
        storage_warnings: cascade.storage_warnings,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn project_to_response(project: &ProjectRecord) -> ProjectResponse {
    ProjectResponse {
        id: project.id.clone(),
        name: project.name.clone(),
        owner_id: project.owner_id.clone(),
        created_at: project.created_at.to_rfc3339(),
    }
}
