use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub users_deleted: u64,
    pub projects_deleted: u64,
    pub files_deleted: u64,
    pub grants_deleted: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    let stats = state
        .db
        .purge_all()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::warn!(
        users = stats.users,
        projects = stats.projects,
        files = stats.files,
        grants = stats.grants,
        "Purged all data"
    );

    Ok(JSend::success(PurgeResponse {
        users_deleted: stats.users,
        projects_deleted: stats.projects,
        files_deleted: stats.files,
        grants_deleted: stats.grants,
    }))
}
