use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, AppQuery, JSend};
use crate::ops::files::{self, CreateFileInput, FileListing};
use crate::ops::{self, Principal};
use crate::storage::models::FileRecord;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateFileRequest {
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub byte_size: u64,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: String,
    pub key: String,
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub project_id: Option<String>,
    pub original_sender_email: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_by_email: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shared_with_emails: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateFileResponse {
    pub file: FileResponse,
    pub upload_url: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteFileResponse {
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_warning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub is_owner: bool,
    pub shared_by_email: Option<String>,
    pub shared_to_emails: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_file(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    AppJson(req): AppJson<CreateFileRequest>,
) -> Result<Json<JSend<CreateFileResponse>>, ApiError> {
    let created = files::create_file(
        &state,
        &principal,
        CreateFileInput {
            name: req.name,
            mime_type: req.mime_type,
            byte_size: req.byte_size,
            project_id: req.project_id,
        },
    )
    .await?;

    Ok(JSend::success(CreateFileResponse {
        file: file_to_response(&created.file, None, Vec::new()),
        upload_url: created.upload_url,
    }))
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<JSend<Vec<FileResponse>>>, ApiError> {
    let listings = files::list_files(&state, &principal)?;
    let items = listings.into_iter().map(listing_to_response).collect();
    Ok(JSend::success(items))
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<JSend<DeleteFileResponse>>, ApiError> {
    let outcome = files::delete_file(&state, &principal, &id).await?;
    Ok(JSend::success(DeleteFileResponse {
        deleted: true,
        storage_warning: outcome.storage_warning,
    }))
}

pub async fn get_download_url(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    AppQuery(params): AppQuery<DownloadParams>,
) -> Result<Json<JSend<DownloadResponse>>, ApiError> {
    let download_url = files::get_download_url(&state, &principal, &params.key)?;
    Ok(JSend::success(DownloadResponse { download_url }))
}

pub async fn get_shared_access(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<JSend<AccessResponse>>, ApiError> {
    let access = ops::sharing::get_shared_access(&state, &principal, &id)?;
    Ok(JSend::success(AccessResponse {
        is_owner: access.is_owner,
        shared_by_email: access.shared_by_email,
        shared_to_emails: access.shared_to_emails,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn listing_to_response(listing: FileListing) -> FileResponse {
    file_to_response(
        &listing.file,
        listing.shared_by_email,
        listing.shared_with_emails,
    )
}

fn file_to_response(
    file: &FileRecord,
    shared_by_email: Option<String>,
    shared_with_emails: Vec<String>,
) -> FileResponse {
    FileResponse {
        id: file.id.clone(),
        key: file.key.clone(),
        name: file.name.clone(),
        mime_type: file.mime_type.clone(),
        byte_size: file.byte_size,
        project_id: file.project_id.clone(),
        original_sender_email: file.original_sender_email.clone(),
        created_at: file.created_at.to_rfc3339(),
        shared_by_email,
        shared_with_emails,
    }
}
