use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppQuery, JSend};
use crate::object_store::ObjectStoreError;
use crate::AppState;

/// Capability-token query parameters on local object URLs.
#[derive(Debug, Deserialize)]
pub struct CapabilityParams {
    pub expires: i64,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UploadAck {
    pub key: String,
    pub byte_size: u64,
}

/// Accept an upload against a capability URL issued by the local backend.
/// Route: PUT /objects/*key
pub async fn put_object(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    AppQuery(params): AppQuery<CapabilityParams>,
    body: Bytes,
) -> Result<Json<JSend<UploadAck>>, ApiError> {
    let store = state
        .local_store
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Local object routes are not enabled"))?;

    if !store.verify_token("PUT", &key, params.expires, &params.token) {
        return Err(ApiError::forbidden("Invalid or expired upload URL"));
    }

    let byte_size = body.len() as u64;
    store
        .put(&key, body)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store object: {e}")))?;

    tracing::debug!(key = %key, byte_size, "Stored local object");
    Ok(JSend::success(UploadAck { key, byte_size }))
}

/// Serve object bytes against a capability URL issued by the local backend.
/// Route: GET /objects/*key
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    AppQuery(params): AppQuery<CapabilityParams>,
) -> Result<Response, ApiError> {
    let store = state
        .local_store
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Local object routes are not enabled"))?;

    if !store.verify_token("GET", &key, params.expires, &params.token) {
        return Err(ApiError::forbidden("Invalid or expired download URL"));
    }

    let data = store.get(&key).await.map_err(|e| match e {
        ObjectStoreError::NotFound(_) => ApiError::not_found("Object not found"),
        _ => ApiError::internal(format!("Failed to retrieve object: {e}")),
    })?;

    // MIME type lives in the metadata DB; fall back when the record is gone
    let mime_type = state
        .db
        .get_file_by_key(&key)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map(|f| f.mime_type)
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    let filename = key.rsplit('/').next().unwrap_or(&key);
    if let Ok(value) = format!("attachment; filename=\"{filename}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}
