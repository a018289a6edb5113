use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, JSend};
use crate::ops::{sharing, Principal};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ShareFileRequest {
    pub file_key: String,
    pub emails: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ShareFileResponse {
    pub file_name: String,
    pub granted: Vec<String>,
    pub already_shared: Vec<String>,
    pub unregistered: Vec<String>,
    pub notified: usize,
}

pub async fn share_file(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    AppJson(req): AppJson<ShareFileRequest>,
) -> Result<Json<JSend<ShareFileResponse>>, ApiError> {
    let report = sharing::share_file(&state, &principal, &req.file_key, &req.emails).await?;

    Ok(JSend::success(ShareFileResponse {
        file_name: report.file_name,
        granted: report.granted,
        already_shared: report.already_shared,
        unregistered: report.unregistered,
        notified: report.notified,
    }))
}
