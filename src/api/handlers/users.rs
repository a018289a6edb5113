use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, JSend};
use crate::ops::sharing::is_valid_email;
use crate::storage::models::UserRecord;
use crate::storage::DatabaseError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

/// Provision an identity principal. Stands in for the authentication
/// subsystem, which owns user creation in the full product.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<Json<JSend<UserResponse>>, ApiError> {
    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request(format!(
            "'{email}' is not a valid email address"
        )));
    }

    let user = UserRecord {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        created_at: Utc::now(),
    };

    match state.db.put_user(&user) {
        Ok(()) => {}
        Err(DatabaseError::Duplicate(email)) => {
            return Err(ApiError::conflict(format!(
                "'{email}' is already registered"
            )));
        }
        Err(e) => return Err(ApiError::internal(e.to_string())),
    }

    tracing::debug!(user_id = %user.id, "Provisioned user");

    Ok(JSend::success(UserResponse {
        id: user.id,
        email: user.email,
        created_at: user.created_at.to_rfc3339(),
    }))
}
