use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::ops::Principal;
use crate::AppState;

/// Header carrying the authenticated user id. Credential verification is the
/// job of the fronting auth layer; this extractor only resolves the id to a
/// known user.
const USER_ID_HEADER: &str = "x-user-id";

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let user = state
            .db
            .get_user(user_id)
            .map_err(|e| ApiError::internal(e.to_string()))?
            .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

        Ok(Principal {
            id: user.id,
            email: user.email,
        })
    }
}
