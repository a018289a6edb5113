use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Users (provisioning hook for the auth subsystem)
        .route("/users", post(handlers::create_user))
        // Projects
        .route("/projects", post(handlers::create_project))
        .route("/projects/:id", put(handlers::rename_project))
        .route("/projects/:id", delete(handlers::delete_project))
        // Files
        .route("/files", post(handlers::create_file))
        .route("/files", get(handlers::list_files))
        .route("/files/download", get(handlers::get_download_url))
        .route("/files/:id", delete(handlers::delete_file))
        .route("/files/:id/access", get(handlers::get_shared_access))
        // Sharing
        .route("/shares", post(handlers::share_file))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Capability URLs issued by the local backend resolve to these routes
    if state.local_store.is_some() {
        router = router
            .route("/objects/*key", put(handlers::put_object))
            .route("/objects/*key", get(handlers::get_object));
    }

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled, purge route is available");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
