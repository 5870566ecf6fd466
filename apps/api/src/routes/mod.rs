pub mod health;
pub mod resumes;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Public read paths
        .route("/api/v1/resumes/:slug", get(resumes::handle_get_resume))
        .route("/api/v1/resolve", get(resumes::handle_resolve_host))
        // Résumé root
        .route("/api/v1/resumes", post(resumes::handle_create_resume))
        .route(
            "/api/v1/resumes/:slug",
            patch(resumes::handle_update_resume).delete(resumes::handle_delete_resume),
        )
        .route("/api/v1/resumes/:slug/save", post(resumes::handle_save_cycle))
        // Child collections
        .route(
            "/api/v1/resumes/:slug/:kind",
            post(resumes::handle_create_child),
        )
        .route(
            "/api/v1/children/:kind/:id",
            patch(resumes::handle_update_child).delete(resumes::handle_delete_child),
        )
        .route("/api/v1/me/slug", get(resumes::handle_slug_for_user))
        .with_state(state)
}
