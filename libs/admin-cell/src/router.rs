// =====================================================================================
// ADMIN CELL ROUTER
// =====================================================================================

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    // Handlers reject non-admin users themselves; the layer only establishes who is asking
    let protected_routes = Router::new()
        .route("/profiles/pending", get(handlers::list_pending_profiles))
        .route("/profiles/{profile_id}/approve", patch(handlers::approve_profile))
        .route("/profiles/{profile_id}/reject", patch(handlers::reject_profile))
        .route("/units", get(handlers::list_units).post(handlers::create_unit))
        .route("/units/{unit_id}", patch(handlers::update_unit))
        .route("/units/{unit_id}/deactivate", patch(handlers::deactivate_unit))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
