use std::sync::Arc;

use axum::{routing::get, Router};

use admin_cell::admin_routes;
use reports_cell::reports_routes;
use scheduling_cell::scheduling_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Lab operations API is running!" }))
        .nest("/scheduling", scheduling_routes(state.clone()))
        .nest("/reports", reports_routes(state.clone()))
        .nest("/admin", admin_routes(state))
}
