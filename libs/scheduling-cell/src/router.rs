use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn scheduling_routes(state: Arc<AppConfig>) -> Router {
    // Every scheduling view depends on who is looking, so all routes are protected
    let protected_routes = Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .route("/exam-types", get(handlers::list_exam_types))
        .route("/compatibility", get(handlers::check_compatibility))
        .route("/selection", post(handlers::apply_selection))
        .route("/calendar/week", get(handlers::get_week_calendar))
        .route("/calendar/day", get(handlers::get_day_calendar))
        .route("/calendar/slot", get(handlers::select_calendar_slot))
        .route("/appointments", post(handlers::create_appointment))
        .route("/appointments/{appointment_id}/status", patch(handlers::update_appointment_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
