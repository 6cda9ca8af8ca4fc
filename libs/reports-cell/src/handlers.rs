// =====================================================================================
// REPORTS HANDLERS
// =====================================================================================

use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::ReportsError;
use crate::services::metrics::DASHBOARD_CATEGORY_LIMIT;
use crate::services::ReportsService;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub unit_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    pub unit_id: Option<String>,
    pub limit: Option<usize>,
}

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn get_summary(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Value>, AppError> {
    let scope = user.resolve_unit_scope(query.unit_id.as_deref());
    let offset = state.clinic_offset();
    let today = Utc::now().with_timezone(&offset).date_naive();

    let summary = ReportsService::new(&state)
        .summary(scope, today, offset, auth.token())
        .await?;

    Ok(Json(json!(summary)))
}

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn get_inventory_categories(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<CategoriesQuery>,
) -> Result<Json<Value>, AppError> {
    let limit = query.limit.unwrap_or(DASHBOARD_CATEGORY_LIMIT);
    if limit == 0 {
        return Err(ReportsError::InvalidParameter("limit must be at least 1".to_string()).into());
    }

    let scope = user.resolve_unit_scope(query.unit_id.as_deref());
    let categories = ReportsService::new(&state)
        .inventory_categories(&scope, limit, auth.token())
        .await?;

    Ok(Json(json!({
        "scope": scope,
        "categories": categories,
    })))
}
