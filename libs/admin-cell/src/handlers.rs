// =====================================================================================
// ADMIN HANDLERS
// =====================================================================================

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::{instrument, warn};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AdminError, ApprovalDecision, UnitForm};
use crate::services::{ProfileService, UnitService};

fn require_admin(user: &User) -> Result<(), AdminError> {
    if user.is_admin() {
        Ok(())
    } else {
        warn!("User {} tried to reach an admin route", user.id);
        Err(AdminError::AdminOnly)
    }
}

// ==============================================================================
// PROFILE APPROVAL
// ==============================================================================

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn list_pending_profiles(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let profiles = ProfileService::new(&state).list_pending(auth.token()).await?;

    Ok(Json(json!({
        "profiles": profiles,
        "total": profiles.len(),
    })))
}

async fn decide_profile(
    state: &AppConfig,
    token: &str,
    user: &User,
    profile_id: &str,
    decision: ApprovalDecision,
) -> Result<Json<Value>, AppError> {
    require_admin(user)?;

    let profile = ProfileService::new(state).decide(profile_id, decision, token).await?;

    Ok(Json(json!({
        "profile": profile,
        "message": format!("Profile marked as {}", profile.status),
    })))
}

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn approve_profile(
    State(state): State<Arc<AppConfig>>,
    Path(profile_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    decide_profile(&state, auth.token(), &user, &profile_id, ApprovalDecision::Approve).await
}

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn reject_profile(
    State(state): State<Arc<AppConfig>>,
    Path(profile_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    decide_profile(&state, auth.token(), &user, &profile_id, ApprovalDecision::Reject).await
}

// ==============================================================================
// UNIT REGISTRY
// ==============================================================================

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn list_units(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let units = UnitService::new(&state).list_units(auth.token()).await?;

    Ok(Json(json!({
        "units": units,
        "total": units.len(),
    })))
}

#[axum::debug_handler]
#[instrument(skip(state, auth, user, form), fields(user_id = %user.id))]
pub async fn create_unit(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(form): Json<UnitForm>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let unit = UnitService::new(&state).create_unit(&form, auth.token()).await?;

    Ok(Json(json!({
        "unit": unit,
        "message": "Unit created successfully",
    })))
}

#[axum::debug_handler]
#[instrument(skip(state, auth, user, form), fields(user_id = %user.id))]
pub async fn update_unit(
    State(state): State<Arc<AppConfig>>,
    Path(unit_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(form): Json<UnitForm>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let unit = UnitService::new(&state).update_unit(&unit_id, &form, auth.token()).await?;

    Ok(Json(json!({
        "unit": unit,
        "message": "Unit updated successfully",
    })))
}

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn deactivate_unit(
    State(state): State<Arc<AppConfig>>,
    Path(unit_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let unit = UnitService::new(&state).deactivate_unit(&unit_id, auth.token()).await?;

    Ok(Json(json!({
        "unit": unit,
        "message": "Unit deactivated",
    })))
}
