use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::{NaiveDate, Utc};
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use shared_config::AppConfig;
use shared_models::auth::{UnitScope, User};
use shared_models::error::AppError;

use crate::models::{CreateAppointmentRequest, SchedulingError, UpdateStatusRequest};
use crate::services::catalog::{local_window, CatalogService};
use crate::services::compatibility::{check_doctor_exam_compatibility, filter_exam_types};
use crate::services::selection::{AppointmentSelection, SelectionEvent, SelectionState};
use crate::services::slots::{doctor_day_slots, select_slot, week_days, week_schedule};
use crate::services::visibility::{filter_doctors, filter_for_calendar, is_selectable_doctor};

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct DoctorsQuery {
    pub unit_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExamTypesQuery {
    pub doctor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompatibilityQuery {
    pub doctor_id: String,
    pub exam_type_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub date: Option<NaiveDate>,
    pub unit_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<NaiveDate>,
    pub doctor_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub time: String,
    pub doctor_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub state: Option<SelectionState>,
    pub event: SelectionEvent,
}

fn clinic_today(config: &AppConfig) -> NaiveDate {
    Utc::now().with_timezone(&config.clinic_offset()).date_naive()
}

// ==============================================================================
// CATALOG HANDLERS
// ==============================================================================

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<DoctorsQuery>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);
    let doctors = catalog.list_doctors(auth.token()).await?;

    let scope = user.resolve_unit_scope(query.unit_id.as_deref());
    let visible = filter_doctors(&doctors, &user, query.unit_id.as_deref());

    Ok(Json(json!({
        "doctors": visible,
        "total": visible.len(),
        "scope": scope,
    })))
}

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn list_exam_types(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ExamTypesQuery>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);
    let token = auth.token();

    let doctor = match query.doctor_id.as_deref().filter(|id| !id.is_empty()) {
        Some(doctor_id) => catalog.get_doctor(doctor_id, token).await?,
        None => None,
    };
    let exam_types = catalog.list_exam_types(token).await?;
    let filtered = filter_exam_types(&exam_types, doctor.as_ref());

    Ok(Json(json!({
        "exam_types": filtered,
        "total": filtered.len(),
        "doctor_id": doctor.map(|d| d.id),
    })))
}

#[axum::debug_handler]
pub async fn check_compatibility(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<CompatibilityQuery>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);
    let token = auth.token();

    let doctor = catalog
        .get_doctor(&query.doctor_id, token)
        .await?
        .ok_or(SchedulingError::DoctorNotFound)?;
    let exam_types = catalog.list_exam_types(token).await?;

    Ok(Json(json!({
        "doctor_id": doctor.id,
        "exam_type_id": query.exam_type_id,
        "compatible": check_doctor_exam_compatibility(&doctor, &query.exam_type_id, &exam_types),
    })))
}

// ==============================================================================
// SELECTION HANDLER
// ==============================================================================

/// Applies one selection event to the state the client sent and returns the
/// new state together with the lists the client should now offer.
#[axum::debug_handler]
#[instrument(skip(state, auth, user, request), fields(user_id = %user.id))]
pub async fn apply_selection(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);
    let snapshot = catalog.load_snapshot(None, &UnitScope::All, auth.token()).await?;

    let current = request.state.unwrap_or_else(|| SelectionState::for_viewer(&user));
    debug!("Applying {:?} to {:?}", request.event, current);

    let mut selection = AppointmentSelection::resume(&user, &snapshot, current);
    selection.dispatch(request.event);

    let doctors = selection.filtered_doctors();
    let exam_types = selection.filtered_exam_types();
    let (state, notices) = selection.into_parts();

    Ok(Json(json!({
        "state": state,
        "notices": notices,
        "doctors": doctors,
        "exam_types": exam_types,
    })))
}

// ==============================================================================
// CALENDAR HANDLERS
// ==============================================================================

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn get_week_calendar(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);
    let token = auth.token();
    let offset = state.clinic_offset();
    let today = clinic_today(&state);

    let anchor = query.date.unwrap_or(today);
    let scope = user.resolve_unit_scope(query.unit_id.as_deref());
    let monday = week_days(anchor).ok_or(SchedulingError::DateOutOfRange(anchor))?[0];
    let (from, to) = local_window(monday, 7, offset)?;

    let (doctors, appointments) = futures::try_join!(
        catalog.list_doctors(token),
        catalog.list_appointments(from, to, &scope, token),
    )?;

    let visible = filter_doctors(&doctors, &user, scope.unit_id());
    let (doctors, appointments) = filter_for_calendar(&visible, &appointments, &scope);
    let week = week_schedule(anchor, today, &doctors, &appointments, offset)
        .ok_or(SchedulingError::DateOutOfRange(anchor))?;

    Ok(Json(json!({
        "scope": scope,
        "week": week,
    })))
}

#[axum::debug_handler]
#[instrument(skip(state, auth, user), fields(user_id = %user.id))]
pub async fn get_day_calendar(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);
    let token = auth.token();
    let offset = state.clinic_offset();
    let today = clinic_today(&state);
    let day = query.date.unwrap_or(today);
    let (from, to) = local_window(day, 1, offset)?;

    let doctor = catalog
        .get_doctor(&query.doctor_id, token)
        .await?
        .filter(|d| is_selectable_doctor(d))
        .filter(|d| user.resolve_unit_scope(None).includes(d.unit_id.as_deref()))
        .ok_or(SchedulingError::DoctorNotFound)?;

    let appointments = catalog.list_appointments(from, to, &UnitScope::All, token).await?;
    let slots = doctor_day_slots(&appointments, &doctor.id, day, today, offset);

    Ok(Json(json!({
        "date": day,
        "doctor_id": doctor.id,
        "doctor_name": doctor.name,
        "slots": slots,
    })))
}

/// Resolves a click on a calendar slot into a 30 minute interval.
#[axum::debug_handler]
pub async fn select_calendar_slot(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);
    let token = auth.token();
    let offset = state.clinic_offset();
    let (from, to) = local_window(query.date, 1, offset)?;

    let doctor = catalog
        .get_doctor(&query.doctor_id, token)
        .await?
        .filter(|d| user.resolve_unit_scope(None).includes(d.unit_id.as_deref()))
        .ok_or(SchedulingError::DoctorNotFound)?;

    let appointments = catalog.list_appointments(from, to, &UnitScope::All, token).await?;

    let selection = select_slot(query.date, &query.time, &doctor, clinic_today(&state), &appointments, offset)
        .ok_or_else(|| AppError::Conflict(format!("Slot {} on {} is not available", query.time, query.date)))?;

    Ok(Json(json!({ "selection": selection })))
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
#[instrument(skip(state, auth, user, request), fields(user_id = %user.id))]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);

    let appointment = catalog
        .create_appointment(request, &user, clinic_today(&state), state.clinic_offset(), auth.token())
        .await?;

    Ok(Json(json!({
        "appointment": appointment,
        "message": "Appointment booked successfully",
    })))
}

#[axum::debug_handler]
#[instrument(skip(state, auth, user, request), fields(user_id = %user.id))]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(&state);

    let appointment = catalog
        .update_appointment_status(&appointment_id, request.status, auth.token())
        .await?;

    Ok(Json(json!({
        "appointment": appointment,
        "message": format!("Appointment marked as {}", request.status),
    })))
}
