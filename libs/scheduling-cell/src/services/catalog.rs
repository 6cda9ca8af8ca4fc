use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::{UnitScope, User};

use crate::models::{
    Appointment, AppointmentStatus, CatalogSnapshot, CreateAppointmentRequest, Doctor, ExamType,
    SchedulingError, Unit,
};
use crate::services::booking::validate_booking;

/// Read/write access to the scheduling tables in the entity store.
pub struct CatalogService {
    supabase: Arc<SupabaseClient>,
}

impl CatalogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, auth_token: &str) -> Result<Vec<T>, SchedulingError> {
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse row: {}", e)))
            })
            .collect()
    }

    pub async fn list_doctors(&self, auth_token: &str) -> Result<Vec<Doctor>, SchedulingError> {
        self.fetch("/rest/v1/doctors?select=*&order=name.asc", auth_token).await
    }

    pub async fn get_doctor(&self, doctor_id: &str, auth_token: &str) -> Result<Option<Doctor>, SchedulingError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", urlencoding::encode(doctor_id));
        Ok(self.fetch(&path, auth_token).await?.into_iter().next())
    }

    /// Active exam types only; inactive rows never reach selection.
    pub async fn list_exam_types(&self, auth_token: &str) -> Result<Vec<ExamType>, SchedulingError> {
        self.fetch("/rest/v1/exam_types?select=*&active=eq.true&order=name.asc", auth_token).await
    }

    pub async fn get_exam_type(&self, exam_type_id: &str, auth_token: &str) -> Result<Option<ExamType>, SchedulingError> {
        let path = format!("/rest/v1/exam_types?id=eq.{}", urlencoding::encode(exam_type_id));
        Ok(self.fetch(&path, auth_token).await?.into_iter().next())
    }

    pub async fn list_units(&self, auth_token: &str) -> Result<Vec<Unit>, SchedulingError> {
        self.fetch("/rest/v1/units?select=*&order=name.asc", auth_token).await
    }

    /// Appointments starting in `[from, to)`, optionally limited to one unit.
    pub async fn list_appointments(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        scope: &UnitScope,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let mut path = format!(
            "/rest/v1/appointments?select=*&scheduled_date=gte.{}&scheduled_date=lt.{}",
            urlencoding::encode(&from.to_rfc3339()),
            urlencoding::encode(&to.to_rfc3339()),
        );
        if let UnitScope::Unit(unit_id) = scope {
            path.push_str(&format!("&unit_id=eq.{}", urlencoding::encode(unit_id)));
        }
        path.push_str("&order=scheduled_date.asc");

        self.fetch(&path, auth_token).await
    }

    async fn doctor_appointments_between(
        &self,
        doctor_id: &str,
        (from, to): (DateTime<Utc>, DateTime<Utc>),
        auth_token: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&scheduled_date=gte.{}&scheduled_date=lt.{}",
            urlencoding::encode(doctor_id),
            urlencoding::encode(&from.to_rfc3339()),
            urlencoding::encode(&to.to_rfc3339()),
        );
        self.fetch(&path, auth_token).await
    }

    /// Loads every collection the selection flow and calendars read from.
    /// Appointments are limited to `window` when one is given, else omitted.
    pub async fn load_snapshot(
        &self,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        scope: &UnitScope,
        auth_token: &str,
    ) -> Result<CatalogSnapshot, SchedulingError> {
        let appointments = async {
            match window {
                Some((from, to)) => self.list_appointments(from, to, scope, auth_token).await,
                None => Ok(Vec::new()),
            }
        };

        let (doctors, exam_types, units, appointments) = futures::try_join!(
            self.list_doctors(auth_token),
            self.list_exam_types(auth_token),
            self.list_units(auth_token),
            appointments,
        )?;

        debug!(
            "Snapshot loaded: {} doctors, {} exam types, {} units, {} appointments",
            doctors.len(),
            exam_types.len(),
            units.len(),
            appointments.len()
        );

        Ok(CatalogSnapshot { doctors, exam_types, units, appointments })
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
        viewer: &User,
        today: NaiveDate,
        offset: FixedOffset,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        info!("Booking appointment for doctor {} at {}", request.doctor_id, request.scheduled_at);

        let day_window = local_window(request.scheduled_at.date(), 1, offset)?;
        let (doctor, exam_type, existing) = futures::try_join!(
            self.get_doctor(&request.doctor_id, auth_token),
            self.get_exam_type(&request.exam_type_id, auth_token),
            self.doctor_appointments_between(&request.doctor_id, day_window, auth_token),
        )?;

        let plan = validate_booking(
            &request,
            viewer,
            doctor.as_ref(),
            exam_type.as_ref(),
            &existing,
            today,
            offset,
        )?;

        let appointment_data = json!({
            "patient_name": request.patient_name.trim(),
            "doctor_id": plan.doctor.id,
            "exam_type_id": plan.exam_type.id,
            "unit_id": plan.unit_id,
            "scheduled_date": plan.scheduled_date.to_rfc3339(),
            "status": AppointmentStatus::Scheduled,
            "cost": plan.exam_type.cost,
            "notes": request.notes,
        });

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| SchedulingError::DatabaseError("Failed to create appointment".to_string()))?;

        let appointment: Appointment = serde_json::from_value(row)
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse created appointment: {}", e)))?;

        info!("Appointment {} booked for {} {}", appointment.id, plan.day, plan.time);
        Ok(appointment)
    }

    pub async fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, SchedulingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", urlencoding::encode(appointment_id));

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "status": status })),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let Some(row) = result.into_iter().next() else {
            warn!("Status update for unknown appointment {}", appointment_id);
            return Err(SchedulingError::AppointmentNotFound);
        };

        let appointment: Appointment = serde_json::from_value(row)
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        info!("Appointment {} moved to {}", appointment.id, status);
        Ok(appointment)
    }
}

/// UTC bounds of `days` clinic-local days starting at `first`.
pub fn local_window(
    first: NaiveDate,
    days: i64,
    offset: FixedOffset,
) -> Result<(DateTime<Utc>, DateTime<Utc>), SchedulingError> {
    let local_midnight = first.and_time(NaiveTime::MIN);
    let from = local_midnight
        .checked_sub_signed(Duration::seconds(offset.local_minus_utc() as i64))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or(SchedulingError::DateOutOfRange(first))?;
    let to = from
        .checked_add_signed(Duration::days(days))
        .ok_or(SchedulingError::DateOutOfRange(first))?;
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_window_for_negative_offset() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let (from, to) = local_window(day, 7, offset).unwrap();
        assert_eq!(from.to_rfc3339(), "2026-03-10T03:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-03-17T03:00:00+00:00");
    }

    #[test]
    fn test_local_window_in_utc() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let (from, to) = local_window(day, 1, offset).unwrap();
        assert_eq!(from.to_rfc3339(), "2026-03-10T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-03-11T00:00:00+00:00");
    }

    #[test]
    fn test_local_window_past_the_last_representable_day() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert!(matches!(
            local_window(NaiveDate::MAX, 1, utc),
            Err(SchedulingError::DateOutOfRange(day)) if day == NaiveDate::MAX
        ));

        let ahead = FixedOffset::east_opt(3 * 3600).unwrap();
        assert!(matches!(local_window(NaiveDate::MIN, 1, ahead), Err(SchedulingError::DateOutOfRange(_))));
    }
}
