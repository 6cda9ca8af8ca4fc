use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use tracing::debug;

use shared_models::auth::User;

use crate::models::{Appointment, CreateAppointmentRequest, Doctor, ExamType, SchedulingError};
use crate::services::compatibility::is_doctor_exam_compatible;
use crate::services::slots::{format_slot_time, is_past_day, is_slot_taken, slot_labels};
use crate::services::visibility::is_selectable_doctor;

/// A booking request that passed every check against the rows read so far.
#[derive(Debug, Clone)]
pub struct BookingPlan {
    pub doctor: Doctor,
    pub exam_type: ExamType,
    pub unit_id: Option<String>,
    pub day: NaiveDate,
    pub time: String,
    pub scheduled_date: DateTime<Utc>,
}

/// Checks a booking against the doctor/exam/unit rules and the slot grid.
///
/// `appointments` must hold at least the doctor's appointments for the
/// requested day. The check is only as fresh as those rows.
pub fn validate_booking(
    request: &CreateAppointmentRequest,
    viewer: &User,
    doctor: Option<&Doctor>,
    exam_type: Option<&ExamType>,
    appointments: &[Appointment],
    today: NaiveDate,
    offset: FixedOffset,
) -> Result<BookingPlan, SchedulingError> {
    if request.patient_name.trim().is_empty() {
        return Err(SchedulingError::ValidationError("Patient name is required".to_string()));
    }

    let doctor = doctor
        .filter(|d| is_selectable_doctor(d))
        .ok_or(SchedulingError::DoctorNotFound)?;
    let exam_type = exam_type.ok_or(SchedulingError::ExamTypeNotFound)?;

    let doctor_unit = doctor.unit_id.as_deref().filter(|u| !u.is_empty());
    let requested_unit = request.unit_id.as_deref().filter(|u| !u.is_empty());

    if let (Some(doctor_unit), Some(requested_unit)) = (doctor_unit, requested_unit) {
        if doctor_unit != requested_unit {
            return Err(SchedulingError::UnitMismatch);
        }
    }
    let unit_id = doctor_unit.or(requested_unit);

    if !viewer.resolve_unit_scope(unit_id).includes(unit_id) {
        return Err(SchedulingError::UnitMismatch);
    }

    if !is_doctor_exam_compatible(doctor, exam_type) {
        return Err(SchedulingError::IncompatibleExam {
            exam_type: exam_type.name.clone(),
            specialty: doctor.specialty.clone().unwrap_or_default(),
        });
    }

    let day = request.scheduled_at.date();
    let time = format_slot_time(request.scheduled_at.time());
    let on_grid = request.scheduled_at.second() == 0
        && request.scheduled_at.nanosecond() == 0
        && slot_labels(day).iter().any(|label| *label == time);
    if !on_grid {
        return Err(SchedulingError::InvalidSlot { date: day, time });
    }

    if is_past_day(day, today) {
        return Err(SchedulingError::PastDay(day));
    }

    if is_slot_taken(appointments, &doctor.id, day, &time, offset) {
        return Err(SchedulingError::SlotTaken { date: day, time });
    }

    let scheduled_date = request
        .scheduled_at
        .checked_sub_signed(Duration::seconds(offset.local_minus_utc() as i64))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or(SchedulingError::DateOutOfRange(day))?;

    debug!("Booking for doctor {} on {} at {} validated", doctor.id, day, time);

    Ok(BookingPlan {
        doctor: doctor.clone(),
        exam_type: exam_type.clone(),
        unit_id: unit_id.map(str::to_string),
        day,
        time,
        scheduled_date,
    })
}
