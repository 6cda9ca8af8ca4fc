use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::error::AppError;

// ==============================================================================
// CATALOG ENTITIES
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub specialty: Option<String>,
    pub crm: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub unit_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamType {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub cost: Option<f64>,
    #[serde(default)]
    pub requires_preparation: bool,
    pub preparation_instructions: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn tone(&self) -> StatusTone {
        match self {
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed => StatusTone::Booked,
            AppointmentStatus::InProgress => StatusTone::Ongoing,
            AppointmentStatus::Completed => StatusTone::Done,
            AppointmentStatus::Cancelled => StatusTone::Voided,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Colour family a taken slot is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Booked,
    Ongoing,
    Done,
    Voided,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub patient_name: String,
    pub scheduled_date: DateTime<Utc>,
    pub doctor_id: Option<String>,
    pub unit_id: Option<String>,
    pub exam_type_id: Option<String>,
    pub status: AppointmentStatus,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

/// Read-only view of the collections the scheduling logic works on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub doctors: Vec<Doctor>,
    pub exam_types: Vec<ExamType>,
    pub units: Vec<Unit>,
    pub appointments: Vec<Appointment>,
}

impl CatalogSnapshot {
    pub fn doctor(&self, doctor_id: &str) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == doctor_id)
    }

    pub fn exam_type(&self, exam_type_id: &str) -> Option<&ExamType> {
        self.exam_types.iter().find(|e| e.id == exam_type_id)
    }

    pub fn unit(&self, unit_id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == unit_id)
    }
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_name: String,
    pub doctor_id: String,
    pub exam_type_id: String,
    pub unit_id: Option<String>,
    /// Clinic-local start of the slot.
    pub scheduled_at: NaiveDateTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulingError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Exam type not found")]
    ExamTypeNotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Exam type {exam_type} is not compatible with the doctor's specialty {specialty}")]
    IncompatibleExam { exam_type: String, specialty: String },

    #[error("Doctor belongs to a different unit")]
    UnitMismatch,

    #[error("{time} is not a bookable slot on {date}")]
    InvalidSlot { date: NaiveDate, time: String },

    #[error("Cannot book a slot on a past day ({0})")]
    PastDay(NaiveDate),

    #[error("Slot {time} on {date} is already taken")]
    SlotTaken { date: NaiveDate, time: String },

    #[error("Date {0} is outside the supported calendar range")]
    DateOutOfRange(NaiveDate),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for SchedulingError {
    fn from(err: anyhow::Error) -> Self {
        SchedulingError::DatabaseError(err.to_string())
    }
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::DoctorNotFound
            | SchedulingError::ExamTypeNotFound
            | SchedulingError::AppointmentNotFound => AppError::NotFound(err.to_string()),
            SchedulingError::SlotTaken { .. } => AppError::Conflict(err.to_string()),
            SchedulingError::DateOutOfRange(_) => AppError::BadRequest(err.to_string()),
            SchedulingError::IncompatibleExam { .. }
            | SchedulingError::UnitMismatch
            | SchedulingError::InvalidSlot { .. }
            | SchedulingError::PastDay(_)
            | SchedulingError::ValidationError(_) => AppError::ValidationError(err.to_string()),
            SchedulingError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
