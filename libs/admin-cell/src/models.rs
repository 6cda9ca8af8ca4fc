// =====================================================================================
// ADMIN MODELS
// =====================================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use shared_models::error::AppError;

// =====================================================================================
// PROFILES
// =====================================================================================

/// Lifecycle of a self-registered account. New sign-ups start as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Pending,
    Active,
    Inactive,
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProfileStatus::Pending => "pending",
            ProfileStatus::Active => "active",
            ProfileStatus::Inactive => "inactive",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub unit_id: Option<String>,
    pub status: ProfileStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub id: String,
    pub name: String,
    pub code: String,
}

/// A pending profile with the unit it asked to join, when that unit still exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingProfile {
    #[serde(flatten)]
    pub profile: Profile,
    pub unit: Option<UnitSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

impl ApprovalDecision {
    pub fn target_status(self) -> ProfileStatus {
        match self {
            ApprovalDecision::Approve => ProfileStatus::Active,
            ApprovalDecision::Reject => ProfileStatus::Inactive,
        }
    }
}

// =====================================================================================
// UNITS
// =====================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedUnit {
    pub id: String,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Editable fields of a unit, as submitted by the registry form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitForm {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl UnitForm {
    /// Trims every field and drops blank optional ones. Name and code are required.
    pub fn validated(&self) -> Result<UnitForm, AdminError> {
        let name = self.name.trim();
        let code = self.code.trim();

        if name.is_empty() {
            return Err(AdminError::ValidationError("Unit name is required".to_string()));
        }
        if code.is_empty() {
            return Err(AdminError::ValidationError("Unit code is required".to_string()));
        }

        Ok(UnitForm {
            name: name.to_string(),
            code: code.to_string(),
            address: trimmed(self.address.as_deref()),
            phone: trimmed(self.phone.as_deref()),
        })
    }

    pub fn to_row(&self) -> Value {
        json!({
            "name": self.name,
            "code": self.code,
            "address": self.address,
            "phone": self.phone,
        })
    }
}

// =====================================================================================
// ERRORS
// =====================================================================================

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Only administrators can manage accounts and units")]
    AdminOnly,

    #[error("Pending profile not found")]
    ProfileNotFound,

    #[error("Unit not found")]
    UnitNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        AdminError::DatabaseError(err.to_string())
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::AdminOnly => AppError::Forbidden(err.to_string()),
            AdminError::ProfileNotFound | AdminError::UnitNotFound => AppError::NotFound(err.to_string()),
            AdminError::ValidationError(msg) => AppError::ValidationError(msg),
            AdminError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
