// =====================================================================================
// REPORTS MODELS
// =====================================================================================

use serde::{Deserialize, Serialize};

use scheduling_cell::models::AppointmentStatus;
use shared_models::auth::UnitScope;
use shared_models::error::AppError;

/// Colour used for inventory items without a category.
pub const UNCATEGORISED_COLOR: &str = "#6B7280";
pub const UNCATEGORISED_LABEL: &str = "Other";

// =====================================================================================
// INVENTORY ROWS
// =====================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryCategory {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub current_stock: i64,
    #[serde(default)]
    pub min_stock: i64,
    pub cost_per_unit: Option<f64>,
    pub unit_id: Option<String>,
    /// Embedded `inventory_categories` row.
    #[serde(default, rename = "categories")]
    pub category: Option<InventoryCategory>,
}

impl InventoryItem {
    pub fn stock_value(&self) -> f64 {
        self.current_stock as f64 * self.cost_per_unit.unwrap_or(0.0)
    }
}

// =====================================================================================
// AGGREGATES
// =====================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: AppointmentStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentMetrics {
    pub total: usize,
    pub this_month: usize,
    pub by_status: Vec<StatusCount>,
    /// Percentages in `0..=100`.
    pub completion_rate: f64,
    pub cancellation_rate: f64,
    /// Sum of the cost of completed appointments.
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamCatalogStats {
    pub total: usize,
    pub active: usize,
    pub categories: usize,
    pub average_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub total_items: usize,
    pub total_value: f64,
    pub low_stock: usize,
    pub out_of_stock: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub label: String,
    pub value: f64,
    pub percentage: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub scope: UnitScope,
    pub appointments: AppointmentMetrics,
    pub exams: ExamCatalogStats,
    pub inventory: InventoryStats,
}

// =====================================================================================
// ERRORS
// =====================================================================================

#[derive(Debug, thiserror::Error)]
pub enum ReportsError {
    #[error("Report data unavailable: {0}")]
    DataUnavailable(String),
    #[error("Invalid report parameter: {0}")]
    InvalidParameter(String),
}

impl From<anyhow::Error> for ReportsError {
    fn from(err: anyhow::Error) -> Self {
        ReportsError::DataUnavailable(err.to_string())
    }
}

impl From<ReportsError> for AppError {
    fn from(err: ReportsError) -> Self {
        match err {
            ReportsError::DataUnavailable(msg) => AppError::Database(msg),
            ReportsError::InvalidParameter(msg) => AppError::BadRequest(msg),
        }
    }
}
