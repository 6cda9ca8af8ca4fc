// =====================================================================================
// REPORTS CELL - DASHBOARD AGGREGATES
// =====================================================================================
//
// Appointment, exam catalog and inventory figures for the dashboard and the
// reports page, scoped to the units the viewer may see.
//
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    AppointmentMetrics, CategoryValue, ExamCatalogStats, InventoryItem, InventoryStats,
    ReportSummary, ReportsError, StatusCount,
};

pub use services::ReportsService;

pub use router::reports_routes;
