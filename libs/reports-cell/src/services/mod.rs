pub mod metrics;
pub mod reports;

pub use reports::ReportsService;
