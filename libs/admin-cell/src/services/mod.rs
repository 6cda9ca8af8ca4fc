pub mod profiles;
pub mod units;

pub use profiles::ProfileService;
pub use units::UnitService;
