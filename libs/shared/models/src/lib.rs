pub mod auth;
pub mod error;

pub use auth::{User, UserRole, UnitScope};
pub use error::AppError;
