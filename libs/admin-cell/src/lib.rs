// =====================================================================================
// ADMIN CELL - ACCOUNT APPROVAL AND UNIT REGISTRY
// =====================================================================================
//
// Administrators approve or reject self-registered profiles and keep the list
// of clinic units up to date. Every route here is admin only.
//
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    AdminError, ApprovalDecision, ManagedUnit, PendingProfile, Profile, ProfileStatus, UnitForm,
    UnitSummary,
};

pub use services::{ProfileService, UnitService};

pub use router::admin_routes;
