pub mod booking;
pub mod catalog;
pub mod compatibility;
pub mod selection;
pub mod slots;
pub mod visibility;

pub use catalog::CatalogService;
pub use selection::{AppointmentSelection, Notice, NotificationSink, SelectionEvent, SelectionState};
