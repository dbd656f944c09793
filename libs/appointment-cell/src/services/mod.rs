pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod patient;

pub use booking::BookingService;
pub use conflict::find_overlap;
pub use lifecycle::BookingLifecycle;
pub use patient::{normalize_patient, resolve_patient};
