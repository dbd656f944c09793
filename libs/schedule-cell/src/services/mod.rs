pub mod availability;
pub mod closure;
pub mod notification;
pub mod schedule_change;
pub mod slots;

pub use availability::AvailabilityService;
pub use closure::{first_closure, is_closed};
pub use notification::{
    build_notifications, HttpNotificationSender, LogNotificationSender, NotificationSender,
};
pub use schedule_change::{validate_schedule_change, ScheduleChangeService};
pub use slots::{generate_slots, SlotPlan, Slots};
