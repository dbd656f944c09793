// libs/appointment-cell/src/services/conflict.rs
use uuid::Uuid;

use shared_models::{OccupiedInterval, WorkSchedule};
use shared_utils::time::intervals_overlap;

/// Why the weekday schedule cannot host `[start, start + duration)` for
/// `service_id`, or `None` when it can. Mirrors the rules of the slot
/// generator so a booking can only land where a slot could be offered.
pub fn schedule_rejection(
    schedule: Option<&WorkSchedule>,
    service_id: &Uuid,
    start: u32,
    duration: u32,
) -> Option<&'static str> {
    let Some(schedule) = schedule else {
        return Some("no working hours on this weekday");
    };
    if !schedule.is_active {
        return Some("working hours for this weekday are inactive");
    }
    if duration == 0 {
        return Some("service has no duration");
    }
    if !schedule.allows_service(service_id) {
        return Some("service is not offered on this weekday");
    }

    let end = start.saturating_add(duration);
    let (open, close) = schedule.window();
    if start < open || end > close {
        return Some("outside working hours");
    }
    match schedule.lunch() {
        Some((lunch_start, lunch_end)) if intervals_overlap(start, end, lunch_start, lunch_end) => {
            Some("overlaps the lunch break")
        }
        _ => None,
    }
}

/// First occupied interval overlapping `[start, start + duration)`.
pub fn find_overlap(
    occupied: &[OccupiedInterval],
    start: u32,
    duration: u32,
) -> Option<&OccupiedInterval> {
    let end = start.saturating_add(duration);
    occupied
        .iter()
        .find(|busy| intervals_overlap(start, end, busy.start(), busy.end()))
}
