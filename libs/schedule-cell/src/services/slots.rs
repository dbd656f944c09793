// libs/schedule-cell/src/services/slots.rs
//
// Candidate start times step by the requested service's own duration from
// the start of the working window. A candidate overlapping an existing
// booking moves the cursor to the end of that booking so the following
// candidates line up behind it.

use uuid::Uuid;

use shared_models::{OccupiedInterval, WorkSchedule};
use shared_utils::time::intervals_overlap;

/// Immutable inputs of one slot computation. Iterating it any number of
/// times yields the same sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPlan {
    window: (u32, u32),
    lunch: Option<(u32, u32)>,
    duration: u32,
    occupied: Vec<(u32, u32)>,
    bookable: bool,
}

impl SlotPlan {
    pub fn new(
        schedule: &WorkSchedule,
        service_id: &Uuid,
        duration: u32,
        occupied: &[OccupiedInterval],
    ) -> Self {
        let bookable = schedule.is_active && duration > 0 && schedule.allows_service(service_id);

        let mut occupied: Vec<(u32, u32)> = occupied
            .iter()
            .filter(|interval| interval.duration > 0)
            .map(|interval| (interval.start(), interval.end()))
            .collect();
        occupied.sort_unstable();

        Self {
            window: schedule.window(),
            lunch: schedule.lunch().filter(|(start, end)| start < end),
            duration,
            occupied,
            bookable,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn slots(&self) -> Slots<'_> {
        Slots {
            plan: self,
            cursor: self.window.0,
            done: !self.bookable,
        }
    }

    /// Latest end among occupied intervals overlapping `[start, end)`.
    fn blocked_until(&self, start: u32, end: u32) -> Option<u32> {
        self.occupied
            .iter()
            .filter(|(busy_start, busy_end)| intervals_overlap(start, end, *busy_start, *busy_end))
            .map(|(_, busy_end)| *busy_end)
            .max()
    }
}

/// Ascending start minutes of the open slots of a [`SlotPlan`].
#[derive(Debug, Clone)]
pub struct Slots<'a> {
    plan: &'a SlotPlan,
    cursor: u32,
    done: bool,
}

impl Iterator for Slots<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.done {
            return None;
        }

        let (_, window_end) = self.plan.window;
        let duration = self.plan.duration;

        loop {
            let start = self.cursor;
            let end = start.saturating_add(duration);
            if end > window_end {
                self.done = true;
                return None;
            }

            if let Some(busy_end) = self.plan.blocked_until(start, end) {
                // busy_end > start always holds for an overlapping interval
                self.cursor = busy_end;
                continue;
            }

            self.cursor = end;
            if let Some((lunch_start, lunch_end)) = self.plan.lunch {
                if intervals_overlap(start, end, lunch_start, lunch_end) {
                    continue;
                }
            }

            return Some(start);
        }
    }
}

/// Open start minutes for a service of `duration` minutes on a day governed
/// by `schedule`.
pub fn generate_slots(
    schedule: &WorkSchedule,
    service_id: &Uuid,
    duration: u32,
    occupied: &[OccupiedInterval],
) -> Vec<u32> {
    SlotPlan::new(schedule, service_id, duration, occupied).slots().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_database::fixtures::{standard_schedule, time};
    use shared_utils::time::{format_minutes, to_minutes};

    fn busy(hour: u32, minute: u32, duration: u32) -> OccupiedInterval {
        OccupiedInterval { time: time(hour, minute), duration }
    }

    fn rendered(slots: &[u32]) -> Vec<String> {
        slots.iter().map(|m| format_minutes(*m)).collect()
    }

    #[test]
    fn standard_day_steps_by_service_duration_around_lunch() {
        let schedule = standard_schedule(Uuid::new_v4(), 1);
        let slots = generate_slots(&schedule, &Uuid::new_v4(), 45, &[]);
        let times = rendered(&slots);

        assert_eq!(times.first().map(String::as_str), Some("09:00"));
        assert_eq!(times.last().map(String::as_str), Some("17:15"));
        assert!(!times.contains(&"12:45".to_string()));
        assert!(slots.iter().all(|s| !intervals_overlap(*s, s + 45, 780, 840)));
        assert!(slots.iter().all(|s| s + 45 <= 1080));
    }

    #[test]
    fn existing_booking_blocks_overlapping_candidates() {
        let schedule = standard_schedule(Uuid::new_v4(), 1);
        let slots = generate_slots(&schedule, &Uuid::new_v4(), 45, &[busy(10, 0, 45)]);
        let times = rendered(&slots);

        assert!(times.contains(&"09:00".to_string()));
        assert!(!times.contains(&"09:45".to_string()));
        assert!(times.contains(&"10:45".to_string()));
        assert!(slots.iter().all(|s| !intervals_overlap(*s, s + 45, 600, 645)));
    }

    #[test]
    fn disallowed_service_yields_nothing() {
        let allowed = Uuid::new_v4();
        let mut schedule = standard_schedule(Uuid::new_v4(), 1);
        schedule.allowed_services = Some(vec![allowed]);

        assert!(generate_slots(&schedule, &Uuid::new_v4(), 45, &[]).is_empty());
        assert!(!generate_slots(&schedule, &allowed, 45, &[]).is_empty());
    }

    #[test]
    fn empty_allow_list_allows_everything() {
        let mut schedule = standard_schedule(Uuid::new_v4(), 1);
        schedule.allowed_services = Some(vec![]);
        assert!(!generate_slots(&schedule, &Uuid::new_v4(), 30, &[]).is_empty());
    }

    #[test]
    fn window_shorter_than_service_yields_nothing() {
        let mut schedule = standard_schedule(Uuid::new_v4(), 1);
        schedule.start_time = time(9, 0);
        schedule.end_time = time(9, 30);
        schedule.lunch_start = None;
        schedule.lunch_end = None;

        assert!(generate_slots(&schedule, &Uuid::new_v4(), 45, &[]).is_empty());
        assert_eq!(generate_slots(&schedule, &Uuid::new_v4(), 30, &[]), vec![540]);
    }

    #[test]
    fn inactive_schedule_and_zero_duration_yield_nothing() {
        let mut schedule = standard_schedule(Uuid::new_v4(), 1);
        assert!(generate_slots(&schedule, &Uuid::new_v4(), 0, &[]).is_empty());

        schedule.is_active = false;
        assert!(generate_slots(&schedule, &Uuid::new_v4(), 45, &[]).is_empty());
    }

    #[test]
    fn plan_is_restartable() {
        let schedule = standard_schedule(Uuid::new_v4(), 1);
        let plan = SlotPlan::new(&schedule, &Uuid::new_v4(), 60, &[busy(11, 0, 90), busy(15, 30, 30)]);

        let first: Vec<u32> = plan.slots().collect();
        let second: Vec<u32> = plan.slots().collect();
        assert_eq!(first, second);
        assert!(first.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn overlapping_bookings_realign_to_the_latest_end() {
        let mut schedule = standard_schedule(Uuid::new_v4(), 1);
        schedule.lunch_start = None;
        schedule.lunch_end = None;

        let occupied = [busy(9, 0, 60), busy(9, 30, 90)];
        let slots = generate_slots(&schedule, &Uuid::new_v4(), 60, &occupied);

        assert_eq!(slots.first().copied(), to_minutes("11:00").ok());
        assert!(slots
            .iter()
            .all(|s| occupied.iter().all(|b| !intervals_overlap(*s, s + 60, b.start(), b.end()))));
    }

    #[test]
    fn bookings_outside_the_window_are_ignored() {
        let schedule = standard_schedule(Uuid::new_v4(), 1);
        let plain = generate_slots(&schedule, &Uuid::new_v4(), 45, &[]);
        let with_noise = generate_slots(&schedule, &Uuid::new_v4(), 45, &[busy(7, 0, 60), busy(20, 0, 30)]);
        assert_eq!(plain, with_noise);
    }

    #[test]
    fn oversized_durations_end_the_day_instead_of_overflowing() {
        let schedule = standard_schedule(Uuid::new_v4(), 1);
        assert!(generate_slots(&schedule, &Uuid::new_v4(), u32::MAX, &[]).is_empty());

        let slots = generate_slots(&schedule, &Uuid::new_v4(), 45, &[busy(10, 0, u32::MAX)]);
        assert_eq!(rendered(&slots), vec!["09:00"]);
    }
}
