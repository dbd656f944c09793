// libs/schedule-cell/src/services/schedule_change.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use shared_database::SchedulingStore;
use shared_models::{AppointmentDetails, WorkSchedule};
use shared_utils::time::{format_minutes, intervals_overlap, time_from_minutes, to_minutes, weekday_of};

use crate::models::{
    ApplyScheduleChangeResponse, ConflictType, ScheduleChangeRequest, ScheduleConflict,
    ScheduleError, ValidationReport,
};
use crate::services::notification::{build_notifications, NotificationSender};

// ==============================================================================
// PURE VALIDATION
// ==============================================================================

/// First conflict an appointment would have under `proposed`, checked in
/// order outside hours, lunch, service.
pub fn classify(proposed: &WorkSchedule, appointment: &AppointmentDetails) -> Option<ConflictType> {
    let (start, end) = appointment.interval();
    let (open, close) = proposed.window();

    if start < open || end > close {
        return Some(ConflictType::OutsideHours);
    }

    if let Some((lunch_start, lunch_end)) = proposed.lunch() {
        if intervals_overlap(start, end, lunch_start, lunch_end) {
            return Some(ConflictType::LunchConflict);
        }
    }

    if !proposed.allows_service(&appointment.service_id) {
        return Some(ConflictType::ServiceNotAllowed);
    }

    None
}

pub fn recommendation(affected: usize) -> String {
    match affected {
        0 => "No existing appointments are affected. The schedule change can be applied immediately."
            .to_string(),
        1 => "1 appointment affected by this schedule change. Confirm with the administrator before applying it; the affected patient will be notified."
            .to_string(),
        n => format!(
            "{} appointments affected by this schedule change. Confirm with the administrator before applying it; the affected patients will be notified.",
            n
        ),
    }
}

/// Classifies the non-cancelled appointments of `proposed`'s specialist that
/// fall on its weekday on or after `today`. Never touches storage.
pub fn validate_schedule_change(
    proposed: &WorkSchedule,
    appointments: &[AppointmentDetails],
    today: NaiveDate,
) -> ValidationReport {
    let conflicts: Vec<ScheduleConflict> = appointments
        .iter()
        .filter(|a| {
            a.specialist_id == proposed.specialist_id
                && a.status.occupies_slot()
                && a.appointment_date >= today
                && weekday_of(a.appointment_date) == proposed.day_of_week
        })
        .filter_map(|a| {
            classify(proposed, a).map(|conflict_type| ScheduleConflict {
                appointment_id: a.id,
                patient_name: a.patient_name.clone(),
                patient_email: a.patient_email.clone(),
                appointment_date: a.appointment_date,
                appointment_time: a.appointment_time,
                service_name: a.service_name.clone(),
                conflict_type,
            })
        })
        .collect();

    let affected = conflicts.len();
    ValidationReport {
        has_conflicts: affected > 0,
        conflicts,
        affected_appointments_count: affected,
        recommendation: recommendation(affected),
    }
}

// ==============================================================================
// SCHEDULE CHANGE SERVICE
// ==============================================================================

pub struct ScheduleChangeService {
    store: Arc<dyn SchedulingStore>,
    notifier: Arc<dyn NotificationSender>,
}

impl ScheduleChangeService {
    pub fn new(store: Arc<dyn SchedulingStore>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self { store, notifier }
    }

    /// Dry run: reports which future appointments the change would break.
    pub async fn validate_change(
        &self,
        request: &ScheduleChangeRequest,
        today: NaiveDate,
    ) -> Result<ValidationReport, ScheduleError> {
        let proposed = self.build_proposal(request).await?;
        let report = self.check_against_bookings(&proposed, today).await?;

        debug!(
            "Schedule change for specialist {} day {} affects {} appointment(s)",
            proposed.specialist_id, proposed.day_of_week, report.affected_appointments_count
        );
        Ok(report)
    }

    /// Validates, notifies affected patients when forced, then stores the
    /// new schedule.
    pub async fn apply_change(
        &self,
        request: &ScheduleChangeRequest,
        today: NaiveDate,
    ) -> Result<ApplyScheduleChangeResponse, ScheduleError> {
        let proposed = self.build_proposal(request).await?;
        let report = self.check_against_bookings(&proposed, today).await?;

        if report.has_conflicts && !request.force_apply {
            warn!(
                "Refusing schedule change for specialist {} day {}: {} conflicting appointment(s)",
                proposed.specialist_id, proposed.day_of_week, report.affected_appointments_count
            );
            return Err(ScheduleError::ScheduleConflict { report: Box::new(report) });
        }

        let mut notifications_sent = 0;
        let mut notifications_failed = 0;
        if report.has_conflicts {
            let notifications = build_notifications(&report.conflicts, &proposed);
            let summary = self.notifier.send_all(&notifications).await;
            notifications_sent = summary.succeeded;
            notifications_failed = summary.failed;
        }

        let schedule = self.store.upsert_schedule(&proposed).await?;

        info!(
            specialist_id = %schedule.specialist_id,
            day_of_week = schedule.day_of_week,
            start_time = %format_minutes(schedule.window().0),
            end_time = %format_minutes(schedule.window().1),
            forced = request.force_apply,
            affected = report.affected_appointments_count,
            notifications_sent,
            notifications_failed,
            "Schedule change applied"
        );

        Ok(ApplyScheduleChangeResponse {
            schedule,
            validation: report,
            notifications_sent,
            notifications_failed,
        })
    }

    async fn check_against_bookings(
        &self,
        proposed: &WorkSchedule,
        today: NaiveDate,
    ) -> Result<ValidationReport, ScheduleError> {
        let appointments = self
            .store
            .get_future_appointments(proposed.specialist_id, proposed.day_of_week, today)
            .await?;
        Ok(validate_schedule_change(proposed, &appointments, today))
    }

    /// Turns the request into the complete schedule row that would be stored.
    async fn build_proposal(&self, request: &ScheduleChangeRequest) -> Result<WorkSchedule, ScheduleError> {
        let specialist_id = request
            .specialist_id
            .ok_or_else(|| ScheduleError::InvalidRequest("specialist_id is required".to_string()))?;
        let day_of_week = request
            .day_of_week
            .ok_or_else(|| ScheduleError::InvalidRequest("day_of_week is required".to_string()))?;

        let start_time = required_time("new_start_time", request.new_start_time.as_deref())?;
        let end_time = required_time("new_end_time", request.new_end_time.as_deref())?;
        let lunch_start = optional_time(request.new_lunch_start.as_deref())?;
        let lunch_end = optional_time(request.new_lunch_end.as_deref())?;

        if self.store.get_specialist(specialist_id).await?.is_none() {
            return Err(ScheduleError::EntityNotFound { entity: "Specialist", id: specialist_id });
        }
        let existing = self.store.get_schedule(specialist_id, day_of_week).await?;

        let proposed = WorkSchedule {
            id: existing.as_ref().and_then(|s| s.id),
            specialist_id,
            day_of_week,
            start_time,
            end_time,
            lunch_start,
            lunch_end,
            allowed_services: request
                .new_allowed_services
                .clone()
                .or_else(|| existing.as_ref().and_then(|s| s.allowed_services.clone())),
            is_active: existing.as_ref().map_or(true, |s| s.is_active),
        };
        proposed.validate()?;

        Ok(proposed)
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, ScheduleError> {
    let minutes = to_minutes(value)?;
    time_from_minutes(minutes)
        .ok_or_else(|| ScheduleError::InvalidRequest(format!("time out of range: {}", value)))
}

fn required_time(field: &str, value: Option<&str>) -> Result<NaiveTime, ScheduleError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => parse_time(value),
        None => Err(ScheduleError::InvalidRequest(format!("{} is required", field))),
    }
}

fn optional_time(value: Option<&str>) -> Result<Option<NaiveTime>, ScheduleError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(parse_time)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_database::fixtures::{date, standard_schedule, time};
    use shared_models::AppointmentStatus;
    use uuid::Uuid;

    // 2025-06-02 is a Monday
    const MONDAY: u8 = 1;

    fn booking(specialist_id: Uuid, on: NaiveDate, at: NaiveTime, duration: u32) -> AppointmentDetails {
        AppointmentDetails {
            id: Uuid::new_v4(),
            specialist_id,
            service_id: Uuid::new_v4(),
            service_name: "Limpieza facial".to_string(),
            patient_name: "Ana Torres".to_string(),
            patient_email: "ana@example.com".to_string(),
            appointment_date: on,
            appointment_time: at,
            duration,
            status: AppointmentStatus::Scheduled,
        }
    }

    #[test]
    fn outside_hours_takes_precedence_over_lunch() {
        let specialist = Uuid::new_v4();
        let mut proposed = standard_schedule(specialist, MONDAY);
        proposed.end_time = time(13, 30);

        let straddling = booking(specialist, date(2025, 6, 2), time(13, 0), 45);
        assert_eq!(classify(&proposed, &straddling), Some(ConflictType::OutsideHours));
    }

    #[test]
    fn lunch_takes_precedence_over_service() {
        let specialist = Uuid::new_v4();
        let mut proposed = standard_schedule(specialist, MONDAY);
        proposed.allowed_services = Some(vec![Uuid::new_v4()]);

        let at_lunch = booking(specialist, date(2025, 6, 2), time(12, 30), 45);
        assert_eq!(classify(&proposed, &at_lunch), Some(ConflictType::LunchConflict));

        let morning = booking(specialist, date(2025, 6, 2), time(10, 0), 45);
        assert_eq!(classify(&proposed, &morning), Some(ConflictType::ServiceNotAllowed));
    }

    #[test]
    fn booking_ending_at_close_is_inside_hours() {
        let specialist = Uuid::new_v4();
        let proposed = standard_schedule(specialist, MONDAY);
        let last = booking(specialist, date(2025, 6, 2), time(17, 15), 45);
        assert_eq!(classify(&proposed, &last), None);
    }

    #[test]
    fn ignores_past_cancelled_and_other_weekday_appointments() {
        let specialist = Uuid::new_v4();
        let mut proposed = standard_schedule(specialist, MONDAY);
        proposed.start_time = time(10, 0);
        let today = date(2025, 6, 2);

        let mut cancelled = booking(specialist, date(2025, 6, 9), time(9, 0), 45);
        cancelled.status = AppointmentStatus::Cancelled;
        let appointments = vec![
            booking(specialist, date(2025, 5, 26), time(9, 0), 45),
            booking(specialist, date(2025, 6, 3), time(9, 0), 45),
            booking(Uuid::new_v4(), date(2025, 6, 9), time(9, 0), 45),
            cancelled,
            booking(specialist, today, time(9, 30), 45),
        ];

        let report = validate_schedule_change(&proposed, &appointments, today);
        assert_eq!(report.affected_appointments_count, 1);
        assert_eq!(report.conflicts[0].appointment_date, today);
    }

    #[test]
    fn recommendation_states_the_count() {
        assert!(recommendation(0).contains("applied immediately"));
        assert!(recommendation(1).starts_with("1 appointment affected"));
        assert!(recommendation(3).starts_with("3 appointments affected"));
        assert!(recommendation(3).contains("Confirm"));
    }

    #[test]
    fn time_fields_are_parsed_strictly() {
        assert!(optional_time(Some("  ")).unwrap().is_none());
        assert_eq!(optional_time(Some("13:00")).unwrap(), Some(time(13, 0)));
        assert!(matches!(
            required_time("new_start_time", Some("9am")),
            Err(ScheduleError::InvalidTimeFormat(_))
        ));
        assert!(matches!(
            required_time("new_start_time", None),
            Err(ScheduleError::InvalidRequest(_))
        ));
    }
}
