// libs/schedule-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::SchedulingStore;
use shared_models::{Service, Specialist};
use shared_utils::time::{format_minutes, weekday_of};

use crate::models::{AvailabilityResponse, ScheduleError};
use crate::services::closure::{closure_reason, first_closure};
use crate::services::slots::SlotPlan;

/// Single path for every "which times can be booked" question, public or
/// admin.
pub struct AvailabilityService {
    store: Arc<dyn SchedulingStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    pub async fn available_times(
        &self,
        specialist_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
    ) -> Result<AvailabilityResponse, ScheduleError> {
        debug!(
            "Computing availability for specialist {} service {} on {}",
            specialist_id, service_id, date
        );

        let (specialist, service, closures) = tokio::try_join!(
            self.store.get_specialist(specialist_id),
            self.store.get_service(service_id),
            self.store.get_active_closures(specialist_id, date),
        )?;
        let specialist = require_active_specialist(specialist, specialist_id)?;
        let service = require_active_service(service, service_id)?;

        if let Some(closure) = first_closure(date, &closures) {
            let reason = closure_reason(closure);
            info!("Specialist {} is closed on {}: {}", specialist.id, date, reason);
            return Err(ScheduleError::ClosureConflict { reason });
        }

        let day_of_week = weekday_of(date);
        let mut response = AvailabilityResponse {
            specialist_id,
            service_id,
            date,
            day_of_week,
            duration_minutes: service.duration,
            available_times: Vec::new(),
        };

        let schedule = match self.store.get_schedule(specialist_id, day_of_week).await? {
            Some(schedule) if schedule.is_active => schedule,
            _ => {
                debug!("No active schedule for specialist {} on day {}", specialist_id, day_of_week);
                return Ok(response);
            }
        };

        if !schedule.allows_service(&service_id) {
            debug!("Service {} not offered on day {}", service_id, day_of_week);
            return Ok(response);
        }

        let occupied = self.store.get_occupied_intervals(specialist_id, date).await?;
        let plan = SlotPlan::new(&schedule, &service_id, service.duration, &occupied);
        response.available_times = plan.slots().map(format_minutes).collect();

        debug!(
            "{} open slots for specialist {} on {} ({} bookings)",
            response.available_times.len(),
            specialist_id,
            date,
            occupied.len()
        );
        Ok(response)
    }
}

pub(crate) fn require_active_specialist(
    specialist: Option<Specialist>,
    id: Uuid,
) -> Result<Specialist, ScheduleError> {
    match specialist {
        None => Err(ScheduleError::EntityNotFound { entity: "Specialist", id }),
        Some(s) if !s.is_active => Err(ScheduleError::EntityInactive { entity: "Specialist", id }),
        Some(s) => Ok(s),
    }
}

fn require_active_service(service: Option<Service>, id: Uuid) -> Result<Service, ScheduleError> {
    match service {
        None => Err(ScheduleError::EntityNotFound { entity: "Service", id }),
        Some(s) if !s.is_active => Err(ScheduleError::EntityInactive { entity: "Service", id }),
        Some(s) => Ok(s),
    }
}
