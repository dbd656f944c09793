// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use schedule_cell::services::closure::{closure_reason, first_closure};
use shared_database::{DbError, SchedulingStore};
use shared_models::{AppointmentStatus, NewAppointment, Service, Specialist};
use shared_utils::time::{minutes_of, time_from_minutes, to_minutes, weekday_of};

use crate::models::{
    AppointmentError, BookAppointmentRequest, BookingConfirmation, BookingState, PatientInfo,
    ValidatedBooking,
};
use crate::services::conflict::{find_overlap, schedule_rejection};
use crate::services::lifecycle::BookingLifecycle;
use crate::services::patient::{normalize_patient, resolve_patient};

/// End-to-end "book one slot" use case. A booking must fit the weekday's
/// schedule the same way an offered slot does. The storage uniqueness
/// constraint on `(specialist, date, time)` is the final arbiter; the
/// overlap check here only fails fast.
pub struct BookingService {
    store: Arc<dyn SchedulingStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    pub async fn book_appointment(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let mut lifecycle = BookingLifecycle::new();

        match self.run(&mut lifecycle, request).await {
            Ok(confirmation) => Ok(confirmation),
            Err(e) => {
                lifecycle.reject(&e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        lifecycle: &mut BookingLifecycle,
        request: &BookAppointmentRequest,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let booking = validate_request(request)?;
        lifecycle.advance(BookingState::Validating)?;

        info!(
            "Booking {} for specialist {} at {} {}",
            booking.service_id, booking.specialist_id, booking.appointment_date, booking.appointment_time
        );

        let (specialist, service, closures, schedule) = tokio::try_join!(
            self.store.get_specialist(booking.specialist_id),
            self.store.get_service(booking.service_id),
            self.store.get_active_closures(booking.specialist_id, booking.appointment_date),
            self.store
                .get_schedule(booking.specialist_id, weekday_of(booking.appointment_date)),
        )?;
        require_active_specialist(specialist, booking.specialist_id)?;
        let service = require_active_service(service, booking.service_id)?;

        if let Some(closure) = first_closure(booking.appointment_date, &closures) {
            return Err(AppointmentError::ClosureConflict {
                reason: closure_reason(closure),
            });
        }

        let start = minutes_of(booking.appointment_time);
        let rejection = schedule_rejection(schedule.as_ref(), &booking.service_id, start, service.duration);
        if let Some(reason) = rejection {
            debug!(
                "Requested {} on {} rejected: {}",
                booking.appointment_time, booking.appointment_date, reason
            );
            return Err(AppointmentError::SlotUnavailable);
        }

        let occupied = self
            .store
            .get_occupied_intervals(booking.specialist_id, booking.appointment_date)
            .await?;
        if let Some(busy) = find_overlap(&occupied, start, service.duration) {
            debug!(
                "Requested {} overlaps booking at {} ({} min)",
                booking.appointment_time, busy.time, busy.duration
            );
            return Err(AppointmentError::SlotUnavailable);
        }
        lifecycle.advance(BookingState::SlotReserved)?;

        let patient = resolve_patient(self.store.as_ref(), &booking.patient).await?;
        lifecycle.advance(BookingState::PatientResolved)?;

        let new_appointment = NewAppointment {
            specialist_id: booking.specialist_id,
            service_id: booking.service_id,
            patient_id: patient.id,
            appointment_date: booking.appointment_date,
            appointment_time: booking.appointment_time,
            duration: service.duration,
            status: AppointmentStatus::Scheduled,
        };

        let appointment = self
            .store
            .insert_appointment(&new_appointment)
            .await
            .map_err(translate_commit_error)?;
        lifecycle.advance(BookingState::Committed)?;

        info!(
            "Appointment {} committed for patient {} ({} min)",
            appointment.id, patient.id, appointment.duration
        );
        Ok(BookingConfirmation { appointment, patient })
    }
}

/// A uniqueness violation at commit time means another request won the slot.
fn translate_commit_error(err: DbError) -> AppointmentError {
    if err.is_unique_violation() {
        warn!("Slot taken concurrently: {}", err);
        AppointmentError::SlotUnavailable
    } else {
        AppointmentError::Database(err)
    }
}

pub fn validate_request(request: &BookAppointmentRequest) -> Result<ValidatedBooking, AppointmentError> {
    let missing = |field: &str| AppointmentError::InvalidRequest(format!("{} is required", field));

    let specialist_id = request.specialist_id.ok_or_else(|| missing("specialist_id"))?;
    let service_id = request.service_id.ok_or_else(|| missing("service_id"))?;
    let appointment_date = request.appointment_date.ok_or_else(|| missing("appointment_date"))?;
    let raw_time = request
        .appointment_time
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("appointment_time"))?;
    let patient_info: &PatientInfo = request.patient_info.as_ref().ok_or_else(|| missing("patient_info"))?;

    let appointment_time = time_from_minutes(to_minutes(raw_time)?)
        .ok_or_else(|| AppointmentError::InvalidRequest(format!("time out of range: {}", raw_time)))?;

    Ok(ValidatedBooking {
        specialist_id,
        service_id,
        appointment_date,
        appointment_time,
        patient: normalize_patient(patient_info)?,
    })
}

fn require_active_specialist(specialist: Option<Specialist>, id: Uuid) -> Result<Specialist, AppointmentError> {
    match specialist {
        None => Err(AppointmentError::EntityNotFound { entity: "Specialist", id }),
        Some(s) if !s.is_active => Err(AppointmentError::EntityInactive { entity: "Specialist", id }),
        Some(s) => Ok(s),
    }
}

fn require_active_service(service: Option<Service>, id: Uuid) -> Result<Service, AppointmentError> {
    match service {
        None => Err(AppointmentError::EntityNotFound { entity: "Service", id }),
        Some(s) if !s.is_active => Err(AppointmentError::EntityInactive { entity: "Service", id }),
        Some(s) => Ok(s),
    }
}
