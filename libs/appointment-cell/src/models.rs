// libs/appointment-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use shared_database::DbError;
use shared_models::{Appointment, AppError, ErrorKind, NewPatient, Patient};
use shared_utils::time::TimeError;

// ==============================================================================
// REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Public "book one slot" payload. Every field is optional on the wire so a
/// missing one is reported as an invalid request rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub specialist_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<String>,
    #[serde(default)]
    pub patient_info: Option<PatientInfo>,
}

/// A booking request with every required field present and normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    pub specialist_id: Uuid,
    pub service_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub patient: NewPatient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub appointment: Appointment,
    pub patient: Patient,
}

// ==============================================================================
// BOOKING STATE MACHINE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    Requested,
    Validating,
    SlotReserved,
    PatientResolved,
    Committed,
    Rejected,
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingState::Requested => write!(f, "requested"),
            BookingState::Validating => write!(f, "validating"),
            BookingState::SlotReserved => write!(f, "slot_reserved"),
            BookingState::PatientResolved => write!(f, "patient_resolved"),
            BookingState::Committed => write!(f, "committed"),
            BookingState::Rejected => write!(f, "rejected"),
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error(transparent)]
    InvalidTimeFormat(#[from] TimeError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{entity} {id} not found")]
    EntityNotFound { entity: &'static str, id: Uuid },

    #[error("{entity} {id} is not active")]
    EntityInactive { entity: &'static str, id: Uuid },

    #[error("No appointments available on this date: {reason}")]
    ClosureConflict { reason: String },

    #[error("The selected time is no longer available, please choose a different time")]
    SlotUnavailable,

    #[error("Booking cannot move from {from} to {to}")]
    InvalidStateTransition { from: BookingState, to: BookingState },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl AppointmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppointmentError::InvalidTimeFormat(_) => ErrorKind::InvalidTimeFormat,
            AppointmentError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            AppointmentError::EntityNotFound { .. } => ErrorKind::EntityNotFound,
            AppointmentError::EntityInactive { .. } => ErrorKind::EntityInactive,
            AppointmentError::ClosureConflict { .. } => ErrorKind::ClosureConflict,
            AppointmentError::SlotUnavailable => ErrorKind::SlotUnavailable,
            AppointmentError::InvalidStateTransition { .. } => ErrorKind::Internal,
            AppointmentError::Database(_) => ErrorKind::Database,
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Database(e) => AppError::Database(e.to_string()),
            AppointmentError::InvalidStateTransition { .. } => AppError::Internal(err.to_string()),
            AppointmentError::ClosureConflict { ref reason } => AppError::Rejected {
                kind: ErrorKind::ClosureConflict,
                message: err.to_string(),
                details: Some(serde_json::json!({ "reason": reason })),
            },
            other => AppError::rejected(other.kind(), other.to_string()),
        }
    }
}
