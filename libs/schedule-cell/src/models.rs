// libs/schedule-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use shared_database::DbError;
use shared_models::{AppError, ErrorKind, ScheduleInvariantError, WorkSchedule};
use shared_utils::time::{hhmm, TimeError};

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<NaiveDate>,
    pub service_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub specialist_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub day_of_week: u8,
    pub duration_minutes: u32,
    /// Bookable start times as `HH:MM`, ascending.
    pub available_times: Vec<String>,
}

// ==============================================================================
// SCHEDULE CHANGE MODELS
// ==============================================================================

/// Proposed edit of one weekday schedule, as sent by the admin boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleChangeRequest {
    pub specialist_id: Option<Uuid>,
    pub day_of_week: Option<u8>,
    pub new_start_time: Option<String>,
    pub new_end_time: Option<String>,
    #[serde(default)]
    pub new_lunch_start: Option<String>,
    #[serde(default)]
    pub new_lunch_end: Option<String>,
    /// Left untouched on the stored schedule when absent.
    #[serde(default)]
    pub new_allowed_services: Option<Vec<Uuid>>,
    /// Apply even when existing appointments conflict.
    #[serde(default)]
    pub force_apply: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    OutsideHours,
    LunchConflict,
    ServiceNotAllowed,
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::OutsideHours => write!(f, "outside_hours"),
            ConflictType::LunchConflict => write!(f, "lunch_conflict"),
            ConflictType::ServiceNotAllowed => write!(f, "service_not_allowed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    pub service_name: String,
    pub conflict_type: ConflictType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub has_conflicts: bool,
    pub conflicts: Vec<ScheduleConflict>,
    pub affected_appointments_count: usize,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyScheduleChangeResponse {
    pub schedule: WorkSchedule,
    pub validation: ValidationReport,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

// ==============================================================================
// NOTIFICATION MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScheduleSummary {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(with = "hhmm::option", default)]
    pub lunch_start: Option<NaiveTime>,
    #[serde(with = "hhmm::option", default)]
    pub lunch_end: Option<NaiveTime>,
}

impl From<&WorkSchedule> for NewScheduleSummary {
    fn from(schedule: &WorkSchedule) -> Self {
        Self {
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            lunch_start: schedule.lunch_start,
            lunch_end: schedule.lunch_end,
        }
    }
}

/// Everything an outgoing message to one affected patient needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleChangeNotification {
    pub appointment_id: Uuid,
    pub patient_email: String,
    pub patient_name: String,
    pub original_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub original_time: NaiveTime,
    pub service_name: String,
    pub conflict_type: ConflictType,
    pub new_schedule: NewScheduleSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification rejected by sender ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Notification transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug)]
pub enum ScheduleError {
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

    #[error("{} existing appointment(s) conflict with the new schedule", .report.affected_appointments_count)]
    ScheduleConflict { report: Box<ValidationReport> },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<ScheduleInvariantError> for ScheduleError {
    fn from(err: ScheduleInvariantError) -> Self {
        ScheduleError::InvalidRequest(err.to_string())
    }
}

impl ScheduleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduleError::InvalidTimeFormat(_) => ErrorKind::InvalidTimeFormat,
            ScheduleError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ScheduleError::EntityNotFound { .. } => ErrorKind::EntityNotFound,
            ScheduleError::EntityInactive { .. } => ErrorKind::EntityInactive,
            ScheduleError::ClosureConflict { .. } => ErrorKind::ClosureConflict,
            ScheduleError::ScheduleConflict { .. } => ErrorKind::ScheduleConflict,
            ScheduleError::Database(_) => ErrorKind::Database,
        }
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Database(e) => AppError::Database(e.to_string()),
            ScheduleError::ScheduleConflict { report } => AppError::Rejected {
                kind: ErrorKind::ScheduleConflict,
                message: format!(
                    "Schedule conflict detected: {}",
                    report.recommendation
                ),
                details: serde_json::to_value(&*report).ok(),
            },
            ScheduleError::ClosureConflict { ref reason } => AppError::Rejected {
                kind: ErrorKind::ClosureConflict,
                message: err.to_string(),
                details: Some(serde_json::json!({ "reason": reason })),
            },
            other => AppError::rejected(other.kind(), other.to_string()),
        }
    }
}
