// libs/shared/models/src/schedule.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_utils::time::{hhmm, minutes_of};

fn default_true() -> bool {
    true
}

// ==============================================================================
// WEEKLY WORK SCHEDULE
// ==============================================================================

/// Recurring working hours of one specialist for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub specialist_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(with = "hhmm::option", default)]
    pub lunch_start: Option<NaiveTime>,
    #[serde(with = "hhmm::option", default)]
    pub lunch_end: Option<NaiveTime>,
    /// Absent or empty means every service is allowed.
    #[serde(default)]
    pub allowed_services: Option<Vec<Uuid>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleInvariantError {
    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    DayOutOfRange(u8),

    #[error("Start time must be before end time")]
    EmptyWindow,

    #[error("Lunch start and lunch end must be given together")]
    PartialLunch,

    #[error("Lunch break must start before it ends and fall inside working hours")]
    LunchOutsideWindow,
}

impl WorkSchedule {
    /// Working window as minutes since midnight, `[start, end)`.
    pub fn window(&self) -> (u32, u32) {
        (minutes_of(self.start_time), minutes_of(self.end_time))
    }

    pub fn lunch(&self) -> Option<(u32, u32)> {
        match (self.lunch_start, self.lunch_end) {
            (Some(start), Some(end)) => Some((minutes_of(start), minutes_of(end))),
            _ => None,
        }
    }

    pub fn allows_service(&self, service_id: &Uuid) -> bool {
        match &self.allowed_services {
            Some(allowed) if !allowed.is_empty() => allowed.contains(service_id),
            _ => true,
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleInvariantError> {
        if self.day_of_week > 6 {
            return Err(ScheduleInvariantError::DayOutOfRange(self.day_of_week));
        }

        let (start, end) = self.window();
        if start >= end {
            return Err(ScheduleInvariantError::EmptyWindow);
        }

        match (self.lunch_start, self.lunch_end) {
            (None, None) => Ok(()),
            (Some(_), None) | (None, Some(_)) => Err(ScheduleInvariantError::PartialLunch),
            (Some(lunch_start), Some(lunch_end)) => {
                let (lunch_start, lunch_end) = (minutes_of(lunch_start), minutes_of(lunch_end));
                if start <= lunch_start && lunch_start < lunch_end && lunch_end <= end {
                    Ok(())
                } else {
                    Err(ScheduleInvariantError::LunchOutsideWindow)
                }
            }
        }
    }
}

// ==============================================================================
// CLOSURES
// ==============================================================================

/// Date-range override (vacation, holiday) that blocks every booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Closure {
    pub id: Uuid,
    pub specialist_id: Uuid,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Closure {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.is_active && self.start_date <= date && date <= self.end_date
    }
}

// ==============================================================================
// CATALOG
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    /// Minutes. Authoritative length for slot stepping and for the occupied
    /// interval of a new booking.
    pub duration: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialist {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}
