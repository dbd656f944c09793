// libs/shared/models/src/appointment.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_utils::time::{hhmm, minutes_of};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Cancelled appointments never hold a slot.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub specialist_id: Uuid,
    pub service_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    /// Minutes, snapshotted from the service when the booking was made.
    pub duration: u32,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Appointment {
    pub fn interval(&self) -> (u32, u32) {
        let start = minutes_of(self.appointment_time);
        (start, start.saturating_add(self.duration))
    }

    pub fn occupied_interval(&self) -> Option<OccupiedInterval> {
        self.status.occupies_slot().then(|| OccupiedInterval {
            time: self.appointment_time,
            duration: self.duration,
        })
    }
}

/// Row written by the booking orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub specialist_id: Uuid,
    pub service_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    pub duration: u32,
    pub status: AppointmentStatus,
}

/// Time range consumed by a non-cancelled appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedInterval {
    #[serde(rename = "appointment_time", with = "hhmm")]
    pub time: NaiveTime,
    pub duration: u32,
}

impl OccupiedInterval {
    pub fn start(&self) -> u32 {
        minutes_of(self.time)
    }

    pub fn end(&self) -> u32 {
        self.start().saturating_add(self.duration)
    }
}

/// Upcoming appointment joined with the patient and service data needed to
/// report a schedule conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub id: Uuid,
    pub specialist_id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    pub patient_name: String,
    pub patient_email: String,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    pub duration: u32,
    pub status: AppointmentStatus,
}

impl AppointmentDetails {
    pub fn interval(&self) -> (u32, u32) {
        let start = minutes_of(self.appointment_time);
        (start, start.saturating_add(self.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_appointments_do_not_occupy() {
        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            specialist_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            appointment_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration: 45,
            status: AppointmentStatus::Scheduled,
            notes: None,
        };
        assert_eq!(appointment.interval(), (600, 645));
        assert_eq!(appointment.occupied_interval().map(|i| i.end()), Some(645));

        appointment.status = AppointmentStatus::Completed;
        assert!(appointment.occupied_interval().is_some());

        appointment.status = AppointmentStatus::Cancelled;
        assert!(appointment.occupied_interval().is_none());
    }

    #[test]
    fn occupied_interval_reads_storage_columns() {
        let interval: OccupiedInterval =
            serde_json::from_str(r#"{"appointment_time":"10:00:00","duration":45}"#).unwrap();
        assert_eq!((interval.start(), interval.end()), (600, 645));
    }

    #[test]
    fn corrupt_duration_saturates_the_interval_end() {
        let interval = OccupiedInterval {
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration: u32::MAX,
        };
        assert_eq!(interval.end(), u32::MAX);
    }
}
