// libs/shared/database/src/store.rs
//
// Collaborator interfaces the scheduling core reads and writes through.
// Implementations must enforce uniqueness of `(specialist_id,
// appointment_date, appointment_time)` across non-cancelled appointments and
// report a duplicate as `DbError::UniqueViolation`.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentDetails, Closure, NewAppointment, NewPatient, OccupiedInterval,
    Patient, PatientUpdate, Service, Specialist, WorkSchedule,
};

use crate::error::DbError;

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get_schedule(
        &self,
        specialist_id: Uuid,
        day_of_week: u8,
    ) -> Result<Option<WorkSchedule>, DbError>;

    /// One row per `(specialist, weekday)`; replaces any existing row.
    async fn upsert_schedule(&self, schedule: &WorkSchedule) -> Result<WorkSchedule, DbError>;
}

#[async_trait]
pub trait ClosureStore: Send + Sync {
    /// Active closures whose inclusive range contains `date`.
    async fn get_active_closures(
        &self,
        specialist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Closure>, DbError>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Intervals held by non-cancelled appointments on `date`.
    async fn get_occupied_intervals(
        &self,
        specialist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<OccupiedInterval>, DbError>;

    async fn insert_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, DbError>;

    /// Non-cancelled appointments on or after `from` that fall on `day_of_week`.
    async fn get_future_appointments(
        &self,
        specialist_id: Uuid,
        day_of_week: u8,
        from: NaiveDate,
    ) -> Result<Vec<AppointmentDetails>, DbError>;
}

#[async_trait]
pub trait PatientStore: Send + Sync {
    /// `email` is expected already normalised (trimmed, lower-case).
    async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, DbError>;

    async fn insert_patient(&self, patient: &NewPatient) -> Result<Patient, DbError>;

    async fn update_patient(&self, patient_id: Uuid, update: &PatientUpdate) -> Result<Patient, DbError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Returns the specialist regardless of its active flag.
    async fn get_specialist(&self, specialist_id: Uuid) -> Result<Option<Specialist>, DbError>;

    /// Returns the service regardless of its active flag.
    async fn get_service(&self, service_id: Uuid) -> Result<Option<Service>, DbError>;
}

/// Everything the scheduling cells need from storage.
pub trait SchedulingStore:
    ScheduleStore + ClosureStore + AppointmentStore + PatientStore + CatalogStore
{
}

impl<T> SchedulingStore for T where
    T: ScheduleStore + ClosureStore + AppointmentStore + PatientStore + CatalogStore
{
}
