// libs/shared/database/src/memory.rs
//
// Process-local store used when Supabase is not configured and by the test
// suites. It enforces the same booking uniqueness constraint as the real
// schema so the booking orchestrator behaves identically against it.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentDetails, Closure, NewAppointment, NewPatient, OccupiedInterval,
    Patient, PatientUpdate, Service, Specialist, WorkSchedule,
};
use shared_utils::time::weekday_of;

use crate::error::DbError;
use crate::store::{AppointmentStore, CatalogStore, ClosureStore, PatientStore, ScheduleStore};

#[derive(Debug, Default)]
struct MemoryState {
    schedules: HashMap<(Uuid, u8), WorkSchedule>,
    closures: Vec<Closure>,
    appointments: Vec<Appointment>,
    patients: Vec<Patient>,
    specialists: HashMap<Uuid, Specialist>,
    services: HashMap<Uuid, Service>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_specialist(&self, specialist: Specialist) {
        self.state.write().await.specialists.insert(specialist.id, specialist);
    }

    pub async fn add_service(&self, service: Service) {
        self.state.write().await.services.insert(service.id, service);
    }

    pub async fn add_closure(&self, closure: Closure) {
        self.state.write().await.closures.push(closure);
    }

    /// Seed an appointment as-is, bypassing the uniqueness check.
    pub async fn add_appointment(&self, appointment: Appointment) {
        self.state.write().await.appointments.push(appointment);
    }

    pub async fn add_patient(&self, patient: Patient) {
        self.state.write().await.patients.push(patient);
    }

    pub async fn appointments(&self) -> Vec<Appointment> {
        self.state.read().await.appointments.clone()
    }

    pub async fn patients(&self) -> Vec<Patient> {
        self.state.read().await.patients.clone()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn get_schedule(
        &self,
        specialist_id: Uuid,
        day_of_week: u8,
    ) -> Result<Option<WorkSchedule>, DbError> {
        Ok(self
            .state
            .read()
            .await
            .schedules
            .get(&(specialist_id, day_of_week))
            .cloned())
    }

    async fn upsert_schedule(&self, schedule: &WorkSchedule) -> Result<WorkSchedule, DbError> {
        let mut state = self.state.write().await;
        let key = (schedule.specialist_id, schedule.day_of_week);

        let mut stored = schedule.clone();
        if stored.id.is_none() {
            stored.id = state
                .schedules
                .get(&key)
                .and_then(|existing| existing.id)
                .or_else(|| Some(Uuid::new_v4()));
        }

        state.schedules.insert(key, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl ClosureStore for InMemoryStore {
    async fn get_active_closures(
        &self,
        specialist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Closure>, DbError> {
        let mut closures: Vec<Closure> = self
            .state
            .read()
            .await
            .closures
            .iter()
            .filter(|c| c.specialist_id == specialist_id && c.covers(date))
            .cloned()
            .collect();
        closures.sort_by_key(|c| c.start_date);
        Ok(closures)
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn get_occupied_intervals(
        &self,
        specialist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<OccupiedInterval>, DbError> {
        let mut intervals: Vec<OccupiedInterval> = self
            .state
            .read()
            .await
            .appointments
            .iter()
            .filter(|a| a.specialist_id == specialist_id && a.appointment_date == date)
            .filter_map(Appointment::occupied_interval)
            .collect();
        intervals.sort_by_key(|i| i.start());
        Ok(intervals)
    }

    async fn insert_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, DbError> {
        let mut state = self.state.write().await;

        let duplicate = state.appointments.iter().any(|existing| {
            existing.status.occupies_slot()
                && existing.specialist_id == appointment.specialist_id
                && existing.appointment_date == appointment.appointment_date
                && existing.appointment_time == appointment.appointment_time
        });
        if duplicate {
            warn!(
                "Rejecting duplicate booking for specialist {} at {} {}",
                appointment.specialist_id, appointment.appointment_date, appointment.appointment_time
            );
            return Err(DbError::UniqueViolation(
                "duplicate key value violates unique constraint \"appointments_unique_slot\"".to_string(),
            ));
        }

        let created = Appointment {
            id: Uuid::new_v4(),
            specialist_id: appointment.specialist_id,
            service_id: appointment.service_id,
            patient_id: appointment.patient_id,
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            duration: appointment.duration,
            status: appointment.status,
            notes: None,
        };
        debug!("Stored appointment {}", created.id);
        state.appointments.push(created.clone());
        Ok(created)
    }

    async fn get_future_appointments(
        &self,
        specialist_id: Uuid,
        day_of_week: u8,
        from: NaiveDate,
    ) -> Result<Vec<AppointmentDetails>, DbError> {
        let state = self.state.read().await;

        let mut details: Vec<AppointmentDetails> = state
            .appointments
            .iter()
            .filter(|a| {
                a.specialist_id == specialist_id
                    && a.status.occupies_slot()
                    && a.appointment_date >= from
                    && weekday_of(a.appointment_date) == day_of_week
            })
            .map(|a| {
                let patient = state.patients.iter().find(|p| p.id == a.patient_id);
                let service = state.services.get(&a.service_id);
                AppointmentDetails {
                    id: a.id,
                    specialist_id: a.specialist_id,
                    service_id: a.service_id,
                    service_name: service.map(|s| s.name.clone()).unwrap_or_default(),
                    patient_name: patient.map(|p| p.name.clone()).unwrap_or_default(),
                    patient_email: patient.map(|p| p.email.clone()).unwrap_or_default(),
                    appointment_date: a.appointment_date,
                    appointment_time: a.appointment_time,
                    duration: a.duration,
                    status: a.status,
                }
            })
            .collect();
        details.sort_by_key(|d| (d.appointment_date, d.appointment_time));
        Ok(details)
    }
}

#[async_trait]
impl PatientStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, DbError> {
        Ok(self
            .state
            .read()
            .await
            .patients
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_patient(&self, patient: &NewPatient) -> Result<Patient, DbError> {
        let mut state = self.state.write().await;
        if state.patients.iter().any(|p| p.email.eq_ignore_ascii_case(&patient.email)) {
            return Err(DbError::UniqueViolation(format!(
                "patient with email {} already exists",
                patient.email
            )));
        }

        let created = Patient {
            id: Uuid::new_v4(),
            name: patient.name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
        };
        state.patients.push(created.clone());
        Ok(created)
    }

    async fn update_patient(&self, patient_id: Uuid, update: &PatientUpdate) -> Result<Patient, DbError> {
        let mut state = self.state.write().await;
        let patient = state
            .patients
            .iter_mut()
            .find(|p| p.id == patient_id)
            .ok_or_else(|| DbError::NotFound(format!("patient {}", patient_id)))?;

        patient.name = update.name.clone();
        if update.phone.is_some() {
            patient.phone = update.phone.clone();
        }
        Ok(patient.clone())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn get_specialist(&self, specialist_id: Uuid) -> Result<Option<Specialist>, DbError> {
        Ok(self.state.read().await.specialists.get(&specialist_id).cloned())
    }

    async fn get_service(&self, service_id: Uuid) -> Result<Option<Service>, DbError> {
        Ok(self.state.read().await.services.get(&service_id).cloned())
    }
}
