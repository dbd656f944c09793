// libs/shared/database/src/fixtures.rs
//
// Builders shared by the cell test suites.

use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::{
    Appointment, AppointmentStatus, Closure, Patient, Service, Specialist, WorkSchedule,
};

use crate::memory::InMemoryStore;

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid fixture time")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

pub fn specialist(name: &str) -> Specialist {
    Specialist {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: None,
        is_active: true,
    }
}

pub fn service(name: &str, duration: u32) -> Service {
    Service {
        id: Uuid::new_v4(),
        name: name.to_string(),
        duration,
        is_active: true,
    }
}

pub fn patient(name: &str, email: &str) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
    }
}

/// `09:00-18:00` with a `13:00-14:00` lunch break, all services allowed.
pub fn standard_schedule(specialist_id: Uuid, day_of_week: u8) -> WorkSchedule {
    WorkSchedule {
        id: None,
        specialist_id,
        day_of_week,
        start_time: time(9, 0),
        end_time: time(18, 0),
        lunch_start: Some(time(13, 0)),
        lunch_end: Some(time(14, 0)),
        allowed_services: None,
        is_active: true,
    }
}

pub fn closure(specialist_id: Uuid, start: NaiveDate, end: NaiveDate, reason: &str) -> Closure {
    Closure {
        id: Uuid::new_v4(),
        specialist_id,
        start_date: start,
        end_date: end,
        reason: Some(reason.to_string()),
        is_active: true,
    }
}

pub fn appointment(
    specialist_id: Uuid,
    service_id: Uuid,
    patient_id: Uuid,
    on: NaiveDate,
    at: NaiveTime,
    duration: u32,
) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        specialist_id,
        service_id,
        patient_id,
        appointment_date: on,
        appointment_time: at,
        duration,
        status: AppointmentStatus::Scheduled,
        notes: None,
    }
}

/// A store holding one active specialist, one 45-minute service and the
/// standard schedule on `day_of_week`.
pub async fn seeded_store(day_of_week: u8) -> (InMemoryStore, Specialist, Service) {
    let store = InMemoryStore::new();
    let specialist = specialist("Dra. Valentina Ruiz");
    let service = service("Limpieza facial", 45);

    store.add_specialist(specialist.clone()).await;
    store.add_service(service.clone()).await;
    crate::store::ScheduleStore::upsert_schedule(&store, &standard_schedule(specialist.id, day_of_week))
        .await
        .expect("in-memory upsert cannot fail");

    (store, specialist, service)
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn work_schedule_row(specialist_id: Uuid, day_of_week: u8) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "specialist_id": specialist_id,
            "day_of_week": day_of_week,
            "start_time": "09:00:00",
            "end_time": "18:00:00",
            "lunch_start": "13:00:00",
            "lunch_end": "14:00:00",
            "allowed_services": null,
            "is_active": true
        })
    }

    pub fn unique_violation() -> Value {
        json!({
            "code": "23505",
            "details": "Key (specialist_id, appointment_date, appointment_time) already exists.",
            "hint": null,
            "message": "duplicate key value violates unique constraint \"appointments_unique_slot\""
        })
    }
}
