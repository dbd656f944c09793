// libs/shared/database/src/supabase_store.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{
    Appointment, AppointmentDetails, AppointmentStatus, Closure, NewAppointment, NewPatient,
    OccupiedInterval, Patient, PatientUpdate, Service, Specialist, WorkSchedule,
};
use shared_utils::time::{hhmm, weekday_of};

use crate::error::DbError;
use crate::store::{AppointmentStore, CatalogStore, ClosureStore, PatientStore, ScheduleStore};
use crate::supabase::SupabaseClient;

const SERVICES_TABLE: &str = "aesthetic_services";

/// PostgREST-backed implementation of the scheduling store traits.
pub struct SupabaseStore {
    supabase: Arc<SupabaseClient>,
    default_duration: u32,
}

#[derive(Debug, Deserialize)]
struct OccupiedRow {
    #[serde(with = "hhmm")]
    appointment_time: NaiveTime,
    #[serde(default)]
    duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FutureAppointmentRow {
    id: Uuid,
    specialist_id: Uuid,
    service_id: Uuid,
    appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    appointment_time: NaiveTime,
    #[serde(default)]
    duration: Option<u32>,
    status: AppointmentStatus,
    #[serde(default)]
    patient: Option<NamedRef>,
    #[serde(default)]
    service: Option<NamedRef>,
}

fn representation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

/// Escapes `LIKE` metacharacters so `ilike` matches the value literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn first_row<T>(rows: Vec<T>, what: &str) -> Result<T, DbError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| DbError::NotFound(format!("{} returned no rows", what)))
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(
            Arc::new(SupabaseClient::new(config)),
            config.default_service_duration_minutes,
        )
    }

    pub fn with_client(supabase: Arc<SupabaseClient>, default_duration: u32) -> Self {
        Self { supabase, default_duration }
    }
}

#[async_trait]
impl ScheduleStore for SupabaseStore {
    async fn get_schedule(
        &self,
        specialist_id: Uuid,
        day_of_week: u8,
    ) -> Result<Option<WorkSchedule>, DbError> {
        let path = format!(
            "/rest/v1/work_schedules?specialist_id=eq.{}&day_of_week=eq.{}&limit=1",
            specialist_id, day_of_week
        );
        let rows: Vec<WorkSchedule> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_schedule(&self, schedule: &WorkSchedule) -> Result<WorkSchedule, DbError> {
        debug!(
            "Upserting schedule for specialist {} on day {}",
            schedule.specialist_id, schedule.day_of_week
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        let mut body = serde_json::to_value(schedule)?;
        body["updated_at"] = json!(chrono::Utc::now().to_rfc3339());

        let rows: Vec<WorkSchedule> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/work_schedules?on_conflict=specialist_id,day_of_week",
                Some(body),
                Some(headers),
            )
            .await?;
        first_row(rows, "schedule upsert")
    }
}

#[async_trait]
impl ClosureStore for SupabaseStore {
    async fn get_active_closures(
        &self,
        specialist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Closure>, DbError> {
        let path = format!(
            "/rest/v1/closures?specialist_id=eq.{}&is_active=eq.true&start_date=lte.{}&end_date=gte.{}&order=start_date.asc",
            specialist_id, date, date
        );
        self.supabase.request(Method::GET, &path, None).await
    }
}

#[async_trait]
impl AppointmentStore for SupabaseStore {
    async fn get_occupied_intervals(
        &self,
        specialist_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<OccupiedInterval>, DbError> {
        let path = format!(
            "/rest/v1/appointments?select=appointment_time,duration&specialist_id=eq.{}&appointment_date=eq.{}&status=neq.cancelled&order=appointment_time.asc",
            specialist_id, date
        );
        let rows: Vec<OccupiedRow> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows
            .into_iter()
            .map(|row| OccupiedInterval {
                time: row.appointment_time,
                duration: row.duration.unwrap_or(self.default_duration),
            })
            .collect())
    }

    async fn insert_appointment(&self, appointment: &NewAppointment) -> Result<Appointment, DbError> {
        let mut body = serde_json::to_value(appointment)?;
        let now = chrono::Utc::now().to_rfc3339();
        body["created_at"] = json!(now);
        body["updated_at"] = json!(now);

        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(body),
                Some(representation_headers()),
            )
            .await?;
        first_row(rows, "appointment insert")
    }

    async fn get_future_appointments(
        &self,
        specialist_id: Uuid,
        day_of_week: u8,
        from: NaiveDate,
    ) -> Result<Vec<AppointmentDetails>, DbError> {
        let path = format!(
            "/rest/v1/appointments?select=id,specialist_id,service_id,appointment_date,appointment_time,duration,status,patient:patients(name,email),service:{}(name)&specialist_id=eq.{}&appointment_date=gte.{}&status=neq.cancelled&order=appointment_date.asc,appointment_time.asc",
            SERVICES_TABLE, specialist_id, from
        );
        let rows: Vec<FutureAppointmentRow> = self.supabase.request(Method::GET, &path, None).await?;

        // PostgREST cannot filter on the weekday of a date column.
        Ok(rows
            .into_iter()
            .filter(|row| weekday_of(row.appointment_date) == day_of_week)
            .map(|row| {
                let (patient_name, patient_email) = match row.patient {
                    Some(NamedRef { name, email }) => (name.unwrap_or_default(), email.unwrap_or_default()),
                    None => (String::new(), String::new()),
                };
                AppointmentDetails {
                    id: row.id,
                    specialist_id: row.specialist_id,
                    service_id: row.service_id,
                    service_name: row.service.and_then(|s| s.name).unwrap_or_default(),
                    patient_name,
                    patient_email,
                    appointment_date: row.appointment_date,
                    appointment_time: row.appointment_time,
                    duration: row.duration.unwrap_or(self.default_duration),
                    status: row.status,
                }
            })
            .collect())
    }
}

#[async_trait]
impl PatientStore for SupabaseStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, DbError> {
        let path = format!(
            "/rest/v1/patients?select=id,name,email,phone&email=ilike.{}&limit=1",
            urlencoding::encode(&escape_like(email))
        );
        let rows: Vec<Patient> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_patient(&self, patient: &NewPatient) -> Result<Patient, DbError> {
        let now = chrono::Utc::now().to_rfc3339();
        let body = json!({
            "name": patient.name,
            "email": patient.email,
            "phone": patient.phone,
            "created_at": now,
            "updated_at": now,
        });
        let rows: Vec<Patient> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/patients",
                Some(body),
                Some(representation_headers()),
            )
            .await?;
        first_row(rows, "patient insert")
    }

    async fn update_patient(&self, patient_id: Uuid, update: &PatientUpdate) -> Result<Patient, DbError> {
        let mut body = json!({
            "name": update.name,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(phone) = &update.phone {
            body["phone"] = Value::String(phone.clone());
        }

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let rows: Vec<Patient> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(body), Some(representation_headers()))
            .await?;
        first_row(rows, "patient update")
    }
}

#[async_trait]
impl CatalogStore for SupabaseStore {
    async fn get_specialist(&self, specialist_id: Uuid) -> Result<Option<Specialist>, DbError> {
        let path = format!(
            "/rest/v1/specialists?select=id,name,email,is_active&id=eq.{}&limit=1",
            specialist_id
        );
        let rows: Vec<Specialist> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn get_service(&self, service_id: Uuid) -> Result<Option<Service>, DbError> {
        let path = format!(
            "/rest/v1/{}?select=id,name,duration,is_active&id=eq.{}&limit=1",
            SERVICES_TABLE, service_id
        );
        let rows: Vec<Service> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }
}
