// libs/appointment-cell/src/services/patient.rs
use tracing::debug;

use shared_database::{DbError, PatientStore};
use shared_models::{NewPatient, Patient, PatientUpdate};

use crate::models::{AppointmentError, PatientInfo};

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trims every field and lower-cases the email. Name and email are required.
pub fn normalize_patient(info: &PatientInfo) -> Result<NewPatient, AppointmentError> {
    let name = non_empty(info.name.as_deref())
        .ok_or_else(|| AppointmentError::InvalidRequest("patient_info.name is required".to_string()))?;
    let email = non_empty(info.email.as_deref())
        .map(|email| email.to_lowercase())
        .ok_or_else(|| AppointmentError::InvalidRequest("patient_info.email is required".to_string()))?;

    Ok(NewPatient {
        name,
        email,
        phone: non_empty(info.phone.as_deref()),
    })
}

/// Updates the patient with this email in place, or creates one.
pub async fn resolve_patient<S>(store: &S, patient: &NewPatient) -> Result<Patient, DbError>
where
    S: PatientStore + ?Sized,
{
    match store.find_by_email(&patient.email).await? {
        Some(existing) => {
            debug!("Updating existing patient {}", existing.id);
            let update = PatientUpdate {
                name: patient.name.clone(),
                phone: patient.phone.clone(),
            };
            store.update_patient(existing.id, &update).await
        }
        None => {
            debug!("Registering new patient");
            store.insert_patient(patient).await
        }
    }
}
