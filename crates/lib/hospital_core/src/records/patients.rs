//! Patient records.

use tracing::info;

use super::{RecordError, RecordKind, RecordResult, apply, present};
use crate::models::records::{Patient, PatientFields};
use crate::store::PatientStore;
use crate::uuid::new_id;

const REQUIRED: &str = "Name, Last Name, Email, Gender and Illness are required";

pub async fn list<S: PatientStore + ?Sized>(store: &S) -> RecordResult<Vec<Patient>> {
    Ok(store.list_patients().await?)
}

pub async fn get<S: PatientStore + ?Sized>(store: &S, id: &str) -> RecordResult<Patient> {
    store
        .get_patient(id)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Patient))
}

pub async fn create<S: PatientStore + ?Sized>(
    store: &S,
    fields: PatientFields,
) -> RecordResult<Patient> {
    let (Some(name), Some(last_name), Some(email), Some(gender), Some(illness)) = (
        present(fields.name),
        present(fields.last_name),
        present(fields.email),
        present(fields.gender),
        present(fields.illness),
    ) else {
        return Err(RecordError::MissingFields(REQUIRED));
    };

    let patient = store
        .insert_patient(Patient {
            id: new_id(),
            name,
            last_name,
            email,
            gender,
            illness,
        })
        .await?;
    info!(patient_id = %patient.id, "patient created");
    Ok(patient)
}

pub async fn update<S: PatientStore + ?Sized>(
    store: &S,
    id: &str,
    fields: PatientFields,
) -> RecordResult<Patient> {
    let mut patient = get(store, id).await?;

    apply(&mut patient.name, fields.name, REQUIRED)?;
    apply(&mut patient.last_name, fields.last_name, REQUIRED)?;
    apply(&mut patient.email, fields.email, REQUIRED)?;
    apply(&mut patient.gender, fields.gender, REQUIRED)?;
    apply(&mut patient.illness, fields.illness, REQUIRED)?;

    let patient = store
        .update_patient(patient)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Patient))?;
    info!(patient_id = %patient.id, "patient updated");
    Ok(patient)
}

pub async fn delete<S: PatientStore + ?Sized>(store: &S, id: &str) -> RecordResult<Patient> {
    let patient = store
        .delete_patient(id)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Patient))?;
    info!(patient_id = %patient.id, "patient deleted");
    Ok(patient)
}
