//! Doctor records. License numbers are unique across doctors.

use tracing::info;

use super::{RecordError, RecordKind, RecordResult, apply, present};
use crate::models::records::{Doctor, DoctorFields};
use crate::store::DoctorStore;
use crate::uuid::new_id;

const REQUIRED: &str =
    "Name, Last Name, Specialty, Phone, Email and License Number are required";

pub async fn list<S: DoctorStore + ?Sized>(store: &S) -> RecordResult<Vec<Doctor>> {
    Ok(store.list_doctors().await?)
}

pub async fn get<S: DoctorStore + ?Sized>(store: &S, id: &str) -> RecordResult<Doctor> {
    store
        .get_doctor(id)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Doctor))
}

pub async fn create<S: DoctorStore + ?Sized>(
    store: &S,
    fields: DoctorFields,
) -> RecordResult<Doctor> {
    let (
        Some(name),
        Some(last_name),
        Some(specialty),
        Some(phone),
        Some(email),
        Some(license_number),
    ) = (
        present(fields.name),
        present(fields.last_name),
        present(fields.specialty),
        present(fields.phone),
        present(fields.email),
        present(fields.license_number),
    )
    else {
        return Err(RecordError::MissingFields(REQUIRED));
    };

    ensure_license_free(store, &license_number, None).await?;

    let doctor = store
        .insert_doctor(Doctor {
            id: new_id(),
            name,
            last_name,
            specialty,
            phone,
            email,
            license_number,
        })
        .await?;
    info!(doctor_id = %doctor.id, "doctor created");
    Ok(doctor)
}

/// Apply supplied fields. Re-submitting the doctor's own license number is
/// not a conflict.
pub async fn update<S: DoctorStore + ?Sized>(
    store: &S,
    id: &str,
    fields: DoctorFields,
) -> RecordResult<Doctor> {
    let mut doctor = get(store, id).await?;

    apply(&mut doctor.name, fields.name, REQUIRED)?;
    apply(&mut doctor.last_name, fields.last_name, REQUIRED)?;
    apply(&mut doctor.specialty, fields.specialty, REQUIRED)?;
    apply(&mut doctor.phone, fields.phone, REQUIRED)?;
    apply(&mut doctor.email, fields.email, REQUIRED)?;
    apply(&mut doctor.license_number, fields.license_number, REQUIRED)?;

    ensure_license_free(store, &doctor.license_number, Some(&doctor.id)).await?;

    let doctor = store
        .update_doctor(doctor)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Doctor))?;
    info!(doctor_id = %doctor.id, "doctor updated");
    Ok(doctor)
}

pub async fn delete<S: DoctorStore + ?Sized>(store: &S, id: &str) -> RecordResult<Doctor> {
    let doctor = store
        .delete_doctor(id)
        .await?
        .ok_or(RecordError::NotFound(RecordKind::Doctor))?;
    info!(doctor_id = %doctor.id, "doctor deleted");
    Ok(doctor)
}

/// Fast-path check; the store's unique index is what actually guarantees it.
async fn ensure_license_free<S: DoctorStore + ?Sized>(
    store: &S,
    license_number: &str,
    owner: Option<&str>,
) -> RecordResult<()> {
    match store.find_doctor_by_license(license_number).await? {
        Some(existing) if Some(existing.id.as_str()) != owner => {
            Err(RecordError::DuplicateLicense)
        }
        _ => Ok(()),
    }
}
