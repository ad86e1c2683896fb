//! In-memory store for development and tests.
//!
//! All tables sit behind one `RwLock`, so a uniqueness check and the insert
//! that follows it happen under the same write guard. Tables are keyed by
//! UUIDv7 id, which makes iteration order creation order.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{
    CredentialStore, DoctorStore, MedicationStore, PatientStore, SpecialtyStore, StoreError,
    StoreResult, UniqueKey,
};
use crate::models::auth::{PasswordHash, ProfileChanges, UserRecord};
use crate::models::records::{Doctor, Medication, Patient, Specialty};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<String, UserRecord>,
    doctors: BTreeMap<String, Doctor>,
    specialties: BTreeMap<String, Specialty>,
    medications: BTreeMap<String, Medication>,
    patients: BTreeMap<String, Patient>,
}

impl Tables {
    fn email_taken(&self, email: &str, except_id: Option<&str>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id.as_str()) != except_id && u.email.eq_ignore_ascii_case(email))
    }

    fn license_taken(&self, license: &str, except_id: Option<&str>) -> bool {
        self.doctors
            .values()
            .any(|d| Some(d.id.as_str()) != except_id && d.license_number == license)
    }

    fn specialty_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        self.specialties
            .values()
            .any(|s| Some(s.id.as_str()) != except_id && same_name(&s.name, name))
    }
}

/// Case-insensitive comparison matching PostgreSQL's `lower(a) = lower(b)`.
fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Process-local store. Cheap to create; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, user: UserRecord) -> StoreResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(StoreError::Duplicate(UniqueKey::UserEmail));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn update_profile(
        &self,
        id: &str,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<UserRecord>> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(id) else {
            return Ok(None);
        };
        if let Some(first_name) = &changes.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = last_name.clone();
        }
        user.updated_at = updated_at;
        Ok(Some(user.clone()))
    }

    async fn set_password_hash(
        &self,
        id: &str,
        hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(id) {
            Some(user) => {
                user.password_hash = hash.clone();
                user.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_active(
        &self,
        id: &str,
        is_active: bool,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<UserRecord>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(id).map(|user| {
            user.is_active = is_active;
            user.updated_at = updated_at;
            user.clone()
        }))
    }
}

#[async_trait]
impl DoctorStore for MemoryStore {
    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        Ok(self.tables.read().await.doctors.values().cloned().collect())
    }

    async fn get_doctor(&self, id: &str) -> StoreResult<Option<Doctor>> {
        Ok(self.tables.read().await.doctors.get(id).cloned())
    }

    async fn find_doctor_by_license(&self, license_number: &str) -> StoreResult<Option<Doctor>> {
        let tables = self.tables.read().await;
        Ok(tables
            .doctors
            .values()
            .find(|d| d.license_number == license_number)
            .cloned())
    }

    async fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        let mut tables = self.tables.write().await;
        if tables.license_taken(&doctor.license_number, None) {
            return Err(StoreError::Duplicate(UniqueKey::DoctorLicense));
        }
        tables.doctors.insert(doctor.id.clone(), doctor.clone());
        Ok(doctor)
    }

    async fn update_doctor(&self, doctor: Doctor) -> StoreResult<Option<Doctor>> {
        let mut tables = self.tables.write().await;
        if !tables.doctors.contains_key(&doctor.id) {
            return Ok(None);
        }
        if tables.license_taken(&doctor.license_number, Some(&doctor.id)) {
            return Err(StoreError::Duplicate(UniqueKey::DoctorLicense));
        }
        tables.doctors.insert(doctor.id.clone(), doctor.clone());
        Ok(Some(doctor))
    }

    async fn delete_doctor(&self, id: &str) -> StoreResult<Option<Doctor>> {
        Ok(self.tables.write().await.doctors.remove(id))
    }
}

#[async_trait]
impl SpecialtyStore for MemoryStore {
    async fn list_specialties(&self) -> StoreResult<Vec<Specialty>> {
        Ok(self.tables.read().await.specialties.values().cloned().collect())
    }

    async fn get_specialty(&self, id: &str) -> StoreResult<Option<Specialty>> {
        Ok(self.tables.read().await.specialties.get(id).cloned())
    }

    async fn find_specialty_by_name(&self, name: &str) -> StoreResult<Option<Specialty>> {
        let tables = self.tables.read().await;
        Ok(tables
            .specialties
            .values()
            .find(|s| same_name(&s.name, name))
            .cloned())
    }

    async fn insert_specialty(&self, specialty: Specialty) -> StoreResult<Specialty> {
        let mut tables = self.tables.write().await;
        if tables.specialty_taken(&specialty.name, None) {
            return Err(StoreError::Duplicate(UniqueKey::SpecialtyName));
        }
        tables
            .specialties
            .insert(specialty.id.clone(), specialty.clone());
        Ok(specialty)
    }

    async fn update_specialty(&self, specialty: Specialty) -> StoreResult<Option<Specialty>> {
        let mut tables = self.tables.write().await;
        if !tables.specialties.contains_key(&specialty.id) {
            return Ok(None);
        }
        if tables.specialty_taken(&specialty.name, Some(&specialty.id)) {
            return Err(StoreError::Duplicate(UniqueKey::SpecialtyName));
        }
        tables
            .specialties
            .insert(specialty.id.clone(), specialty.clone());
        Ok(Some(specialty))
    }

    async fn delete_specialty(&self, id: &str) -> StoreResult<Option<Specialty>> {
        Ok(self.tables.write().await.specialties.remove(id))
    }
}

#[async_trait]
impl MedicationStore for MemoryStore {
    async fn list_medications(&self) -> StoreResult<Vec<Medication>> {
        Ok(self.tables.read().await.medications.values().cloned().collect())
    }

    async fn get_medication(&self, id: &str) -> StoreResult<Option<Medication>> {
        Ok(self.tables.read().await.medications.get(id).cloned())
    }

    async fn insert_medication(&self, medication: Medication) -> StoreResult<Medication> {
        let mut tables = self.tables.write().await;
        tables
            .medications
            .insert(medication.id.clone(), medication.clone());
        Ok(medication)
    }

    async fn update_medication(&self, medication: Medication) -> StoreResult<Option<Medication>> {
        let mut tables = self.tables.write().await;
        match tables.medications.get_mut(&medication.id) {
            Some(slot) => {
                *slot = medication.clone();
                Ok(Some(medication))
            }
            None => Ok(None),
        }
    }

    async fn delete_medication(&self, id: &str) -> StoreResult<Option<Medication>> {
        Ok(self.tables.write().await.medications.remove(id))
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.tables.read().await.patients.values().cloned().collect())
    }

    async fn get_patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(id).cloned())
    }

    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient> {
        let mut tables = self.tables.write().await;
        tables.patients.insert(patient.id.clone(), patient.clone());
        Ok(patient)
    }

    async fn update_patient(&self, patient: Patient) -> StoreResult<Option<Patient>> {
        let mut tables = self.tables.write().await;
        match tables.patients.get_mut(&patient.id) {
            Some(slot) => {
                *slot = patient.clone();
                Ok(Some(patient))
            }
            None => Ok(None),
        }
    }

    async fn delete_patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        Ok(self.tables.write().await.patients.remove(id))
    }
}
