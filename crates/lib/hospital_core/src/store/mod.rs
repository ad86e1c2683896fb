//! Storage seams.
//!
//! Services talk to storage only through the traits below. Two backends
//! implement all of them: [`postgres::PgStore`] for deployments and
//! [`memory::MemoryStore`] for development and tests. Both enforce the
//! uniqueness keys themselves (unique indexes / a single write lock), so a
//! racing duplicate insert surfaces as [`StoreError::Duplicate`] even when the
//! service-level pre-check passed.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::auth::{PasswordHash, ProfileChanges, UserRecord};
use crate::models::records::{Doctor, Medication, Patient, Specialty};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Uniqueness keys enforced by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    UserEmail,
    DoctorLicense,
    SpecialtyName,
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UniqueKey::UserEmail => "user email",
            UniqueKey::DoctorLicense => "doctor license number",
            UniqueKey::SpecialtyName => "specialty name",
        })
    }
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate {0}")]
    Duplicate(UniqueKey),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persisted user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new user. Fails with `Duplicate(UserEmail)` if the email is taken.
    async fn insert_user(&self, user: UserRecord) -> StoreResult<UserRecord>;

    /// Look up a user by email, compared case-insensitively.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>>;

    /// Apply name changes and set `updated_at`. `None` if the id is unknown.
    async fn update_profile(
        &self,
        id: &str,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<UserRecord>>;

    /// Replace the stored hash. Returns `false` if the id is unknown.
    async fn set_password_hash(
        &self,
        id: &str,
        hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    async fn set_active(
        &self,
        id: &str,
        is_active: bool,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<UserRecord>>;
}

#[async_trait]
pub trait DoctorStore: Send + Sync {
    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>>;
    async fn get_doctor(&self, id: &str) -> StoreResult<Option<Doctor>>;
    async fn find_doctor_by_license(&self, license_number: &str) -> StoreResult<Option<Doctor>>;
    async fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor>;
    /// Overwrite every field of an existing doctor. `None` if the id is unknown.
    async fn update_doctor(&self, doctor: Doctor) -> StoreResult<Option<Doctor>>;
    async fn delete_doctor(&self, id: &str) -> StoreResult<Option<Doctor>>;
}

#[async_trait]
pub trait SpecialtyStore: Send + Sync {
    async fn list_specialties(&self) -> StoreResult<Vec<Specialty>>;
    async fn get_specialty(&self, id: &str) -> StoreResult<Option<Specialty>>;
    /// Look up a specialty by name, compared case-insensitively.
    async fn find_specialty_by_name(&self, name: &str) -> StoreResult<Option<Specialty>>;
    async fn insert_specialty(&self, specialty: Specialty) -> StoreResult<Specialty>;
    async fn update_specialty(&self, specialty: Specialty) -> StoreResult<Option<Specialty>>;
    async fn delete_specialty(&self, id: &str) -> StoreResult<Option<Specialty>>;
}

#[async_trait]
pub trait MedicationStore: Send + Sync {
    async fn list_medications(&self) -> StoreResult<Vec<Medication>>;
    async fn get_medication(&self, id: &str) -> StoreResult<Option<Medication>>;
    async fn insert_medication(&self, medication: Medication) -> StoreResult<Medication>;
    async fn update_medication(&self, medication: Medication) -> StoreResult<Option<Medication>>;
    async fn delete_medication(&self, id: &str) -> StoreResult<Option<Medication>>;
}

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn list_patients(&self) -> StoreResult<Vec<Patient>>;
    async fn get_patient(&self, id: &str) -> StoreResult<Option<Patient>>;
    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient>;
    async fn update_patient(&self, patient: Patient) -> StoreResult<Option<Patient>>;
    async fn delete_patient(&self, id: &str) -> StoreResult<Option<Patient>>;
}

/// Everything the API needs from a single backend.
pub trait Store:
    CredentialStore + DoctorStore + SpecialtyStore + MedicationStore + PatientStore
{
}

impl<T> Store for T where
    T: CredentialStore + DoctorStore + SpecialtyStore + MedicationStore + PatientStore
{
}
