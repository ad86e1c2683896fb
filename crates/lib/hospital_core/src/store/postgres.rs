//! PostgreSQL store.
//!
//! Uniqueness is enforced by the indexes in `migrations/`; a unique
//! violation reported by the driver is turned into [`StoreError::Duplicate`].
//! Ids that do not parse as UUIDs are treated as unknown rather than sent to
//! the database, where the cast would fail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{
    CredentialStore, DoctorStore, MedicationStore, PatientStore, SpecialtyStore, StoreError,
    StoreResult, UniqueKey,
};
use crate::models::auth::{PasswordHash, ProfileChanges, Role, UnknownRole, UserRecord};
use crate::models::records::{Doctor, Medication, Patient, Specialty};
use crate::uuid::parse_id;

const USER_COLUMNS: &str = "id::text AS id, email, password_hash, first_name, last_name, role, \
     is_active, created_at, updated_at";
const DOCTOR_COLUMNS: &str =
    "id::text AS id, name, last_name, specialty, phone, email, license_number";
const SPECIALTY_COLUMNS: &str = "id::text AS id, name";
const MEDICATION_COLUMNS: &str =
    "id::text AS id, name, description, price, quantity, category, laboratory";
const PATIENT_COLUMNS: &str = "id::text AS id, name, last_name, email, gender, illness";

/// Store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a driver error, turning unique violations into `Duplicate(key)`.
fn unique(key: UniqueKey) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| {
        let duplicate = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if duplicate {
            StoreError::Duplicate(key)
        } else {
            StoreError::Database(e)
        }
    }
}

/// Parse an id that must already exist (it was generated by us).
fn record_id(id: &str) -> StoreResult<Uuid> {
    parse_id(id).ok_or_else(|| StoreError::Corrupt(format!("invalid record id '{id}'")))
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e: UnknownRole| StoreError::Corrupt(e.to_string()))?;
        Ok(UserRecord {
            id: row.id,
            email: row.email,
            password_hash: PasswordHash::from_stored(row.password_hash),
            first_name: row.first_name,
            last_name: row.last_name,
            role,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_user(row: Option<UserRow>) -> StoreResult<Option<UserRecord>> {
    row.map(UserRecord::try_from).transpose()
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn insert_user(&self, user: UserRecord) -> StoreResult<UserRecord> {
        sqlx::query(
            "INSERT INTO users \
             (id, email, password_hash, first_name, last_name, role, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record_id(&user.id)?)
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique(UniqueKey::UserEmail))?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        into_user(row)
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        into_user(row)
    }

    async fn update_profile(
        &self,
        id: &str,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<UserRecord>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
               first_name = COALESCE($2, first_name), \
               last_name = COALESCE($3, last_name), \
               updated_at = $4 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;
        into_user(row)
    }

    async fn set_password_hash(
        &self,
        id: &str,
        hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(hash.as_str())
                .bind(updated_at)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_active(
        &self,
        id: &str,
        is_active: bool,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<UserRecord>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET is_active = $2, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;
        into_user(row)
    }
}

#[async_trait]
impl DoctorStore for PgStore {
    async fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        let rows = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_doctor(&self, id: &str) -> StoreResult<Option<Doctor>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_doctor_by_license(&self, license_number: &str) -> StoreResult<Option<Doctor>> {
        let row = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE license_number = $1"
        ))
        .bind(license_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        sqlx::query(
            "INSERT INTO doctors (id, name, last_name, specialty, phone, email, license_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record_id(&doctor.id)?)
        .bind(&doctor.name)
        .bind(&doctor.last_name)
        .bind(&doctor.specialty)
        .bind(&doctor.phone)
        .bind(&doctor.email)
        .bind(&doctor.license_number)
        .execute(&self.pool)
        .await
        .map_err(unique(UniqueKey::DoctorLicense))?;
        Ok(doctor)
    }

    async fn update_doctor(&self, doctor: Doctor) -> StoreResult<Option<Doctor>> {
        let Some(id) = parse_id(&doctor.id) else {
            return Ok(None);
        };
        let result = sqlx::query(
            "UPDATE doctors SET name = $2, last_name = $3, specialty = $4, phone = $5, \
             email = $6, license_number = $7 WHERE id = $1",
        )
        .bind(id)
        .bind(&doctor.name)
        .bind(&doctor.last_name)
        .bind(&doctor.specialty)
        .bind(&doctor.phone)
        .bind(&doctor.email)
        .bind(&doctor.license_number)
        .execute(&self.pool)
        .await
        .map_err(unique(UniqueKey::DoctorLicense))?;
        Ok((result.rows_affected() == 1).then_some(doctor))
    }

    async fn delete_doctor(&self, id: &str) -> StoreResult<Option<Doctor>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, Doctor>(&format!(
            "DELETE FROM doctors WHERE id = $1 RETURNING {DOCTOR_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl SpecialtyStore for PgStore {
    async fn list_specialties(&self) -> StoreResult<Vec<Specialty>> {
        let rows = sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialties ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_specialty(&self, id: &str) -> StoreResult<Option<Specialty>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialties WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_specialty_by_name(&self, name: &str) -> StoreResult<Option<Specialty>> {
        let row = sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialties WHERE lower(name) = lower($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_specialty(&self, specialty: Specialty) -> StoreResult<Specialty> {
        sqlx::query("INSERT INTO specialties (id, name) VALUES ($1, $2)")
            .bind(record_id(&specialty.id)?)
            .bind(&specialty.name)
            .execute(&self.pool)
            .await
            .map_err(unique(UniqueKey::SpecialtyName))?;
        Ok(specialty)
    }

    async fn update_specialty(&self, specialty: Specialty) -> StoreResult<Option<Specialty>> {
        let Some(id) = parse_id(&specialty.id) else {
            return Ok(None);
        };
        let result = sqlx::query("UPDATE specialties SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(&specialty.name)
            .execute(&self.pool)
            .await
            .map_err(unique(UniqueKey::SpecialtyName))?;
        Ok((result.rows_affected() == 1).then_some(specialty))
    }

    async fn delete_specialty(&self, id: &str) -> StoreResult<Option<Specialty>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, Specialty>(&format!(
            "DELETE FROM specialties WHERE id = $1 RETURNING {SPECIALTY_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl MedicationStore for PgStore {
    async fn list_medications(&self) -> StoreResult<Vec<Medication>> {
        let rows = sqlx::query_as::<_, Medication>(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_medication(&self, id: &str) -> StoreResult<Option<Medication>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, Medication>(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_medication(&self, medication: Medication) -> StoreResult<Medication> {
        sqlx::query(
            "INSERT INTO medications (id, name, description, price, quantity, category, laboratory) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record_id(&medication.id)?)
        .bind(&medication.name)
        .bind(&medication.description)
        .bind(medication.price)
        .bind(medication.quantity)
        .bind(&medication.category)
        .bind(&medication.laboratory)
        .execute(&self.pool)
        .await?;
        Ok(medication)
    }

    async fn update_medication(&self, medication: Medication) -> StoreResult<Option<Medication>> {
        let Some(id) = parse_id(&medication.id) else {
            return Ok(None);
        };
        let result = sqlx::query(
            "UPDATE medications SET name = $2, description = $3, price = $4, quantity = $5, \
             category = $6, laboratory = $7 WHERE id = $1",
        )
        .bind(id)
        .bind(&medication.name)
        .bind(&medication.description)
        .bind(medication.price)
        .bind(medication.quantity)
        .bind(&medication.category)
        .bind(&medication.laboratory)
        .execute(&self.pool)
        .await?;
        Ok((result.rows_affected() == 1).then_some(medication))
    }

    async fn delete_medication(&self, id: &str) -> StoreResult<Option<Medication>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, Medication>(&format!(
            "DELETE FROM medications WHERE id = $1 RETURNING {MEDICATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl PatientStore for PgStore {
    async fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        let rows = sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_patient(&self, patient: Patient) -> StoreResult<Patient> {
        sqlx::query(
            "INSERT INTO patients (id, name, last_name, email, gender, illness) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record_id(&patient.id)?)
        .bind(&patient.name)
        .bind(&patient.last_name)
        .bind(&patient.email)
        .bind(&patient.gender)
        .bind(&patient.illness)
        .execute(&self.pool)
        .await?;
        Ok(patient)
    }

    async fn update_patient(&self, patient: Patient) -> StoreResult<Option<Patient>> {
        let Some(id) = parse_id(&patient.id) else {
            return Ok(None);
        };
        let result = sqlx::query(
            "UPDATE patients SET name = $2, last_name = $3, email = $4, gender = $5, \
             illness = $6 WHERE id = $1",
        )
        .bind(id)
        .bind(&patient.name)
        .bind(&patient.last_name)
        .bind(&patient.email)
        .bind(&patient.gender)
        .bind(&patient.illness)
        .execute(&self.pool)
        .await?;
        Ok((result.rows_affected() == 1).then_some(patient))
    }

    async fn delete_patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, Patient>(&format!(
            "DELETE FROM patients WHERE id = $1 RETURNING {PATIENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
