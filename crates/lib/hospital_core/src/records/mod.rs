//! Record services: validation and uniqueness rules for doctors,
//! specialties, medications and patients.
//!
//! Create requires every field; update applies only the fields that were
//! supplied. A supplied blank string is rejected rather than treated as
//! "clear this field".

pub mod doctors;
pub mod medications;
pub mod patients;
pub mod specialties;

use std::fmt;

use thiserror::Error;

use crate::store::{StoreError, UniqueKey};

/// Record type, used to word not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Doctor,
    Specialty,
    Medication,
    Patient,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Doctor => "Doctor",
            RecordKind::Specialty => "Specialty",
            RecordKind::Medication => "Medication",
            RecordKind::Patient => "Patient",
        })
    }
}

/// Record service errors.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("{0}")]
    InvalidField(&'static str),

    #[error("A doctor with this license number already exists")]
    DuplicateLicense,

    #[error("Specialty already exists")]
    DuplicateSpecialty,

    #[error("{0} not found")]
    NotFound(RecordKind),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for RecordError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(UniqueKey::DoctorLicense) => RecordError::DuplicateLicense,
            StoreError::Duplicate(UniqueKey::SpecialtyName) => RecordError::DuplicateSpecialty,
            other => RecordError::Internal(other.to_string()),
        }
    }
}

/// Result type for record operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;

/// Trimmed value if present and non-blank.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Overwrite `slot` with a supplied value; a supplied blank is an error.
fn apply(
    slot: &mut String,
    value: Option<String>,
    missing: &'static str,
) -> RecordResult<()> {
    if let Some(value) = value {
        *slot = present(Some(value)).ok_or(RecordError::MissingFields(missing))?;
    }
    Ok(())
}
