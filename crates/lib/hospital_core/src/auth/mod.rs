//! Authentication and authorization logic.
//!
//! Password hashing, JWT issuance/verification, and the service that
//! composes them over a [`CredentialStore`](crate::store::CredentialStore).

pub mod jwt;
pub mod password;
pub mod service;

use thiserror::Error;

use crate::store::{StoreError, UniqueKey};

pub use jwt::TokenIssuer;
pub use service::AuthService;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Required input absent or blank; the message names the fields.
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Please provide email and password")]
    MissingCredentials,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("Unknown role '{0}'")]
    InvalidRole(String),

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account has been disabled")]
    AccountDisabled,

    #[error("User not found")]
    UserNotFound,

    #[error("Current password is incorrect")]
    InvalidCurrentPassword,

    #[error("Token not provided or malformed authorization header")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("You do not have permission to access this resource")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(UniqueKey::UserEmail) => AuthError::DuplicateEmail,
            other => AuthError::Internal(other.to_string()),
        }
    }
}
