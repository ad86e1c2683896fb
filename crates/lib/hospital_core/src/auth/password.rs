//! Password hashing via bcrypt.
//!
//! Both operations run on tokio's blocking pool, never on the request
//! executor.

use std::sync::LazyLock;

use tokio::task;

use super::AuthError;
use crate::models::auth::PasswordHash;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash compared against when a login names an unknown email, so that path
/// spends the same bcrypt time as a wrong password.
static DUMMY_HASH: LazyLock<Option<PasswordHash>> = LazyLock::new(|| {
    bcrypt::hash("not-a-real-password", BCRYPT_COST)
        .ok()
        .map(PasswordHash::from_stored)
});

/// Hash a password with bcrypt (cost 10).
pub async fn hash_password(password: &str) -> Result<PasswordHash, AuthError> {
    let password = password.to_owned();
    let hash = task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AuthError::Internal(format!("bcrypt task: {e}")))?
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))?;
    Ok(PasswordHash::from_stored(hash))
}

/// Verify a password against a bcrypt hash.
///
/// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
pub async fn verify_password(password: &str, hash: &PasswordHash) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let hash = hash.as_str().to_owned();
    task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("bcrypt task: {e}")))?
        .map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Burn one verification against [`DUMMY_HASH`]. The result is discarded.
pub async fn verify_against_dummy(password: &str) {
    let password = password.to_owned();
    let _ = task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_ref() {
            let _ = bcrypt::verify(password, hash.as_str());
        }
    })
    .await;
}
