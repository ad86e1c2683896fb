//! Application error types.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hospital_core::auth::AuthError;
use hospital_core::records::RecordError;
use thiserror::Error;
use tracing::error;

use crate::models::{AuthErrorResponse, MessageOnly};

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
///
/// Auth failures answer `{success: false, message, error}`; record failures
/// answer `{message}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(e) => auth_status(e),
            AppError::Record(e) => record_status(e),
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn auth_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::MissingFields(_)
        | AuthError::MissingCredentials
        | AuthError::InvalidEmail
        | AuthError::WeakPassword
        | AuthError::InvalidRole(_) => StatusCode::BAD_REQUEST,
        AuthError::DuplicateEmail => StatusCode::CONFLICT,
        AuthError::InvalidCredentials
        | AuthError::InvalidCurrentPassword
        | AuthError::MissingToken
        | AuthError::InvalidToken
        | AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
        AuthError::AccountDisabled | AuthError::Forbidden => StatusCode::FORBIDDEN,
        AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Stable machine-readable code for auth failures.
fn auth_code(e: &AuthError) -> &'static str {
    match e {
        AuthError::MissingFields(_) => "missing_fields",
        AuthError::MissingCredentials => "missing_credentials",
        AuthError::InvalidEmail => "invalid_email",
        AuthError::WeakPassword => "weak_password",
        AuthError::InvalidRole(_) => "invalid_role",
        AuthError::DuplicateEmail => "duplicate_email",
        AuthError::InvalidCredentials => "invalid_credentials",
        AuthError::AccountDisabled => "account_disabled",
        AuthError::UserNotFound => "user_not_found",
        AuthError::InvalidCurrentPassword => "invalid_current_password",
        AuthError::MissingToken => "missing_token",
        AuthError::InvalidToken => "invalid_token",
        AuthError::ExpiredToken => "expired_token",
        AuthError::Forbidden => "forbidden",
        AuthError::Internal(_) => "internal_error",
    }
}

fn record_status(e: &RecordError) -> StatusCode {
    match e {
        RecordError::MissingFields(_) | RecordError::InvalidField(_) => StatusCode::BAD_REQUEST,
        RecordError::DuplicateLicense | RecordError::DuplicateSpecialty => StatusCode::CONFLICT,
        RecordError::NotFound(_) => StatusCode::NOT_FOUND,
        RecordError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Auth(e) => {
                let message = match &e {
                    AuthError::Internal(cause) => {
                        error!(%cause, "auth request failed");
                        "Internal server error".to_string()
                    }
                    other => other.to_string(),
                };
                let body = AuthErrorResponse {
                    success: false,
                    message,
                    error: auth_code(&e).to_string(),
                };
                (status, Json(body)).into_response()
            }
            AppError::Record(e) => {
                let message = match &e {
                    RecordError::Internal(cause) => {
                        error!(%cause, "record request failed");
                        "Internal server error".to_string()
                    }
                    other => other.to_string(),
                };
                (status, Json(MessageOnly { message })).into_response()
            }
            AppError::InvalidBody(detail) => {
                let body = AuthErrorResponse {
                    success: false,
                    message: detail,
                    error: "invalid_body".to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hospital_core::records::RecordKind;

    #[test]
    fn auth_errors_map_to_statuses() {
        let cases = [
            (AuthError::WeakPassword, StatusCode::BAD_REQUEST),
            (AuthError::DuplicateEmail, StatusCode::CONFLICT),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::ExpiredToken, StatusCode::UNAUTHORIZED),
            (AuthError::AccountDisabled, StatusCode::FORBIDDEN),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn record_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(RecordError::MissingFields("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(RecordError::DuplicateSpecialty).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(RecordError::NotFound(RecordKind::Patient)).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn expired_and_invalid_tokens_have_distinct_codes() {
        assert_eq!(auth_code(&AuthError::ExpiredToken), "expired_token");
        assert_eq!(auth_code(&AuthError::InvalidToken), "invalid_token");
    }
}
