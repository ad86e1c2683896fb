//! Request handlers.

pub mod auth;
pub mod doctors;
pub mod medications;
pub mod patients;
pub mod specialties;

use axum::Json;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::AppError;
use crate::models::MessageOnly;

/// JSON body extractor whose rejection answers with [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Fallback for unmatched routes.
pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(MessageOnly {
            message: "Route not found".into(),
        }),
    )
}
