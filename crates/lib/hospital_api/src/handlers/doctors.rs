//! Doctor routes under `/api/doctores`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use hospital_core::models::records::{Doctor, DoctorFields};
use hospital_core::records::doctors;

use super::JsonBody;
use crate::AppState;
use crate::error::AppResult;
use crate::models::DeletedResponse;

pub async fn list_doctors(State(state): State<AppState>) -> AppResult<Json<Vec<Doctor>>> {
    Ok(Json(doctors::list(&*state.store).await?))
}

pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Doctor>> {
    Ok(Json(doctors::get(&*state.store, &id).await?))
}

pub async fn create_doctor(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<DoctorFields>,
) -> AppResult<(StatusCode, Json<Doctor>)> {
    let created = doctors::create(&*state.store, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<DoctorFields>,
) -> AppResult<Json<Doctor>> {
    Ok(Json(doctors::update(&*state.store, &id, body).await?))
}

pub async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedResponse<Doctor>>> {
    let deleted = doctors::delete(&*state.store, &id).await?;
    Ok(Json(DeletedResponse {
        message: "Doctor deleted successfully".into(),
        deleted,
    }))
}
