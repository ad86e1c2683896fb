//! Patient routes under `/api/pacientes`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use hospital_core::models::records::{Patient, PatientFields};
use hospital_core::records::patients;

use super::JsonBody;
use crate::AppState;
use crate::error::AppResult;
use crate::models::DeletedResponse;

pub async fn list_patients(State(state): State<AppState>) -> AppResult<Json<Vec<Patient>>> {
    Ok(Json(patients::list(&*state.store).await?))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Patient>> {
    Ok(Json(patients::get(&*state.store, &id).await?))
}

pub async fn create_patient(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PatientFields>,
) -> AppResult<(StatusCode, Json<Patient>)> {
    let created = patients::create(&*state.store, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<PatientFields>,
) -> AppResult<Json<Patient>> {
    Ok(Json(patients::update(&*state.store, &id, body).await?))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedResponse<Patient>>> {
    let deleted = patients::delete(&*state.store, &id).await?;
    Ok(Json(DeletedResponse {
        message: "Patient deleted successfully".into(),
        deleted,
    }))
}
