//! Medication routes under `/api/medicamentos`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use hospital_core::models::records::{Medication, MedicationFields};
use hospital_core::records::medications;

use super::JsonBody;
use crate::AppState;
use crate::error::AppResult;
use crate::models::DeletedResponse;

pub async fn list_medications(State(state): State<AppState>) -> AppResult<Json<Vec<Medication>>> {
    Ok(Json(medications::list(&*state.store).await?))
}

pub async fn get_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Medication>> {
    Ok(Json(medications::get(&*state.store, &id).await?))
}

pub async fn create_medication(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<MedicationFields>,
) -> AppResult<(StatusCode, Json<Medication>)> {
    let created = medications::create(&*state.store, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<MedicationFields>,
) -> AppResult<Json<Medication>> {
    Ok(Json(medications::update(&*state.store, &id, body).await?))
}

pub async fn delete_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedResponse<Medication>>> {
    let deleted = medications::delete(&*state.store, &id).await?;
    Ok(Json(DeletedResponse {
        message: "Medication deleted successfully".into(),
        deleted,
    }))
}
