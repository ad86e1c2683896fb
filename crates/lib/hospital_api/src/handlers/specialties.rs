//! Specialty routes under `/api/especialidades`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use hospital_core::models::records::{Specialty, SpecialtyFields};
use hospital_core::records::specialties;

use super::JsonBody;
use crate::AppState;
use crate::error::AppResult;
use crate::models::DeletedResponse;

pub async fn list_specialties(State(state): State<AppState>) -> AppResult<Json<Vec<Specialty>>> {
    Ok(Json(specialties::list(&*state.store).await?))
}

pub async fn get_specialty(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Specialty>> {
    Ok(Json(specialties::get(&*state.store, &id).await?))
}

pub async fn create_specialty(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SpecialtyFields>,
) -> AppResult<(StatusCode, Json<Specialty>)> {
    let created = specialties::create(&*state.store, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_specialty(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<SpecialtyFields>,
) -> AppResult<Json<Specialty>> {
    Ok(Json(specialties::update(&*state.store, &id, body).await?))
}

pub async fn delete_specialty(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedResponse<Specialty>>> {
    let deleted = specialties::delete(&*state.store, &id).await?;
    Ok(Json(DeletedResponse {
        message: "Specialty deleted successfully".into(),
        deleted,
    }))
}
