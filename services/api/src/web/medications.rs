//! services/api/src/web/medications.rs
//!
//! REST handlers for `/meds`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use timeformed_core::models::{MedicationRequest, MedicationResponse};

use crate::error::ApiError;
use crate::web::{state::AppState, validation};

/// Add a medication to its owner's catalog.
#[utoipa::path(
    post,
    path = "/api/timeformed/meds",
    request_body = MedicationRequest,
    responses(
        (status = 201, description = "Medication created", body = MedicationResponse),
        (status = 404, description = "Owner not found"),
        (status = 409, description = "Owner already has a medication with this name")
    ),
    tag = "meds"
)]
pub async fn create_medication(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MedicationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    validation::medication(&request)?;
    let medication = state.medications.create(request).await?;
    Ok((StatusCode::CREATED, Json(medication)))
}

#[utoipa::path(
    get,
    path = "/api/timeformed/meds",
    responses((status = 200, description = "All medications", body = [MedicationResponse])),
    tag = "meds"
)]
pub async fn list_medications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MedicationResponse>>, ApiError> {
    Ok(Json(state.medications.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/timeformed/meds/{id}",
    params(("id" = i64, Path, description = "Medication id")),
    responses(
        (status = 200, description = "The medication", body = MedicationResponse),
        (status = 404, description = "Medication not found")
    ),
    tag = "meds"
)]
pub async fn get_medication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MedicationResponse>, ApiError> {
    Ok(Json(state.medications.find_by_id(id).await?))
}

/// List one user's medications.
#[utoipa::path(
    get,
    path = "/api/timeformed/meds/by-user/{user_id}",
    params(("user_id" = i64, Path, description = "Owner id")),
    responses(
        (status = 200, description = "The owner's medications", body = [MedicationResponse]),
        (status = 404, description = "User not found")
    ),
    tag = "meds"
)]
pub async fn list_medications_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<MedicationResponse>>, ApiError> {
    Ok(Json(state.medications.find_all_by_owner(user_id).await?))
}

/// Update a medication. The body must name the current owner.
#[utoipa::path(
    put,
    path = "/api/timeformed/meds/{id}",
    params(("id" = i64, Path, description = "Medication id")),
    request_body = MedicationRequest,
    responses(
        (status = 200, description = "Medication updated", body = MedicationResponse),
        (status = 403, description = "Medication belongs to another user"),
        (status = 404, description = "Medication or owner not found"),
        (status = 409, description = "Owner already has a medication with this name")
    ),
    tag = "meds"
)]
pub async fn update_medication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<MedicationRequest>, JsonRejection>,
) -> Result<Json<MedicationResponse>, ApiError> {
    let Json(request) = payload?;
    validation::medication(&request)?;
    Ok(Json(state.medications.update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/timeformed/meds/{id}",
    params(("id" = i64, Path, description = "Medication id")),
    responses(
        (status = 204, description = "Medication deleted"),
        (status = 404, description = "Medication not found"),
        (status = 409, description = "Medication is still referenced")
    ),
    tag = "meds"
)]
pub async fn delete_medication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.medications.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
