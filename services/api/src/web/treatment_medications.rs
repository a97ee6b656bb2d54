//! services/api/src/web/treatment_medications.rs
//!
//! REST handlers for `/treatment-meds`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use timeformed_core::models::{TreatmentMedicationRequest, TreatmentMedicationResponse};

use crate::error::ApiError;
use crate::web::{state::AppState, validation};

/// Link a medication into a treatment with a dosing schedule.
#[utoipa::path(
    post,
    path = "/api/timeformed/treatment-meds",
    request_body = TreatmentMedicationRequest,
    responses(
        (status = 201, description = "Link created", body = TreatmentMedicationResponse),
        (status = 400, description = "Invalid schedule"),
        (status = 404, description = "Treatment or medication not found")
    ),
    tag = "treatment-meds"
)]
pub async fn create_treatment_medication(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TreatmentMedicationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    validation::treatment_medication(&request)?;
    let link = state.treatment_medications.create(request).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

#[utoipa::path(
    get,
    path = "/api/timeformed/treatment-meds",
    responses((status = 200, description = "All links", body = [TreatmentMedicationResponse])),
    tag = "treatment-meds"
)]
pub async fn list_treatment_medications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TreatmentMedicationResponse>>, ApiError> {
    Ok(Json(state.treatment_medications.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/timeformed/treatment-meds/{id}",
    params(("id" = i64, Path, description = "Link id")),
    responses(
        (status = 200, description = "The link", body = TreatmentMedicationResponse),
        (status = 404, description = "Link not found")
    ),
    tag = "treatment-meds"
)]
pub async fn get_treatment_medication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TreatmentMedicationResponse>, ApiError> {
    Ok(Json(state.treatment_medications.find_by_id(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/timeformed/treatment-meds/{id}",
    params(("id" = i64, Path, description = "Link id")),
    request_body = TreatmentMedicationRequest,
    responses(
        (status = 200, description = "Link updated", body = TreatmentMedicationResponse),
        (status = 400, description = "Invalid schedule"),
        (status = 404, description = "Link, treatment or medication not found")
    ),
    tag = "treatment-meds"
)]
pub async fn update_treatment_medication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<TreatmentMedicationRequest>, JsonRejection>,
) -> Result<Json<TreatmentMedicationResponse>, ApiError> {
    let Json(request) = payload?;
    validation::treatment_medication(&request)?;
    Ok(Json(state.treatment_medications.update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/timeformed/treatment-meds/{id}",
    params(("id" = i64, Path, description = "Link id")),
    responses(
        (status = 204, description = "Link deleted"),
        (status = 404, description = "Link not found"),
        (status = 409, description = "Link is still referenced")
    ),
    tag = "treatment-meds"
)]
pub async fn delete_treatment_medication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.treatment_medications.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
