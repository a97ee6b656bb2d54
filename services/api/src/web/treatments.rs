//! services/api/src/web/treatments.rs
//!
//! REST handlers for `/treatments`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use timeformed_core::models::{TreatmentRequest, TreatmentResponse};

use crate::error::ApiError;
use crate::web::{state::AppState, validation};

#[utoipa::path(
    post,
    path = "/api/timeformed/treatments",
    request_body = TreatmentRequest,
    responses(
        (status = 201, description = "Treatment created", body = TreatmentResponse),
        (status = 404, description = "Owner not found")
    ),
    tag = "treatments"
)]
pub async fn create_treatment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TreatmentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    validation::treatment(&request)?;
    let treatment = state.treatments.create(request).await?;
    Ok((StatusCode::CREATED, Json(treatment)))
}

#[utoipa::path(
    get,
    path = "/api/timeformed/treatments",
    responses((status = 200, description = "All treatments", body = [TreatmentResponse])),
    tag = "treatments"
)]
pub async fn list_treatments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TreatmentResponse>>, ApiError> {
    Ok(Json(state.treatments.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/timeformed/treatments/{id}",
    params(("id" = i64, Path, description = "Treatment id")),
    responses(
        (status = 200, description = "The treatment", body = TreatmentResponse),
        (status = 404, description = "Treatment not found")
    ),
    tag = "treatments"
)]
pub async fn get_treatment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TreatmentResponse>, ApiError> {
    Ok(Json(state.treatments.find_by_id(id).await?))
}

/// Replace a treatment, including its owner.
#[utoipa::path(
    put,
    path = "/api/timeformed/treatments/{id}",
    params(("id" = i64, Path, description = "Treatment id")),
    request_body = TreatmentRequest,
    responses(
        (status = 200, description = "Treatment updated", body = TreatmentResponse),
        (status = 404, description = "Treatment or owner not found")
    ),
    tag = "treatments"
)]
pub async fn update_treatment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<TreatmentRequest>, JsonRejection>,
) -> Result<Json<TreatmentResponse>, ApiError> {
    let Json(request) = payload?;
    validation::treatment(&request)?;
    Ok(Json(state.treatments.update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/timeformed/treatments/{id}",
    params(("id" = i64, Path, description = "Treatment id")),
    responses(
        (status = 204, description = "Treatment deleted"),
        (status = 404, description = "Treatment not found"),
        (status = 409, description = "Treatment is still referenced")
    ),
    tag = "treatments"
)]
pub async fn delete_treatment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.treatments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
