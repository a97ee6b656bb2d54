//! services/api/src/web/takes.rs
//!
//! REST handlers for `/takes`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use timeformed_core::models::{TakeRequest, TakeResponse};

use crate::error::ApiError;
use crate::web::state::AppState;

/// Record a scheduled or administered dose.
#[utoipa::path(
    post,
    path = "/api/timeformed/takes",
    request_body = TakeRequest,
    responses(
        (status = 201, description = "Take recorded", body = TakeResponse),
        (status = 404, description = "Treatment-medication link not found")
    ),
    tag = "takes"
)]
pub async fn create_take(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TakeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let take = state.takes.create(request).await?;
    Ok((StatusCode::CREATED, Json(take)))
}

#[utoipa::path(
    get,
    path = "/api/timeformed/takes",
    responses((status = 200, description = "All takes", body = [TakeResponse])),
    tag = "takes"
)]
pub async fn list_takes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TakeResponse>>, ApiError> {
    Ok(Json(state.takes.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/timeformed/takes/{id}",
    params(("id" = i64, Path, description = "Take id")),
    responses(
        (status = 200, description = "The take", body = TakeResponse),
        (status = 404, description = "Take not found")
    ),
    tag = "takes"
)]
pub async fn get_take(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TakeResponse>, ApiError> {
    Ok(Json(state.takes.find_by_id(id).await?))
}

/// Takes of one treatment-medication link.
#[utoipa::path(
    get,
    path = "/api/timeformed/takes/treatment-med/{treatment_med_id}",
    params(("treatment_med_id" = i64, Path, description = "Treatment-medication link id")),
    responses((status = 200, description = "The link's takes", body = [TakeResponse])),
    tag = "takes"
)]
pub async fn list_takes_by_treatment_medication(
    State(state): State<Arc<AppState>>,
    Path(treatment_med_id): Path<i64>,
) -> Result<Json<Vec<TakeResponse>>, ApiError> {
    Ok(Json(
        state
            .takes
            .find_by_treatment_medication_id(treatment_med_id)
            .await?,
    ))
}

/// Takes owned by a user through their treatments. Unknown users get an empty list.
#[utoipa::path(
    get,
    path = "/api/timeformed/takes/user/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses((status = 200, description = "The user's takes", body = [TakeResponse])),
    tag = "takes"
)]
pub async fn list_takes_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<TakeResponse>>, ApiError> {
    Ok(Json(state.takes.find_by_user_id(user_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/timeformed/takes/{id}",
    params(("id" = i64, Path, description = "Take id")),
    request_body = TakeRequest,
    responses(
        (status = 200, description = "Take updated", body = TakeResponse),
        (status = 404, description = "Take or link not found")
    ),
    tag = "takes"
)]
pub async fn update_take(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<TakeRequest>, JsonRejection>,
) -> Result<Json<TakeResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.takes.update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/timeformed/takes/{id}",
    params(("id" = i64, Path, description = "Take id")),
    responses(
        (status = 204, description = "Take deleted"),
        (status = 404, description = "Take not found")
    ),
    tag = "takes"
)]
pub async fn delete_take(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.takes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
