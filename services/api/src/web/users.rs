//! services/api/src/web/users.rs
//!
//! REST handlers for `/users`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use timeformed_core::models::{UserRequest, UserResponse};

use crate::error::ApiError;
use crate::web::{state::AppState, validation};

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/timeformed/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    validation::user(&request)?;
    let user = state.users.create(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users.
#[utoipa::path(
    get,
    path = "/api/timeformed/users",
    responses((status = 200, description = "All users", body = [UserResponse])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    Ok(Json(state.users.find_all().await?))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/timeformed/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(state.users.find_by_id(id).await?))
}

/// Replace a user's name, email and age; the password only when supplied.
#[utoipa::path(
    put,
    path = "/api/timeformed/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;
    validation::user(&request)?;
    Ok(Json(state.users.update(id, request).await?))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/timeformed/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User is still referenced")
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
