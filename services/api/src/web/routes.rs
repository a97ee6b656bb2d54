//! services/api/src/web/routes.rs
//!
//! Assembles the HTTP router: every resource under `/api/timeformed`, the
//! health check, and the Swagger UI.

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::web::{
    medications,
    rest::{health_handler, ApiDoc},
    state::AppState,
    takes, treatment_medications, treatments, users,
};

pub const BASE_PATH: &str = "/api/timeformed";

/// Builds a CORS layer that admits a single browser origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, ApiError> {
    let origin = origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("CORS_ALLOWED_ORIGIN".to_string(), e.to_string())
    })?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]))
}

fn resource_routes() -> Router<Arc<AppState>> {
    Router::new()
        // --- Users ---
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // --- Medications ---
        .route(
            "/meds",
            get(medications::list_medications).post(medications::create_medication),
        )
        .route(
            "/meds/by-user/{user_id}",
            get(medications::list_medications_by_user),
        )
        .route(
            "/meds/{id}",
            get(medications::get_medication)
                .put(medications::update_medication)
                .delete(medications::delete_medication),
        )
        // --- Treatments ---
        .route(
            "/treatments",
            get(treatments::list_treatments).post(treatments::create_treatment),
        )
        .route(
            "/treatments/{id}",
            get(treatments::get_treatment)
                .put(treatments::update_treatment)
                .delete(treatments::delete_treatment),
        )
        // --- Treatment medications ---
        .route(
            "/treatment-meds",
            get(treatment_medications::list_treatment_medications)
                .post(treatment_medications::create_treatment_medication),
        )
        .route(
            "/treatment-meds/{id}",
            get(treatment_medications::get_treatment_medication)
                .put(treatment_medications::update_treatment_medication)
                .delete(treatment_medications::delete_treatment_medication),
        )
        // --- Takes ---
        .route("/takes", get(takes::list_takes).post(takes::create_take))
        .route("/takes/user/{user_id}", get(takes::list_takes_by_user))
        .route(
            "/takes/treatment-med/{treatment_med_id}",
            get(takes::list_takes_by_treatment_medication),
        )
        .route(
            "/takes/{id}",
            get(takes::get_take)
                .put(takes::update_take)
                .delete(takes::delete_take),
        )
}

/// The complete application router.
pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .nest(BASE_PATH, resource_routes())
        .route("/health", get(health_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
