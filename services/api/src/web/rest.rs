//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the health check.

use axum::Json;
use serde::Serialize;
use timeformed_core::models::{
    MedicationRequest, MedicationResponse, TakeRequest, TakeResponse, TreatmentMedicationRequest,
    TreatmentMedicationResponse, TreatmentRequest, TreatmentResponse, UserRequest, UserResponse,
};
use utoipa::{OpenApi, ToSchema};

use crate::web::{medications, takes, treatment_medications, treatments, users};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        medications::create_medication,
        medications::list_medications,
        medications::get_medication,
        medications::list_medications_by_user,
        medications::update_medication,
        medications::delete_medication,
        treatments::create_treatment,
        treatments::list_treatments,
        treatments::get_treatment,
        treatments::update_treatment,
        treatments::delete_treatment,
        treatment_medications::create_treatment_medication,
        treatment_medications::list_treatment_medications,
        treatment_medications::get_treatment_medication,
        treatment_medications::update_treatment_medication,
        treatment_medications::delete_treatment_medication,
        takes::create_take,
        takes::list_takes,
        takes::get_take,
        takes::list_takes_by_treatment_medication,
        takes::list_takes_by_user,
        takes::update_take,
        takes::delete_take,
    ),
    components(
        schemas(
            HealthResponse,
            UserRequest,
            UserResponse,
            MedicationRequest,
            MedicationResponse,
            TreatmentRequest,
            TreatmentResponse,
            TreatmentMedicationRequest,
            TreatmentMedicationResponse,
            TakeRequest,
            TakeResponse,
        )
    ),
    tags(
        (name = "users", description = "Registered patients."),
        (name = "meds", description = "Each user's medication catalog."),
        (name = "treatments", description = "Named treatment plans."),
        (name = "treatment-meds", description = "Medications scheduled inside a treatment."),
        (name = "takes", description = "Scheduled and administered doses."),
        (name = "health", description = "Liveness.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Health
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is up", body = HealthResponse)),
    tag = "health"
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
