//! crates/timeformed_core/src/models.rs
//!
//! Inbound request and outbound response value objects.
//! Responses are projections: they never expose internal-only fields such as
//! the password hash or the bookkeeping timestamps.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserRequest {
    pub name: String,
    pub email: String,
    pub age: i32,
    /// Plaintext. Omitted or blank on update keeps the current password.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MedicationRequest {
    pub name: String,
    pub description: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TreatmentRequest {
    pub name: String,
    pub description: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TreatmentMedicationRequest {
    pub treatment_id: i64,
    pub medication_id: i64,
    pub dose: String,
    pub frequency_hours: i32,
    pub duration_days: i32,
    pub start_hour: String,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TakeRequest {
    pub treatment_medication_id: i64,
    pub scheduled_at: NaiveDateTime,
    #[serde(default)]
    pub taken_at: Option<NaiveDateTime>,
    pub was_taken: bool,
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MedicationResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TreatmentResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TreatmentMedicationResponse {
    pub id: i64,
    pub treatment_id: i64,
    pub medication: MedicationResponse,
    pub dose: String,
    pub frequency_hours: i32,
    pub duration_days: i32,
    pub start_hour: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TakeResponse {
    pub id: i64,
    pub treatment_medication_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub taken_at: Option<NaiveDateTime>,
    pub was_taken: bool,
}
