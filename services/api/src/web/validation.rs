//! services/api/src/web/validation.rs
//!
//! Shape checks applied to request bodies before they reach a service.
//! Failures surface as `InvalidRequest` (400).

use std::sync::LazyLock;

use regex::Regex;
use timeformed_core::models::{
    MedicationRequest, TreatmentMedicationRequest, TreatmentRequest, UserRequest,
};

use crate::error::ApiError;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// 24h wall-clock time, `HH:MM`.
static START_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid hour pattern"));

const MAX_AGE: i32 = 150;

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid(format!("'{}' must not be blank", field)));
    }
    Ok(())
}

fn require_positive(field: &str, value: i32) -> Result<(), ApiError> {
    if value <= 0 {
        return Err(ApiError::invalid(format!(
            "'{}' must be a positive integer, got {}",
            field, value
        )));
    }
    Ok(())
}

pub fn user(request: &UserRequest) -> Result<(), ApiError> {
    require_text("name", &request.name)?;
    if !EMAIL.is_match(&request.email) {
        return Err(ApiError::invalid(format!(
            "'{}' is not a valid email address",
            request.email
        )));
    }
    if !(0..=MAX_AGE).contains(&request.age) {
        return Err(ApiError::invalid(format!(
            "'age' must be between 0 and {}, got {}",
            MAX_AGE, request.age
        )));
    }
    Ok(())
}

pub fn medication(request: &MedicationRequest) -> Result<(), ApiError> {
    require_text("name", &request.name)
}

pub fn treatment(request: &TreatmentRequest) -> Result<(), ApiError> {
    require_text("name", &request.name)
}

pub fn treatment_medication(request: &TreatmentMedicationRequest) -> Result<(), ApiError> {
    require_text("dose", &request.dose)?;
    require_positive("frequency_hours", request.frequency_hours)?;
    require_positive("duration_days", request.duration_days)?;
    if !START_HOUR.is_match(&request.start_hour) {
        return Err(ApiError::invalid(format!(
            "'start_hour' must be a 24h HH:MM time, got '{}'",
            request.start_hour
        )));
    }
    Ok(())
}
