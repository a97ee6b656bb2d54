//! crates/timeformed_core/src/error.rs
//!
//! The error type returned by every service operation.

use crate::ports::PortError;

/// Coarse classification the boundary layer maps to a transport signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Forbidden,
    InvalidRequest,
    Unexpected,
}

/// A failed service operation. Raised before any write is persisted.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("User with ID {0} not found")]
    UserNotFound(i64),

    #[error("Medication with ID {0} not found")]
    MedicationNotFound(i64),

    #[error("Treatment with ID {0} not found")]
    TreatmentNotFound(i64),

    #[error("Treatment-medication link with ID {0} not found")]
    TreatmentMedicationNotFound(i64),

    #[error("Take with ID {0} not found")]
    TakeNotFound(i64),

    #[error("A user with email '{0}' already exists")]
    EmailAlreadyExists(String),

    #[error("User {owner_id} already has a medication named '{name}'")]
    MedicationAlreadyExists { owner_id: i64, name: String },

    #[error("Medication {medication_id} does not belong to user {owner_id}")]
    ForbiddenOperation { medication_id: i64, owner_id: i64 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Represents an error that propagated up from one of the ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_)
            | Self::MedicationNotFound(_)
            | Self::TreatmentNotFound(_)
            | Self::TreatmentMedicationNotFound(_)
            | Self::TakeNotFound(_)
            | Self::Port(PortError::NotFound(_)) => ErrorKind::NotFound,
            Self::EmailAlreadyExists(_)
            | Self::MedicationAlreadyExists { .. }
            | Self::Port(PortError::Conflict(_)) => ErrorKind::AlreadyExists,
            Self::ForbiddenOperation { .. } => ErrorKind::Forbidden,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Port(PortError::Unexpected(_)) => ErrorKind::Unexpected,
        }
    }
}

/// A convenience type alias for `Result<T, ServiceError>`.
pub type ServiceResult<T> = Result<T, ServiceError>;
