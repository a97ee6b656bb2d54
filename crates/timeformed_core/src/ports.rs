//! crates/timeformed_core/src/ports.rs
//!
//! Defines the persistence and hashing contracts (traits) the services depend on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific implementations like PostgreSQL or Argon2.

use async_trait::async_trait;

use crate::domain::{Medication, Take, Treatment, TreatmentMedication, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, hashing).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A storage-level uniqueness or referential constraint rejected the write.
    #[error("Storage constraint violated: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Repository Ports (Traits)
//=========================================================================================
// `save` inserts when the entity's id is `UNSAVED_ID` and fully replaces the
// stored row otherwise. It returns the entity as persisted.
//=========================================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<User>>;

    async fn find_all(&self) -> PortResult<Vec<User>>;

    async fn exists_by_email(&self, email: &str) -> PortResult<bool>;

    async fn save(&self, user: User) -> PortResult<User>;

    async fn delete(&self, user: User) -> PortResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MedicationRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<Medication>>;

    async fn find_all(&self) -> PortResult<Vec<Medication>>;

    async fn find_by_owner_id(&self, owner_id: i64) -> PortResult<Vec<Medication>>;

    /// Exact, case-sensitive name match within one owner's catalog.
    async fn exists_by_owner_and_name(&self, owner_id: i64, name: &str) -> PortResult<bool>;

    async fn save(&self, medication: Medication) -> PortResult<Medication>;

    async fn delete(&self, medication: Medication) -> PortResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TreatmentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<Treatment>>;

    async fn find_all(&self) -> PortResult<Vec<Treatment>>;

    async fn find_by_owner_id(&self, owner_id: i64) -> PortResult<Vec<Treatment>>;

    async fn save(&self, treatment: Treatment) -> PortResult<Treatment>;

    async fn delete(&self, treatment: Treatment) -> PortResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TreatmentMedicationRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<TreatmentMedication>>;

    async fn find_all(&self) -> PortResult<Vec<TreatmentMedication>>;

    async fn find_by_treatment_id(&self, treatment_id: i64)
        -> PortResult<Vec<TreatmentMedication>>;

    async fn save(&self, link: TreatmentMedication) -> PortResult<TreatmentMedication>;

    async fn delete(&self, link: TreatmentMedication) -> PortResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TakeRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<Take>>;

    /// All takes in store order.
    async fn find_all(&self) -> PortResult<Vec<Take>>;

    /// Takes of one treatment-medication link, in store order.
    async fn find_by_treatment_medication_id(
        &self,
        treatment_medication_id: i64,
    ) -> PortResult<Vec<Take>>;

    async fn save(&self, take: Take) -> PortResult<Take>;

    async fn delete(&self, take: Take) -> PortResult<()>;
}

//=========================================================================================
// Credential Hashing Port
//=========================================================================================

#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// One-way hash of a plaintext password into an opaque digest.
    fn hash(&self, plaintext: &str) -> PortResult<String>;
}
