//! crates/timeformed_core/src/services/mod.rs
//!
//! The domain services. Each operation validates references and uniqueness
//! through the repository ports, then persists and returns a projection.
//! Every failure is returned before any write happens.

pub mod medications;
pub mod takes;
pub mod treatment_medications;
pub mod treatments;
pub mod users;

pub use medications::MedicationService;
pub use takes::TakeService;
pub use treatment_medications::TreatmentMedicationService;
pub use treatments::TreatmentService;
pub use users::UserService;
