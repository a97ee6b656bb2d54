pub mod domain;
pub mod error;
pub mod mapping;
pub mod models;
pub mod ports;
pub mod services;

pub use domain::{Medication, Take, Treatment, TreatmentMedication, User, UNSAVED_ID};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use ports::{
    CredentialHasher, MedicationRepository, PortError, PortResult, TakeRepository,
    TreatmentMedicationRepository, TreatmentRepository, UserRepository,
};
pub use services::{
    MedicationService, TakeService, TreatmentMedicationService, TreatmentService, UserService,
};
