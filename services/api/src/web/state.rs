//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use timeformed_core::ports::{
    CredentialHasher, MedicationRepository, TakeRepository, TreatmentMedicationRepository,
    TreatmentRepository, UserRepository,
};
use timeformed_core::services::{
    MedicationService, TakeService, TreatmentMedicationService, TreatmentService, UserService,
};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub medications: MedicationService,
    pub treatments: TreatmentService,
    pub treatment_medications: TreatmentMedicationService,
    pub takes: TakeService,
}

impl AppState {
    /// Wires every service onto one store that implements all repository ports.
    pub fn from_store<S>(store: Arc<S>, hasher: Arc<dyn CredentialHasher>) -> Self
    where
        S: UserRepository
            + MedicationRepository
            + TreatmentRepository
            + TreatmentMedicationRepository
            + TakeRepository
            + 'static,
    {
        let users: Arc<dyn UserRepository> = store.clone();
        let medications: Arc<dyn MedicationRepository> = store.clone();
        let treatments: Arc<dyn TreatmentRepository> = store.clone();
        let links: Arc<dyn TreatmentMedicationRepository> = store.clone();
        let takes: Arc<dyn TakeRepository> = store;

        Self {
            users: UserService::new(users.clone(), hasher),
            medications: MedicationService::new(medications.clone(), users.clone()),
            treatments: TreatmentService::new(treatments.clone(), users),
            treatment_medications: TreatmentMedicationService::new(
                links.clone(),
                treatments.clone(),
                medications,
            ),
            takes: TakeService::new(takes, links, treatments),
        }
    }
}
