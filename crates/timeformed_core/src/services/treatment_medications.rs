//! Treatment-medication links: which medication, at what dose and schedule,
//! belongs to which treatment.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::{Medication, TreatmentMedication};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{TreatmentMedicationRequest, TreatmentMedicationResponse};
use crate::ports::{MedicationRepository, TreatmentMedicationRepository, TreatmentRepository};

#[derive(Clone)]
pub struct TreatmentMedicationService {
    links: Arc<dyn TreatmentMedicationRepository>,
    treatments: Arc<dyn TreatmentRepository>,
    medications: Arc<dyn MedicationRepository>,
}

impl TreatmentMedicationService {
    pub fn new(
        links: Arc<dyn TreatmentMedicationRepository>,
        treatments: Arc<dyn TreatmentRepository>,
        medications: Arc<dyn MedicationRepository>,
    ) -> Self {
        Self {
            links,
            treatments,
            medications,
        }
    }

    async fn load(&self, id: i64) -> ServiceResult<TreatmentMedication> {
        self.links
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::TreatmentMedicationNotFound(id))
    }

    async fn load_medication(&self, id: i64) -> ServiceResult<Medication> {
        self.medications
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::MedicationNotFound(id))
    }

    /// Resolves both references of a request. Treatment is checked first.
    async fn resolve_references(
        &self,
        request: &TreatmentMedicationRequest,
    ) -> ServiceResult<Medication> {
        if self
            .treatments
            .find_by_id(request.treatment_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::TreatmentNotFound(request.treatment_id));
        }
        self.load_medication(request.medication_id).await
    }

    async fn project(
        &self,
        link: TreatmentMedication,
    ) -> ServiceResult<TreatmentMedicationResponse> {
        let medication = self.load_medication(link.medication_id).await?;
        Ok(TreatmentMedicationResponse::from_parts(link, medication))
    }

    pub async fn create(
        &self,
        request: TreatmentMedicationRequest,
    ) -> ServiceResult<TreatmentMedicationResponse> {
        let medication = self.resolve_references(&request).await?;
        let saved = self
            .links
            .save(TreatmentMedication::from_request(request, Utc::now()))
            .await?;
        info!(
            "Linked medication {} into treatment {} as {}",
            saved.medication_id, saved.treatment_id, saved.id
        );
        Ok(TreatmentMedicationResponse::from_parts(saved, medication))
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<TreatmentMedicationResponse>> {
        let links = self.links.find_all().await?;

        let mut medications: HashMap<i64, Medication> = HashMap::new();
        let mut responses = Vec::with_capacity(links.len());
        for link in links {
            let medication = match medications.get(&link.medication_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.load_medication(link.medication_id).await?;
                    medications.insert(fetched.id, fetched.clone());
                    fetched
                }
            };
            responses.push(TreatmentMedicationResponse::from_parts(link, medication));
        }
        Ok(responses)
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<TreatmentMedicationResponse> {
        let link = self.load(id).await?;
        self.project(link).await
    }

    pub async fn update(
        &self,
        id: i64,
        request: TreatmentMedicationRequest,
    ) -> ServiceResult<TreatmentMedicationResponse> {
        let current = self.load(id).await?;
        let medication = self.resolve_references(&request).await?;
        let saved = self.links.save(current.with_changes(request)).await?;
        info!("Updated treatment-medication link {}", saved.id);
        Ok(TreatmentMedicationResponse::from_parts(saved, medication))
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let link = self.load(id).await?;
        self.links.delete(link).await?;
        info!("Deleted treatment-medication link {}", id);
        Ok(())
    }
}
