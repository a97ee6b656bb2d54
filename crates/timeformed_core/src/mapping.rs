//! crates/timeformed_core/src/mapping.rs
//!
//! Field-copy conversions between requests, entities and responses.
//! Updates build a fresh entity value from the stored one; nothing is mutated in place.

use chrono::{DateTime, Utc};

use crate::domain::{Medication, Take, Treatment, TreatmentMedication, User, UNSAVED_ID};
use crate::models::{
    MedicationRequest, MedicationResponse, TakeRequest, TakeResponse, TreatmentMedicationRequest,
    TreatmentMedicationResponse, TreatmentRequest, TreatmentResponse, UserRequest, UserResponse,
};

/// Maps a list of entities into their response projections, keeping order.
pub fn to_responses<E, R: From<E>>(entities: Vec<E>) -> Vec<R> {
    entities.into_iter().map(R::from).collect()
}

//=========================================================================================
// Request -> Entity
//=========================================================================================

impl User {
    pub fn from_request(
        request: UserRequest,
        password_hash: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UNSAVED_ID,
            name: request.name,
            email: request.email,
            password_hash,
            age: request.age,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites name, email and age. The hash is replaced only when a new one is given.
    pub fn with_changes(self, request: UserRequest, password_hash: Option<String>) -> Self {
        Self {
            name: request.name,
            email: request.email,
            age: request.age,
            password_hash: password_hash.or(self.password_hash),
            ..self
        }
    }
}

impl Medication {
    pub fn from_request(request: MedicationRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: UNSAVED_ID,
            name: request.name,
            description: request.description,
            owner_id: request.owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_changes(self, request: MedicationRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            owner_id: request.owner_id,
            ..self
        }
    }
}

impl Treatment {
    pub fn from_request(request: TreatmentRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: UNSAVED_ID,
            name: request.name,
            description: request.description,
            owner_id: request.owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_changes(self, request: TreatmentRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            owner_id: request.owner_id,
            ..self
        }
    }
}

impl TreatmentMedication {
    pub fn from_request(request: TreatmentMedicationRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: UNSAVED_ID,
            treatment_id: request.treatment_id,
            medication_id: request.medication_id,
            dose: request.dose,
            frequency_hours: request.frequency_hours,
            duration_days: request.duration_days,
            start_hour: request.start_hour,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_changes(self, request: TreatmentMedicationRequest) -> Self {
        Self {
            treatment_id: request.treatment_id,
            medication_id: request.medication_id,
            dose: request.dose,
            frequency_hours: request.frequency_hours,
            duration_days: request.duration_days,
            start_hour: request.start_hour,
            ..self
        }
    }
}

impl Take {
    pub fn from_request(request: TakeRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: UNSAVED_ID,
            treatment_medication_id: request.treatment_medication_id,
            scheduled_at: request.scheduled_at,
            taken_at: request.taken_at,
            was_taken: request.was_taken,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_changes(self, request: TakeRequest) -> Self {
        Self {
            treatment_medication_id: request.treatment_medication_id,
            scheduled_at: request.scheduled_at,
            taken_at: request.taken_at,
            was_taken: request.was_taken,
            ..self
        }
    }
}

//=========================================================================================
// Entity -> Response
//=========================================================================================

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
        }
    }
}

impl From<Medication> for MedicationResponse {
    fn from(medication: Medication) -> Self {
        Self {
            id: medication.id,
            name: medication.name,
            description: medication.description,
            owner_id: medication.owner_id,
        }
    }
}

impl From<Treatment> for TreatmentResponse {
    fn from(treatment: Treatment) -> Self {
        Self {
            id: treatment.id,
            name: treatment.name,
            description: treatment.description,
            owner_id: treatment.owner_id,
        }
    }
}

impl From<Take> for TakeResponse {
    fn from(take: Take) -> Self {
        Self {
            id: take.id,
            treatment_medication_id: take.treatment_medication_id,
            scheduled_at: take.scheduled_at,
            taken_at: take.taken_at,
            was_taken: take.was_taken,
        }
    }
}

impl TreatmentMedicationResponse {
    /// The link projection nests the linked medication's projection.
    pub fn from_parts(link: TreatmentMedication, medication: Medication) -> Self {
        Self {
            id: link.id,
            treatment_id: link.treatment_id,
            medication: medication.into(),
            dose: link.dose,
            frequency_hours: link.frequency_hours,
            duration_days: link.duration_days,
            start_hour: link.start_hour,
        }
    }
}
