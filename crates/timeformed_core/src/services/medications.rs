//! Medication catalog scoped per owner.
//!
//! A user cannot hold two medications with the same name, and a medication can
//! only be updated by naming its current owner.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::Medication;
use crate::error::{ServiceError, ServiceResult};
use crate::mapping::to_responses;
use crate::models::{MedicationRequest, MedicationResponse};
use crate::ports::{MedicationRepository, UserRepository};

#[derive(Clone)]
pub struct MedicationService {
    medications: Arc<dyn MedicationRepository>,
    users: Arc<dyn UserRepository>,
}

impl MedicationService {
    pub fn new(
        medications: Arc<dyn MedicationRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self { medications, users }
    }

    async fn ensure_user_exists(&self, user_id: i64) -> ServiceResult<()> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::UserNotFound(user_id)),
        }
    }

    async fn ensure_name_free(&self, owner_id: i64, name: &str) -> ServiceResult<()> {
        if self
            .medications
            .exists_by_owner_and_name(owner_id, name)
            .await?
        {
            warn!("User {} already has a medication named '{}'", owner_id, name);
            return Err(ServiceError::MedicationAlreadyExists {
                owner_id,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    async fn load(&self, id: i64) -> ServiceResult<Medication> {
        self.medications
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::MedicationNotFound(id))
    }

    pub async fn create(&self, request: MedicationRequest) -> ServiceResult<MedicationResponse> {
        self.ensure_user_exists(request.owner_id).await?;
        self.ensure_name_free(request.owner_id, &request.name).await?;

        let saved = self
            .medications
            .save(Medication::from_request(request, Utc::now()))
            .await?;
        info!("Created medication {} for user {}", saved.id, saved.owner_id);
        Ok(saved.into())
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<MedicationResponse>> {
        Ok(to_responses(self.medications.find_all().await?))
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<MedicationResponse> {
        Ok(self.load(id).await?.into())
    }

    /// The owner must exist; an owner without medications yields an empty list.
    pub async fn find_all_by_owner(&self, owner_id: i64) -> ServiceResult<Vec<MedicationResponse>> {
        self.ensure_user_exists(owner_id).await?;
        Ok(to_responses(
            self.medications.find_by_owner_id(owner_id).await?,
        ))
    }

    /// Rejects any `owner_id` other than the current owner, so ownership never
    /// moves through an update. Uniqueness is re-checked only on a rename.
    pub async fn update(
        &self,
        id: i64,
        request: MedicationRequest,
    ) -> ServiceResult<MedicationResponse> {
        let current = self.load(id).await?;

        if current.owner_id != request.owner_id {
            warn!(
                "User {} attempted to modify medication {} owned by user {}",
                request.owner_id, id, current.owner_id
            );
            return Err(ServiceError::ForbiddenOperation {
                medication_id: id,
                owner_id: request.owner_id,
            });
        }

        self.ensure_user_exists(request.owner_id).await?;

        if request.name != current.name {
            self.ensure_name_free(request.owner_id, &request.name).await?;
        }

        let saved = self.medications.save(current.with_changes(request)).await?;
        info!("Updated medication {}", saved.id);
        Ok(saved.into())
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let medication = self.load(id).await?;
        self.medications.delete(medication).await?;
        info!("Deleted medication {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::ports::{MockMedicationRepository, MockUserRepository};
    use mockall::predicate::eq;

    fn user(id: i64) -> User {
        User {
            id,
            name: "Alex".into(),
            email: "alex@mail.com".into(),
            password_hash: None,
            age: 30,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn medication(id: i64, owner_id: i64, name: &str) -> Medication {
        Medication {
            id,
            name: name.into(),
            description: "Pain".into(),
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(name: &str, description: &str, owner_id: i64) -> MedicationRequest {
        MedicationRequest {
            name: name.into(),
            description: description.into(),
            owner_id,
        }
    }

    /// Users 1 and 5 exist; every other id is unknown.
    fn known_users() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            Ok(match id {
                1 | 5 => Some(user(id)),
                _ => None,
            })
        });
        users
    }

    fn make_service(
        medications: MockMedicationRepository,
        users: MockUserRepository,
    ) -> MedicationService {
        MedicationService::new(Arc::new(medications), Arc::new(users))
    }

    #[tokio::test]
    async fn create_returns_projection_with_owner() {
        let mut medications = MockMedicationRepository::new();
        medications
            .expect_exists_by_owner_and_name()
            .withf(|owner_id: &i64, name: &str| *owner_id == 1 && name == "Paracetamol")
            .times(1)
            .returning(|_, _| Ok(false));
        medications
            .expect_save()
            .times(1)
            .returning(|m| Ok(Medication { id: 1, ..m }));

        let service = make_service(medications, known_users());
        let response = service
            .create(request("Paracetamol", "Pain", 1))
            .await
            .expect("created");

        assert_eq!(
            response,
            MedicationResponse {
                id: 1,
                name: "Paracetamol".into(),
                description: "Pain".into(),
                owner_id: 1,
            }
        );
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name_for_same_owner() {
        let mut medications = MockMedicationRepository::new();
        medications
            .expect_exists_by_owner_and_name()
            .returning(|_, _| Ok(true));
        medications.expect_save().times(0);

        let service = make_service(medications, known_users());
        let err = service
            .create(request("Paracetamol", "Other", 1))
            .await
            .expect_err("duplicate");

        assert!(matches!(
            err,
            ServiceError::MedicationAlreadyExists { owner_id: 1, ref name } if name == "Paracetamol"
        ));
    }

    #[tokio::test]
    async fn create_rejects_unknown_owner_before_uniqueness_check() {
        let mut medications = MockMedicationRepository::new();
        medications.expect_exists_by_owner_and_name().times(0);
        medications.expect_save().times(0);

        let service = make_service(medications, known_users());
        let err = service
            .create(request("Paracetamol", "Pain", 2))
            .await
            .expect_err("unknown owner");

        assert!(matches!(err, ServiceError::UserNotFound(2)));
    }

    #[tokio::test]
    async fn find_by_id_reports_missing_medication() {
        let mut medications = MockMedicationRepository::new();
        medications.expect_find_by_id().returning(|_| Ok(None));

        let service = make_service(medications, known_users());
        let err = service.find_by_id(7).await.expect_err("missing");

        assert!(matches!(err, ServiceError::MedicationNotFound(7)));
    }

    #[tokio::test]
    async fn find_all_by_owner_lists_owner_catalog() {
        let mut medications = MockMedicationRepository::new();
        medications
            .expect_find_by_owner_id()
            .with(eq(5))
            .returning(|owner| {
                Ok(vec![
                    medication(1, owner, "Paracetamol"),
                    medication(2, owner, "Ibuprofen"),
                ])
            });

        let service = make_service(medications, known_users());
        let list = service.find_all_by_owner(5).await.expect("listed");

        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|m| m.owner_id == 5));
    }

    #[tokio::test]
    async fn find_all_by_owner_requires_existing_user() {
        let mut medications = MockMedicationRepository::new();
        medications.expect_find_by_owner_id().times(0);

        let service = make_service(medications, known_users());
        let err = service.find_all_by_owner(2).await.expect_err("unknown");

        assert!(matches!(err, ServiceError::UserNotFound(2)));
    }

    #[tokio::test]
    async fn update_by_other_owner_is_forbidden() {
        let mut medications = MockMedicationRepository::new();
        medications
            .expect_find_by_id()
            .returning(|id| Ok(Some(medication(id, 1, "Paracetamol"))));
        medications.expect_exists_by_owner_and_name().times(0);
        medications.expect_save().times(0);

        let service = make_service(medications, known_users());
        let err = service
            .update(3, request("Paracetamol", "Pain", 5))
            .await
            .expect_err("forbidden");

        assert!(matches!(
            err,
            ServiceError::ForbiddenOperation {
                medication_id: 3,
                owner_id: 5
            }
        ));
    }

    #[tokio::test]
    async fn update_keeping_name_skips_uniqueness_check() {
        let mut medications = MockMedicationRepository::new();
        medications
            .expect_find_by_id()
            .returning(|id| Ok(Some(medication(id, 1, "Paracetamol"))));
        // Would collide if it were consulted.
        medications
            .expect_exists_by_owner_and_name()
            .times(0)
            .returning(|_, _| Ok(true));
        medications.expect_save().times(1).returning(Ok);

        let service = make_service(medications, known_users());
        let response = service
            .update(3, request("Paracetamol", "Fever", 1))
            .await
            .expect("updated");

        assert_eq!(response.description, "Fever");
    }

    #[tokio::test]
    async fn update_renaming_onto_existing_name_conflicts() {
        let mut medications = MockMedicationRepository::new();
        medications
            .expect_find_by_id()
            .returning(|id| Ok(Some(medication(id, 1, "Paracetamol"))));
        medications
            .expect_exists_by_owner_and_name()
            .withf(|_, name: &str| name == "Ibuprofen")
            .returning(|_, _| Ok(true));
        medications.expect_save().times(0);

        let service = make_service(medications, known_users());
        let err = service
            .update(3, request("Ibuprofen", "Pain", 1))
            .await
            .expect_err("duplicate");

        assert!(matches!(err, ServiceError::MedicationAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn update_fails_when_owner_vanished() {
        let mut medications = MockMedicationRepository::new();
        medications
            .expect_find_by_id()
            .returning(|id| Ok(Some(medication(id, 9, "Paracetamol"))));
        medications.expect_save().times(0);

        let service = make_service(medications, known_users());
        let err = service
            .update(3, request("Paracetamol", "Pain", 9))
            .await
            .expect_err("owner gone");

        assert!(matches!(err, ServiceError::UserNotFound(9)));
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_medication_do_not_mutate() {
        let mut medications = MockMedicationRepository::new();
        medications.expect_find_by_id().returning(|_| Ok(None));
        medications.expect_save().times(0);
        medications.expect_delete().times(0);

        let service = make_service(medications, known_users());

        let err = service
            .update(4, request("Paracetamol", "Pain", 1))
            .await
            .expect_err("missing");
        assert!(matches!(err, ServiceError::MedicationNotFound(4)));
        let err = service.delete(4).await.expect_err("missing");
        assert!(matches!(err, ServiceError::MedicationNotFound(4)));
    }

    #[tokio::test]
    async fn delete_removes_existing_medication() {
        let mut medications = MockMedicationRepository::new();
        medications
            .expect_find_by_id()
            .returning(|id| Ok(Some(medication(id, 1, "Paracetamol"))));
        medications.expect_delete().times(1).returning(|_| Ok(()));

        let service = make_service(medications, known_users());
        service.delete(3).await.expect("deleted");
    }
}
