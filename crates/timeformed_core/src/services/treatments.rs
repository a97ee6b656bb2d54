//! Treatments (prescriptions) owned by a user.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::Treatment;
use crate::error::{ServiceError, ServiceResult};
use crate::mapping::to_responses;
use crate::models::{TreatmentRequest, TreatmentResponse};
use crate::ports::{TreatmentRepository, UserRepository};

#[derive(Clone)]
pub struct TreatmentService {
    treatments: Arc<dyn TreatmentRepository>,
    users: Arc<dyn UserRepository>,
}

impl TreatmentService {
    pub fn new(treatments: Arc<dyn TreatmentRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { treatments, users }
    }

    async fn ensure_user_exists(&self, user_id: i64) -> ServiceResult<()> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::UserNotFound(user_id)),
        }
    }

    async fn load(&self, id: i64) -> ServiceResult<Treatment> {
        self.treatments
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::TreatmentNotFound(id))
    }

    pub async fn create(&self, request: TreatmentRequest) -> ServiceResult<TreatmentResponse> {
        self.ensure_user_exists(request.owner_id).await?;
        let saved = self
            .treatments
            .save(Treatment::from_request(request, Utc::now()))
            .await?;
        info!("Created treatment {} for user {}", saved.id, saved.owner_id);
        Ok(saved.into())
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<TreatmentResponse>> {
        Ok(to_responses(self.treatments.find_all().await?))
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<TreatmentResponse> {
        Ok(self.load(id).await?.into())
    }

    /// Unlike medications, a treatment may be handed to another existing user.
    pub async fn update(
        &self,
        id: i64,
        request: TreatmentRequest,
    ) -> ServiceResult<TreatmentResponse> {
        let current = self.load(id).await?;
        self.ensure_user_exists(request.owner_id).await?;
        let saved = self.treatments.save(current.with_changes(request)).await?;
        info!("Updated treatment {}", saved.id);
        Ok(saved.into())
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let treatment = self.load(id).await?;
        self.treatments.delete(treatment).await?;
        info!("Deleted treatment {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::ports::{MockTreatmentRepository, MockUserRepository};

    fn treatment(id: i64, owner_id: i64) -> Treatment {
        Treatment {
            id,
            name: "Flu".into(),
            description: "Seasonal flu".into(),
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(owner_id: i64) -> TreatmentRequest {
        TreatmentRequest {
            name: "Flu".into(),
            description: "Seasonal flu".into(),
            owner_id,
        }
    }

    fn users_with(existing: &'static [i64]) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |id| {
            Ok(existing.contains(&id).then(|| User {
                id,
                name: "Alex".into(),
                email: format!("user{id}@mail.com"),
                password_hash: None,
                age: 30,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });
        users
    }

    fn make_service(
        treatments: MockTreatmentRepository,
        users: MockUserRepository,
    ) -> TreatmentService {
        TreatmentService::new(Arc::new(treatments), Arc::new(users))
    }

    #[tokio::test]
    async fn create_links_owner() {
        let mut treatments = MockTreatmentRepository::new();
        treatments
            .expect_save()
            .times(1)
            .returning(|t| Ok(Treatment { id: 1, ..t }));

        let service = make_service(treatments, users_with(&[5]));
        let response = service.create(request(5)).await.expect("created");

        assert_eq!(response.id, 1);
        assert_eq!(response.owner_id, 5);
    }

    #[tokio::test]
    async fn create_rejects_unknown_owner() {
        let mut treatments = MockTreatmentRepository::new();
        treatments.expect_save().times(0);

        let service = make_service(treatments, users_with(&[]));
        let err = service.create(request(5)).await.expect_err("unknown");

        assert!(matches!(err, ServiceError::UserNotFound(5)));
    }

    #[tokio::test]
    async fn update_may_reassign_owner() {
        let mut treatments = MockTreatmentRepository::new();
        treatments
            .expect_find_by_id()
            .returning(|id| Ok(Some(treatment(id, 5))));
        treatments
            .expect_save()
            .withf(|t: &Treatment| t.id == 1 && t.owner_id == 6)
            .times(1)
            .returning(Ok);

        let service = make_service(treatments, users_with(&[5, 6]));
        let response = service.update(1, request(6)).await.expect("updated");

        assert_eq!(response.owner_id, 6);
    }

    #[tokio::test]
    async fn update_rejects_unknown_new_owner() {
        let mut treatments = MockTreatmentRepository::new();
        treatments
            .expect_find_by_id()
            .returning(|id| Ok(Some(treatment(id, 5))));
        treatments.expect_save().times(0);

        let service = make_service(treatments, users_with(&[5]));
        let err = service.update(1, request(8)).await.expect_err("unknown");

        assert!(matches!(err, ServiceError::UserNotFound(8)));
    }

    #[tokio::test]
    async fn missing_treatment_is_reported_without_mutation() {
        let mut treatments = MockTreatmentRepository::new();
        treatments.expect_find_by_id().returning(|_| Ok(None));
        treatments.expect_save().times(0);
        treatments.expect_delete().times(0);

        let service = make_service(treatments, users_with(&[5]));

        assert!(matches!(
            service.find_by_id(2).await,
            Err(ServiceError::TreatmentNotFound(2))
        ));
        assert!(matches!(
            service.update(2, request(5)).await,
            Err(ServiceError::TreatmentNotFound(2))
        ));
        assert!(matches!(
            service.delete(2).await,
            Err(ServiceError::TreatmentNotFound(2))
        ));
    }

    #[tokio::test]
    async fn find_all_maps_every_treatment() {
        let mut treatments = MockTreatmentRepository::new();
        treatments
            .expect_find_all()
            .returning(|| Ok(vec![treatment(1, 5), treatment(2, 6)]));

        let service = make_service(treatments, users_with(&[]));
        let list = service.find_all().await.expect("listed");

        assert_eq!(list.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
