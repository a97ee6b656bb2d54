//! Dose events ("takes") and the derived queries over them.
//!
//! A take has no direct user reference. Its owner is reached through
//! take -> treatment-medication link -> treatment -> owner.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::Take;
use crate::error::{ServiceError, ServiceResult};
use crate::mapping::to_responses;
use crate::models::{TakeRequest, TakeResponse};
use crate::ports::{TakeRepository, TreatmentMedicationRepository, TreatmentRepository};

#[derive(Clone)]
pub struct TakeService {
    takes: Arc<dyn TakeRepository>,
    links: Arc<dyn TreatmentMedicationRepository>,
    treatments: Arc<dyn TreatmentRepository>,
}

impl TakeService {
    pub fn new(
        takes: Arc<dyn TakeRepository>,
        links: Arc<dyn TreatmentMedicationRepository>,
        treatments: Arc<dyn TreatmentRepository>,
    ) -> Self {
        Self {
            takes,
            links,
            treatments,
        }
    }

    async fn load(&self, id: i64) -> ServiceResult<Take> {
        self.takes
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::TakeNotFound(id))
    }

    async fn ensure_link_exists(&self, treatment_medication_id: i64) -> ServiceResult<()> {
        match self.links.find_by_id(treatment_medication_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::TreatmentMedicationNotFound(
                treatment_medication_id,
            )),
        }
    }

    pub async fn create(&self, request: TakeRequest) -> ServiceResult<TakeResponse> {
        self.ensure_link_exists(request.treatment_medication_id)
            .await?;
        let saved = self
            .takes
            .save(Take::from_request(request, Utc::now()))
            .await?;
        info!(
            "Recorded take {} for treatment-medication link {}",
            saved.id, saved.treatment_medication_id
        );
        Ok(saved.into())
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<TakeResponse>> {
        Ok(to_responses(self.takes.find_all().await?))
    }

    /// Takes of one link. An unknown link id simply yields an empty list.
    pub async fn find_by_treatment_medication_id(
        &self,
        treatment_medication_id: i64,
    ) -> ServiceResult<Vec<TakeResponse>> {
        Ok(to_responses(
            self.takes
                .find_by_treatment_medication_id(treatment_medication_id)
                .await?,
        ))
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<TakeResponse> {
        Ok(self.load(id).await?.into())
    }

    /// Every take whose link belongs to a treatment owned by `user_id`, in store order.
    ///
    /// The user itself is not looked up: an unknown user and a user without
    /// takes both produce an empty list.
    pub async fn find_by_user_id(&self, user_id: i64) -> ServiceResult<Vec<TakeResponse>> {
        let mut owned = Vec::new();
        for treatment in self.treatments.find_by_owner_id(user_id).await? {
            for link in self.links.find_by_treatment_id(treatment.id).await? {
                owned.extend(
                    self.takes
                        .find_by_treatment_medication_id(link.id)
                        .await?,
                );
            }
        }
        owned.sort_by_key(|take| take.id);
        debug!("User {} owns {} takes", user_id, owned.len());
        Ok(to_responses(owned))
    }

    pub async fn update(&self, id: i64, request: TakeRequest) -> ServiceResult<TakeResponse> {
        let current = self.load(id).await?;
        self.ensure_link_exists(request.treatment_medication_id)
            .await?;
        let saved = self.takes.save(current.with_changes(request)).await?;
        info!("Updated take {}", saved.id);
        Ok(saved.into())
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let take = self.load(id).await?;
        self.takes.delete(take).await?;
        info!("Deleted take {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Treatment, TreatmentMedication};
    use crate::ports::{
        MockTakeRepository, MockTreatmentMedicationRepository, MockTreatmentRepository,
    };
    use chrono::{NaiveDate, NaiveDateTime};
    use mockall::predicate::eq;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    fn take(id: i64, treatment_medication_id: i64) -> Take {
        Take {
            id,
            treatment_medication_id,
            scheduled_at: at(8),
            taken_at: None,
            was_taken: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn link(id: i64, treatment_id: i64) -> TreatmentMedication {
        TreatmentMedication {
            id,
            treatment_id,
            medication_id: 1,
            dose: "500mg".into(),
            frequency_hours: 8,
            duration_days: 5,
            start_hour: "08:00".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

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

    fn request(treatment_medication_id: i64) -> TakeRequest {
        TakeRequest {
            treatment_medication_id,
            scheduled_at: at(8),
            taken_at: None,
            was_taken: false,
        }
    }

    /// Only link 1 exists.
    fn single_link() -> MockTreatmentMedicationRepository {
        let mut links = MockTreatmentMedicationRepository::new();
        links
            .expect_find_by_id()
            .returning(|id| Ok((id == 1).then(|| link(id, 1))));
        links
    }

    fn make_service(
        takes: MockTakeRepository,
        links: MockTreatmentMedicationRepository,
        treatments: MockTreatmentRepository,
    ) -> TakeService {
        TakeService::new(Arc::new(takes), Arc::new(links), Arc::new(treatments))
    }

    #[tokio::test]
    async fn create_records_pending_take() {
        let mut takes = MockTakeRepository::new();
        takes
            .expect_save()
            .withf(|t: &Take| t.taken_at.is_none() && !t.was_taken)
            .times(1)
            .returning(|t| Ok(Take { id: 1, ..t }));

        let service = make_service(takes, single_link(), MockTreatmentRepository::new());
        let response = service.create(request(1)).await.expect("created");

        assert_eq!(
            response,
            TakeResponse {
                id: 1,
                treatment_medication_id: 1,
                scheduled_at: at(8),
                taken_at: None,
                was_taken: false,
            }
        );
    }

    #[tokio::test]
    async fn create_requires_existing_link() {
        let mut takes = MockTakeRepository::new();
        takes.expect_save().times(0);

        let service = make_service(takes, single_link(), MockTreatmentRepository::new());
        let err = service.create(request(2)).await.expect_err("missing link");

        assert!(matches!(err, ServiceError::TreatmentMedicationNotFound(2)));
    }

    #[tokio::test]
    async fn find_by_treatment_medication_id_delegates_filter() {
        let mut takes = MockTakeRepository::new();
        takes
            .expect_find_by_treatment_medication_id()
            .with(eq(1))
            .returning(|id| Ok(vec![take(1, id), take(3, id)]));

        let service = make_service(takes, single_link(), MockTreatmentRepository::new());
        let list = service
            .find_by_treatment_medication_id(1)
            .await
            .expect("listed");

        assert_eq!(list.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn find_by_user_id_walks_treatments_and_links() {
        let mut treatments = MockTreatmentRepository::new();
        treatments
            .expect_find_by_owner_id()
            .with(eq(5))
            .returning(|owner| Ok(vec![treatment(1, owner), treatment(2, owner)]));
        let mut links = MockTreatmentMedicationRepository::new();
        links
            .expect_find_by_treatment_id()
            .returning(|treatment_id| {
                Ok(match treatment_id {
                    1 => vec![link(10, 1)],
                    2 => vec![link(20, 2), link(21, 2)],
                    _ => vec![],
                })
            });
        let mut takes = MockTakeRepository::new();
        takes
            .expect_find_by_treatment_medication_id()
            .returning(|link_id| {
                Ok(match link_id {
                    10 => vec![take(4, 10)],
                    20 => vec![take(2, 20)],
                    21 => vec![take(7, 21), take(9, 21)],
                    _ => vec![],
                })
            });

        let service = make_service(takes, links, treatments);
        let list = service.find_by_user_id(5).await.expect("listed");

        assert_eq!(
            list.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![2, 4, 7, 9]
        );
    }

    #[tokio::test]
    async fn find_by_user_id_is_empty_for_user_without_treatments() {
        let mut treatments = MockTreatmentRepository::new();
        treatments
            .expect_find_by_owner_id()
            .returning(|_| Ok(vec![]));
        let mut takes = MockTakeRepository::new();
        takes.expect_find_by_treatment_medication_id().times(0);

        let service = make_service(takes, MockTreatmentMedicationRepository::new(), treatments);
        let list = service.find_by_user_id(42).await.expect("empty");

        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn update_overwrites_all_fields() {
        let mut takes = MockTakeRepository::new();
        takes
            .expect_find_by_id()
            .returning(|id| Ok(Some(take(id, 1))));
        takes
            .expect_save()
            .withf(|t: &Take| t.id == 3 && t.was_taken && t.taken_at == Some(at(9)))
            .times(1)
            .returning(Ok);

        let service = make_service(takes, single_link(), MockTreatmentRepository::new());
        let changes = TakeRequest {
            taken_at: Some(at(9)),
            was_taken: true,
            ..request(1)
        };
        let response = service.update(3, changes).await.expect("updated");

        assert!(response.was_taken);
        assert_eq!(response.taken_at, Some(at(9)));
    }

    #[tokio::test]
    async fn update_requires_existing_take_and_link() {
        let mut takes = MockTakeRepository::new();
        takes
            .expect_find_by_id()
            .returning(|id| Ok((id == 3).then(|| take(id, 1))));
        takes.expect_save().times(0);

        let service = make_service(takes, single_link(), MockTreatmentRepository::new());

        assert!(matches!(
            service.update(8, request(1)).await,
            Err(ServiceError::TakeNotFound(8))
        ));
        assert!(matches!(
            service.update(3, request(2)).await,
            Err(ServiceError::TreatmentMedicationNotFound(2))
        ));
    }

    #[tokio::test]
    async fn delete_missing_take_does_not_mutate() {
        let mut takes = MockTakeRepository::new();
        takes.expect_find_by_id().returning(|_| Ok(None));
        takes.expect_delete().times(0);

        let service = make_service(takes, single_link(), MockTreatmentRepository::new());
        let err = service.delete(8).await.expect_err("missing");

        assert!(matches!(err, ServiceError::TakeNotFound(8)));
    }
}
