//! User lifecycle: email uniqueness on registration and credential hashing.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::User;
use crate::error::{ServiceError, ServiceResult};
use crate::mapping::to_responses;
use crate::models::{UserRequest, UserResponse};
use crate::ports::{CredentialHasher, UserRepository};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    /// Hashes `password` unless it is missing or blank.
    fn hash_supplied(&self, password: Option<&str>) -> ServiceResult<Option<String>> {
        match password {
            Some(plaintext) if !plaintext.trim().is_empty() => {
                Ok(Some(self.hasher.hash(plaintext)?))
            }
            _ => Ok(None),
        }
    }

    async fn load(&self, id: i64) -> ServiceResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::UserNotFound(id))
    }

    pub async fn create(&self, request: UserRequest) -> ServiceResult<UserResponse> {
        if self.users.exists_by_email(&request.email).await? {
            warn!("Rejected registration: email {} already in use", request.email);
            return Err(ServiceError::EmailAlreadyExists(request.email));
        }

        let password_hash = self.hash_supplied(request.password.as_deref())?;
        let user = User::from_request(request, password_hash, Utc::now());
        let saved = self.users.save(user).await?;
        info!("Created user {}", saved.id);
        Ok(saved.into())
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<UserResponse>> {
        Ok(to_responses(self.users.find_all().await?))
    }

    pub async fn find_by_id(&self, id: i64) -> ServiceResult<UserResponse> {
        Ok(self.load(id).await?.into())
    }

    /// Overwrites name, email and age. The password is re-hashed only when a
    /// non-blank one is supplied. Email uniqueness is not re-checked here.
    pub async fn update(&self, id: i64, request: UserRequest) -> ServiceResult<UserResponse> {
        let current = self.load(id).await?;
        let password_hash = self.hash_supplied(request.password.as_deref())?;
        let saved = self
            .users
            .save(current.with_changes(request, password_hash))
            .await?;
        info!("Updated user {}", saved.id);
        Ok(saved.into())
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let user = self.load(id).await?;
        self.users.delete(user).await?;
        info!("Deleted user {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockCredentialHasher, MockUserRepository};
    use mockall::predicate::eq;

    fn request(password: Option<&str>) -> UserRequest {
        UserRequest {
            name: "Alex".into(),
            email: "alex@mail.com".into(),
            age: 30,
            password: password.map(str::to_string),
        }
    }

    fn stored(id: i64) -> User {
        User {
            id,
            name: "Alex".into(),
            email: "alex@mail.com".into(),
            password_hash: Some("hashed:old".into()),
            age: 30,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn prefixing_hasher() -> MockCredentialHasher {
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .returning(|plaintext| Ok(format!("hashed:{plaintext}")));
        hasher
    }

    fn make_service(users: MockUserRepository, hasher: MockCredentialHasher) -> UserService {
        UserService::new(Arc::new(users), Arc::new(hasher))
    }

    #[tokio::test]
    async fn create_hashes_password_and_persists() {
        let mut users = MockUserRepository::new();
        users
            .expect_exists_by_email()
            .withf(|email: &str| email == "alex@mail.com")
            .times(1)
            .returning(|_| Ok(false));
        users
            .expect_save()
            .withf(|user: &User| user.password_hash.as_deref() == Some("hashed:secret"))
            .times(1)
            .returning(|user| Ok(User { id: 1, ..user }));

        let service = make_service(users, prefixing_hasher());
        let response = service.create(request(Some("secret"))).await.expect("created");

        assert_eq!(
            response,
            UserResponse {
                id: 1,
                name: "Alex".into(),
                email: "alex@mail.com".into(),
                age: 30,
            }
        );
    }

    #[tokio::test]
    async fn create_without_password_stores_no_hash() {
        let mut users = MockUserRepository::new();
        users.expect_exists_by_email().returning(|_| Ok(false));
        users
            .expect_save()
            .withf(|user: &User| user.password_hash.is_none())
            .times(1)
            .returning(|user| Ok(User { id: 1, ..user }));
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().times(0);

        let service = make_service(users, hasher);
        service.create(request(None)).await.expect("created");
    }

    #[tokio::test]
    async fn create_rejects_registered_email() {
        let mut users = MockUserRepository::new();
        users.expect_exists_by_email().returning(|_| Ok(true));
        users.expect_save().times(0);

        let service = make_service(users, prefixing_hasher());
        let err = service.create(request(Some("secret"))).await.expect_err("conflict");

        assert!(
            matches!(err, ServiceError::EmailAlreadyExists(ref email) if email == "alex@mail.com")
        );
    }

    #[tokio::test]
    async fn find_by_id_reports_missing_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().with(eq(9)).returning(|_| Ok(None));

        let service = make_service(users, prefixing_hasher());
        let err = service.find_by_id(9).await.expect_err("missing");

        assert!(matches!(err, ServiceError::UserNotFound(9)));
    }

    #[tokio::test]
    async fn update_with_blank_password_keeps_existing_hash() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id))));
        users
            .expect_save()
            .withf(|user: &User| {
                user.name == "B" && user.password_hash.as_deref() == Some("hashed:old")
            })
            .times(1)
            .returning(Ok);
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().times(0);

        let service = make_service(users, hasher);
        let mut changes = request(Some("   "));
        changes.name = "B".into();
        let response = service.update(1, changes).await.expect("updated");

        assert_eq!(response.name, "B");
    }

    #[tokio::test]
    async fn update_rehashes_new_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id))));
        users
            .expect_save()
            .withf(|user: &User| user.password_hash.as_deref() == Some("hashed:new"))
            .times(1)
            .returning(Ok);

        let service = make_service(users, prefixing_hasher());
        service.update(1, request(Some("new"))).await.expect("updated");
    }

    #[tokio::test]
    async fn update_does_not_recheck_email_uniqueness() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id))));
        users.expect_exists_by_email().times(0);
        users.expect_save().times(1).returning(Ok);

        let service = make_service(users, prefixing_hasher());
        let changes = UserRequest {
            name: "B".into(),
            email: "existing-other-user-email".into(),
            age: 30,
            password: None,
        };
        let response = service.update(1, changes).await.expect("updated");

        assert_eq!(response.email, "existing-other-user-email");
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_user_do_not_mutate() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        users.expect_save().times(0);
        users.expect_delete().times(0);

        let service = make_service(users, prefixing_hasher());

        let err = service.update(3, request(None)).await.expect_err("missing");
        assert!(matches!(err, ServiceError::UserNotFound(3)));
        let err = service.delete(3).await.expect_err("missing");
        assert!(matches!(err, ServiceError::UserNotFound(3)));
    }

    #[tokio::test]
    async fn delete_removes_existing_user() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id))));
        users
            .expect_delete()
            .withf(|user: &User| user.id == 5)
            .times(1)
            .returning(|_| Ok(()));

        let service = make_service(users, prefixing_hasher());
        service.delete(5).await.expect("deleted");
    }
}
