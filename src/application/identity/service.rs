//! User management service: application-layer orchestration
//!
//! All user-related business logic lives here.
//! HTTP handlers should be thin wrappers that delegate to this service.
//!
//! The uniqueness and role-existence checks in [`UserService::create`] are
//! best-effort: two concurrent creates can both pass them. The unique indexes
//! and foreign keys behind [`UserRepository::save`](crate::domain::UserRepository::save)
//! decide, and report the same error variants.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::dto::{PaginatedRequestDto, PaginatedResponseDto, UserDto};
use crate::config::PaginationConfig;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::validate_page_request;

fn record_outcome<T>(operation: &'static str, result: &DomainResult<T>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.code().as_str(),
    };
    metrics::counter!("user_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

/// Orchestrates the user-management use-cases.
pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    pagination: PaginationConfig,
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, pagination: PaginationConfig) -> Self {
        Self { repos, pagination }
    }

    // ── Queries ─────────────────────────────────────────────────

    /// One page of users ordered by id.
    pub async fn find_users(
        &self,
        request: PaginatedRequestDto,
    ) -> DomainResult<PaginatedResponseDto<UserDto>> {
        debug!(?request, "find_users");

        let page = validate_page_request(
            request.offset,
            request.limit,
            self.pagination.default_limit,
            self.pagination.max_limit,
        )?;

        let result = self.repos.users().find_all(page).await?;

        Ok(PaginatedResponseDto {
            page: page.page_index(),
            limit: page.limit,
            total: result.total,
            data: result.items.into_iter().map(UserDto::from).collect(),
        })
    }

    /// A missing user is `Ok(None)`, not an error.
    pub async fn find(&self, id: i32) -> DomainResult<Option<UserDto>> {
        let user = self.repos.users().find_by_id(id).await?;
        Ok(user.map(UserDto::from))
    }

    pub async fn exist_username(&self, username: &str) -> DomainResult<bool> {
        Ok(self.repos.users().find_by_username(username).await?.is_some())
    }

    pub async fn exist_email(&self, email: &str) -> DomainResult<bool> {
        Ok(self.repos.users().find_by_email(email).await?.is_some())
    }

    pub async fn does_role_exist(&self, role_id: i32) -> DomainResult<bool> {
        Ok(self.repos.roles().find_by_id(role_id).await?.is_some())
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Create a user.
    ///
    /// Checks run in order: username, email, then every referenced role.
    /// All missing role ids are reported together. Nothing is written
    /// unless every check passes.
    pub async fn create(&self, dto: UserDto) -> DomainResult<UserDto> {
        let result = self.create_inner(dto).await;
        record_outcome("create", &result);
        result
    }

    async fn create_inner(&self, dto: UserDto) -> DomainResult<UserDto> {
        if self.exist_username(&dto.username).await? {
            warn!(username = %dto.username, "Create rejected: username taken");
            return Err(DomainError::UsernameAlreadyExists(dto.username));
        }

        if self.exist_email(&dto.email).await? {
            warn!(email = %dto.email, "Create rejected: email taken");
            return Err(DomainError::EmailAlreadyExists(dto.email));
        }

        let mut missing = Vec::new();
        for role in &dto.roles {
            if !missing.contains(&role.id) && !self.does_role_exist(role.id).await? {
                missing.push(role.id);
            }
        }
        if !missing.is_empty() {
            warn!(?missing, "Create rejected: unknown roles");
            return Err(DomainError::RolesNotFound(missing));
        }

        let saved = self.repos.users().save(dto.into_new_user()).await?;

        info!(user_id = ?saved.id, username = %saved.username, "User created");
        Ok(UserDto::from(saved))
    }

    /// Overwrite username, email, name and last name of an existing user.
    ///
    /// Role associations are left as stored.
    pub async fn update(&self, dto: UserDto) -> DomainResult<bool> {
        let result = self.update_inner(dto).await;
        record_outcome("update", &result);
        result
    }

    async fn update_inner(&self, dto: UserDto) -> DomainResult<bool> {
        let id = dto
            .id
            .ok_or_else(|| DomainError::Validation("id is required for update".into()))?;

        let mut user = self
            .repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        user.username = dto.username;
        user.email = dto.email;
        user.name = dto.name;
        user.last_name = dto.last_name;

        self.repos.users().save(user).await?;

        info!(user_id = id, "User updated");
        Ok(true)
    }

    /// Deleting users is not supported; always fails.
    pub async fn delete(&self, id: i32) -> DomainResult<bool> {
        warn!(user_id = id, "Delete requested but not supported");
        let result: DomainResult<bool> = Err(DomainError::Unsupported("delete user"));
        record_outcome("delete", &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::identity::dto::RoleDto;
    use crate::domain::ErrorCode;
    use crate::infrastructure::InMemoryRepositoryProvider;

    fn service() -> (UserService, Arc<InMemoryRepositoryProvider>) {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let service = UserService::new(repos.clone(), PaginationConfig::default());
        (service, repos)
    }

    fn user_dto(username: &str, email: &str, roles: &[i32]) -> UserDto {
        UserDto {
            id: None,
            username: username.to_string(),
            email: email.to_string(),
            name: "John".to_string(),
            last_name: "Doe".to_string(),
            roles: roles.iter().copied().map(RoleDto::new).collect(),
        }
    }

    #[tokio::test]
    async fn create_with_one_role_returns_generated_id() {
        let (service, _) = service();

        let created = service
            .create(user_dto("JohnDoe", "john.doe@example.com", &[1]))
            .await
            .unwrap();

        let id = created.id.expect("id populated");
        let found = service.find(id).await.unwrap().expect("retrievable");
        assert_eq!(found.username, "JohnDoe");
        assert_eq!(found.roles.len(), 1);
        assert_eq!(found.roles[0].id, 1);
    }

    #[tokio::test]
    async fn create_with_many_roles_keeps_all_roles() {
        let (service, _) = service();

        let created = service
            .create(user_dto("JohnDoe", "john.doe@example.com", &[1, 2, 3]))
            .await
            .unwrap();

        let found = service.find(created.id.unwrap()).await.unwrap().unwrap();
        let ids: Vec<i32> = found.roles.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn create_ignores_client_supplied_id() {
        let (service, _) = service();
        let mut dto = user_dto("JohnDoe", "john.doe@example.com", &[]);
        dto.id = Some(500);

        let created = service.create(dto).await.unwrap();
        assert_ne!(created.id, Some(500));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_without_write() {
        let (service, repos) = service();
        service
            .create(user_dto("johndoe", "johndoe@example.com", &[1]))
            .await
            .unwrap();

        let err = service
            .create(user_dto("johndoe", "other@example.com", &[1]))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::UsernameAlreadyExists);
        assert_eq!(repos.user_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (service, repos) = service();
        service
            .create(user_dto("johndoe", "johndoe@example.com", &[1]))
            .await
            .unwrap();

        let err = service
            .create(user_dto("janedoe", "johndoe@example.com", &[1]))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::EmailAlreadyExists);
        assert_eq!(repos.user_count(), 1);
    }

    #[tokio::test]
    async fn username_check_runs_before_email_check() {
        let (service, _) = service();
        service
            .create(user_dto("johndoe", "johndoe@example.com", &[1]))
            .await
            .unwrap();

        let err = service
            .create(user_dto("johndoe", "johndoe@example.com", &[1]))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::UsernameAlreadyExists);
    }

    #[tokio::test]
    async fn every_missing_role_is_reported() {
        let (service, repos) = service();

        let err = service
            .create(user_dto("JohnDoe", "john.doe@example.com", &[1, 99, 98, 99]))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::RoleNotFound);
        assert!(matches!(err, DomainError::RolesNotFound(ref ids) if ids == &vec![99, 98]));
        assert_eq!(repos.user_count(), 0);
    }

    #[tokio::test]
    async fn find_missing_user_is_none() {
        let (service, _) = service();
        assert!(service.find(999_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_user_is_office_not_found() {
        let (service, _) = service();
        let mut dto = user_dto("ghost", "ghost@example.com", &[]);
        dto.id = Some(999_999);

        let err = service.update(dto).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::OfficeNotFound);
    }

    #[tokio::test]
    async fn update_without_id_is_invalid() {
        let (service, _) = service();
        let err = service
            .update(user_dto("ghost", "ghost@example.com", &[]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn update_overwrites_fields_but_not_roles() {
        let (service, _) = service();
        let created = service
            .create(user_dto("johndoe", "johndoe@example.com", &[1, 2]))
            .await
            .unwrap();

        let changes = UserDto {
            id: created.id,
            username: "johnny".into(),
            email: "johnny@example.com".into(),
            name: "Johnny".into(),
            last_name: "Smith".into(),
            roles: vec![RoleDto::new(3)],
        };
        assert!(service.update(changes).await.unwrap());

        let found = service.find(created.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.username, "johnny");
        assert_eq!(found.email, "johnny@example.com");
        assert_eq!(found.name, "Johnny");
        assert_eq!(found.last_name, "Smith");
        let role_ids: Vec<i32> = found.roles.iter().map(|r| r.id).collect();
        assert_eq!(role_ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn find_users_pages_in_id_order() {
        let (service, _) = service();
        for i in 0..8 {
            service
                .create(user_dto(
                    &format!("user{i}"),
                    &format!("user{i}@example.com"),
                    &[3],
                ))
                .await
                .unwrap();
        }

        let page = service
            .find_users(PaginatedRequestDto::new(0, 5))
            .await
            .unwrap();

        assert_eq!(page.total, 8);
        assert_eq!(page.limit, 5);
        assert_eq!(page.page, 0);
        assert_eq!(page.data.len(), 5);
        let ids: Vec<i32> = page.data.iter().filter_map(|u| u.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));

        let second = service
            .find_users(PaginatedRequestDto::new(5, 5))
            .await
            .unwrap();
        assert_eq!(second.page, 1);
        assert_eq!(second.data.len(), 3);
    }

    #[tokio::test]
    async fn find_users_honours_unaligned_offset() {
        let (service, _) = service();
        for i in 0..4 {
            service
                .create(user_dto(
                    &format!("user{i}"),
                    &format!("user{i}@example.com"),
                    &[],
                ))
                .await
                .unwrap();
        }

        let page = service
            .find_users(PaginatedRequestDto::new(1, 2))
            .await
            .unwrap();
        let names: Vec<&str> = page.data.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["user1", "user2"]);
    }

    #[tokio::test]
    async fn find_users_rejects_zero_limit() {
        let (service, _) = service();
        let err = service
            .find_users(PaginatedRequestDto::new(0, 0))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn delete_is_unsupported() {
        let (service, _) = service();
        let created = service
            .create(user_dto("johndoe", "johndoe@example.com", &[]))
            .await
            .unwrap();

        let err = service.delete(created.id.unwrap()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedOperation);
        assert!(service.find(created.id.unwrap()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn existence_predicates() {
        let (service, _) = service();
        service
            .create(user_dto("johndoe", "johndoe@example.com", &[]))
            .await
            .unwrap();

        assert!(service.exist_username("johndoe").await.unwrap());
        assert!(!service.exist_username("janedoe").await.unwrap());
        assert!(service.exist_email("johndoe@example.com").await.unwrap());
        assert!(!service.exist_email("jane@example.com").await.unwrap());
        assert!(service.does_role_exist(2).await.unwrap());
        assert!(!service.does_role_exist(99).await.unwrap());
    }
}
