use async_trait::async_trait;

use super::User;
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Page of users ordered by ascending id, plus the total row count.
    async fn find_all(&self, request: PageRequest) -> DomainResult<PaginatedResult<User>>;

    /// Insert when `user.id` is `None`, otherwise update the row with that id.
    ///
    /// The user row and its role links are written atomically. Duplicate
    /// usernames/emails and unknown role ids are reported with the matching
    /// [`DomainError`](crate::domain::DomainError) variant.
    async fn save(&self, user: User) -> DomainResult<User>;
}
