//! Domain layer: user and role aggregates plus the store contracts.

pub mod repositories;
pub mod role;
pub mod user;

pub use repositories::{DomainResult, RepositoryProvider};
pub use role::{Role, RoleRepository};
pub use user::{User, UserRepository};

pub use crate::shared::errors::{DomainError, ErrorCode};
