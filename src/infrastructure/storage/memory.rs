//! In-memory storage implementation

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{
    DomainError, DomainResult, RepositoryProvider, Role, RoleRepository, User, UserRepository,
};
use crate::infrastructure::database::migrator::DEFAULT_ROLES;
use crate::shared::{PageRequest, PaginatedResult};

/// In-memory user store for development and testing.
///
/// Mirrors the uniqueness and role-existence rules of the database schema.
pub struct InMemoryUserRepository {
    users: DashMap<i32, User>,
    roles: DashMap<i32, Role>,
    user_counter: AtomicI32,
}

/// In-memory role store
pub struct InMemoryRoleRepository {
    roles: DashMap<i32, Role>,
}

/// Repository provider over shared in-memory maps
pub struct InMemoryRepositoryProvider {
    users: InMemoryUserRepository,
    roles: InMemoryRoleRepository,
}

impl InMemoryRepositoryProvider {
    /// Empty store seeded with the default roles.
    pub fn new() -> Self {
        let roles = DashMap::new();
        for (id, name) in DEFAULT_ROLES {
            roles.insert(
                id,
                Role {
                    id,
                    name: name.to_string(),
                },
            );
        }

        Self {
            users: InMemoryUserRepository {
                users: DashMap::new(),
                roles: roles.clone(),
                user_counter: AtomicI32::new(1),
            },
            roles: InMemoryRoleRepository { roles },
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.users.len()
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn roles(&self) -> &dyn RoleRepository {
        &self.roles
    }
}

impl InMemoryUserRepository {
    fn find_by(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users
            .iter()
            .find(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
    }

    fn check_unique(&self, user: &User) -> DomainResult<()> {
        let other = |u: &User| u.id != user.id;
        if self.find_by(|u| other(u) && u.username == user.username).is_some() {
            return Err(DomainError::UsernameAlreadyExists(user.username.clone()));
        }
        if self.find_by(|u| other(u) && u.email == user.email).is_some() {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        Ok(())
    }

    fn resolve_roles(&self, user: &User) -> DomainResult<Vec<Role>> {
        let ids = user.role_ids();
        let missing: Vec<i32> = ids
            .iter()
            .copied()
            .filter(|id| !self.roles.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::RolesNotFound(missing));
        }

        Ok(ids
            .iter()
            .filter_map(|id| self.roles.get(id).map(|r| r.value().clone()))
            .collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self.find_by(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self.find_by(|u| u.email == email))
    }

    async fn find_all(&self, request: PageRequest) -> DomainResult<PaginatedResult<User>> {
        let mut all: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|u| u.id);

        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(usize::try_from(request.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(request.limit).unwrap_or(usize::MAX))
            .collect();

        Ok(PaginatedResult::new(items, total, request))
    }

    async fn save(&self, mut user: User) -> DomainResult<User> {
        let roles = self.resolve_roles(&user)?;

        if let Some(id) = user.id {
            if !self.users.contains_key(&id) {
                return Err(DomainError::user_not_found(id));
            }
        }
        self.check_unique(&user)?;

        let id = match user.id {
            Some(id) => id,
            None => self.user_counter.fetch_add(1, Ordering::SeqCst),
        };
        user.id = Some(id);
        user.roles = roles;

        self.users.insert(id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Role>> {
        Ok(self.roles.get(&id).map(|r| r.value().clone()))
    }
}
