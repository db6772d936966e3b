use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::domain::{DomainError, DomainResult, Role, RoleRepository};
use crate::infrastructure::database::entities::role;

pub struct SeaOrmRoleRepository {
    db: DatabaseConnection,
}

impl SeaOrmRoleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn role_model_to_domain(model: role::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
    }
}

#[async_trait]
impl RoleRepository for SeaOrmRoleRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Role>> {
        let model = role::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        Ok(model.map(role_model_to_domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::migrator::DEFAULT_ROLES;
    use crate::infrastructure::database::test_database;

    #[tokio::test]
    async fn seeded_roles_are_found() {
        let repo = SeaOrmRoleRepository::new(test_database().await);

        for (id, name) in DEFAULT_ROLES {
            let role = repo.find_by_id(id).await.unwrap().expect("seeded role");
            assert_eq!(role.name, name);
        }
    }

    #[tokio::test]
    async fn unknown_role_is_absent() {
        let repo = SeaOrmRoleRepository::new(test_database().await);
        assert!(repo.find_by_id(99).await.unwrap().is_none());
    }
}
