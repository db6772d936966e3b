use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, LoaderTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

use crate::domain::{DomainError, DomainResult, User, UserRepository};
use crate::infrastructure::database::entities::{role, user, user_role};
use crate::shared::{PageRequest, PaginatedResult};

use super::role_repository::role_model_to_domain;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_roles(&self, model: Option<user::Model>) -> DomainResult<Option<User>> {
        let Some(model) = model else {
            return Ok(None);
        };

        let roles = model
            .find_related(role::Entity)
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(Some(user_model_to_domain(model, roles)))
    }

    async fn find_one(&self, column: user::Column, value: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(column.eq(value))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        self.with_roles(model).await
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model, mut roles: Vec<role::Model>) -> User {
    roles.sort_by_key(|r| r.id);
    User {
        id: Some(model.id),
        username: model.username,
        email: model.email,
        name: model.name,
        last_name: model.last_name,
        roles: roles.into_iter().map(role_model_to_domain).collect(),
    }
}

fn db_err(e: DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

/// Maps constraint violations raised while writing `user` to business errors.
fn write_err(e: DbErr, user: &User) -> DomainError {
    match e.sql_err() {
        // SQLite names the column (`users.email`), Postgres the index
        // (`idx_users_email` in m20240101_000002_create_users); keep both containing "email".
        Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("email") => {
            DomainError::EmailAlreadyExists(user.email.clone())
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::UsernameAlreadyExists(user.username.clone())
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => DomainError::RolesNotFound(user.role_ids()),
        _ => db_err(e),
    }
}

/// Role ids from `ids` that have no row, in input order.
async fn missing_roles<C: ConnectionTrait>(conn: &C, ids: &[i32]) -> Result<Vec<i32>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found: Vec<i32> = role::Entity::find()
        .select_only()
        .column(role::Column::Id)
        .filter(role::Column::Id.is_in(ids.iter().copied()))
        .into_tuple::<i32>()
        .all(conn)
        .await?;

    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}

async fn link_roles<C: ConnectionTrait>(conn: &C, user_id: i32, role_ids: &[i32]) -> Result<(), DbErr> {
    if role_ids.is_empty() {
        return Ok(());
    }

    let links = role_ids.iter().map(|role_id| user_role::ActiveModel {
        user_id: Set(user_id),
        role_id: Set(*role_id),
    });

    user_role::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        self.with_roles(model).await
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        self.find_one(user::Column::Username, username).await
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        self.find_one(user::Column::Email, email).await
    }

    async fn find_all(&self, request: PageRequest) -> DomainResult<PaginatedResult<User>> {
        debug!(offset = request.offset, limit = request.limit, "Listing users");

        let total = user::Entity::find().count(&self.db).await.map_err(db_err)?;

        let models = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .offset(request.offset)
            .limit(request.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let roles = models
            .load_many_to_many(role::Entity, user_role::Entity, &self.db)
            .await
            .map_err(db_err)?;

        let items = models
            .into_iter()
            .zip(roles)
            .map(|(model, roles)| user_model_to_domain(model, roles))
            .collect();

        Ok(PaginatedResult::new(items, total, request))
    }

    async fn save(&self, user: User) -> DomainResult<User> {
        let role_ids = user.role_ids();
        let txn = self.db.begin().await.map_err(db_err)?;

        let missing = missing_roles(&txn, &role_ids).await.map_err(db_err)?;
        if !missing.is_empty() {
            return Err(DomainError::RolesNotFound(missing));
        }

        let model = match user.id {
            None => {
                let active = user::ActiveModel {
                    id: NotSet,
                    username: Set(user.username.clone()),
                    email: Set(user.email.clone()),
                    name: Set(user.name.clone()),
                    last_name: Set(user.last_name.clone()),
                };
                active.insert(&txn).await.map_err(|e| write_err(e, &user))?
            }
            Some(id) => {
                let existing = user::Entity::find_by_id(id)
                    .one(&txn)
                    .await
                    .map_err(db_err)?
                    .ok_or_else(|| DomainError::user_not_found(id))?;

                let mut active: user::ActiveModel = existing.into();
                active.username = Set(user.username.clone());
                active.email = Set(user.email.clone());
                active.name = Set(user.name.clone());
                active.last_name = Set(user.last_name.clone());
                let model = active.update(&txn).await.map_err(|e| write_err(e, &user))?;

                user_role::Entity::delete_many()
                    .filter(user_role::Column::UserId.eq(id))
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
                model
            }
        };

        link_roles(&txn, model.id, &role_ids)
            .await
            .map_err(|e| write_err(e, &user))?;

        txn.commit().await.map_err(db_err)?;

        let saved = self.with_roles(Some(model)).await?;
        saved.ok_or_else(|| DomainError::Storage("saved user could not be reloaded".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::infrastructure::database::test_database;

    fn role(id: i32) -> Role {
        Role {
            id,
            name: String::new(),
        }
    }

    fn new_user(username: &str, email: &str, roles: &[i32]) -> User {
        User {
            id: None,
            username: username.to_string(),
            email: email.to_string(),
            name: "John".to_string(),
            last_name: "Doe".to_string(),
            roles: roles.iter().copied().map(role).collect(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_links_roles() {
        let repo = SeaOrmUserRepository::new(test_database().await);

        let saved = repo
            .save(new_user("johndoe", "john.doe@example.com", &[3, 1]))
            .await
            .unwrap();

        let id = saved.id.expect("id assigned");
        let found = repo.find_by_id(id).await.unwrap().expect("stored user");
        assert_eq!(found.username, "johndoe");
        assert_eq!(found.role_ids(), vec![1, 3]);
        assert_eq!(found.roles[0].name, "ADMIN");
    }

    #[tokio::test]
    async fn lookups_by_username_and_email() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        repo.save(new_user("johndoe", "john.doe@example.com", &[1]))
            .await
            .unwrap();

        assert!(repo.find_by_username("johndoe").await.unwrap().is_some());
        assert!(repo.find_by_username("janedoe").await.unwrap().is_none());
        assert!(repo
            .find_by_email("john.doe@example.com")
            .await
            .unwrap()
            .is_some());
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicate_username() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        repo.save(new_user("johndoe", "a@example.com", &[]))
            .await
            .unwrap();

        let err = repo
            .save(new_user("johndoe", "b@example.com", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UsernameAlreadyExists(_)), "{err:?}");
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicate_email() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        repo.save(new_user("johndoe", "a@example.com", &[]))
            .await
            .unwrap();

        let err = repo
            .save(new_user("janedoe", "a@example.com", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmailAlreadyExists(_)), "{err:?}");
    }

    #[tokio::test]
    async fn update_into_taken_username_is_conflict() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        repo.save(new_user("alice", "alice@example.com", &[]))
            .await
            .unwrap();
        let mut bobby = repo
            .save(new_user("bobby", "bobby@example.com", &[]))
            .await
            .unwrap();

        bobby.username = "alice".into();
        let err = repo.save(bobby).await.unwrap_err();
        assert!(matches!(err, DomainError::UsernameAlreadyExists(ref name) if name == "alice"), "{err:?}");

        let stored = repo.find_by_username("bobby").await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn update_into_taken_email_is_conflict() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        repo.save(new_user("alice", "alice@example.com", &[]))
            .await
            .unwrap();
        let mut bobby = repo
            .save(new_user("bobby", "bobby@example.com", &[]))
            .await
            .unwrap();

        bobby.email = "alice@example.com".into();
        let err = repo.save(bobby).await.unwrap_err();
        assert!(matches!(err, DomainError::EmailAlreadyExists(ref email) if email == "alice@example.com"), "{err:?}");

        let stored = repo.find_by_email("bobby@example.com").await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn unknown_roles_abort_insert() {
        let repo = SeaOrmUserRepository::new(test_database().await);

        let err = repo
            .save(new_user("johndoe", "a@example.com", &[1, 98, 99]))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::RolesNotFound(ref ids) if ids == &vec![98, 99]));
        assert!(repo.find_by_username("johndoe").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_overwrites_fields() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        let mut saved = repo
            .save(new_user("johndoe", "a@example.com", &[2]))
            .await
            .unwrap();

        saved.username = "johnny".into();
        saved.last_name = "Smith".into();
        let updated = repo.save(saved.clone()).await.unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.username, "johnny");
        assert_eq!(updated.last_name, "Smith");
        assert_eq!(updated.role_ids(), vec![2]);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        let mut user = new_user("ghost", "ghost@example.com", &[]);
        user.id = Some(999_999);

        let err = repo.save(user).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn find_all_pages_by_ascending_id() {
        let repo = SeaOrmUserRepository::new(test_database().await);
        for i in 0..7 {
            repo.save(new_user(
                &format!("user{i}"),
                &format!("user{i}@example.com"),
                &[1, 2],
            ))
            .await
            .unwrap();
        }

        let first = repo.find_all(PageRequest::new(0, 5)).await.unwrap();
        assert_eq!(first.total, 7);
        assert_eq!(first.items.len(), 5);
        let ids: Vec<i32> = first.items.iter().filter_map(|u| u.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert!(first.items.iter().all(|u| u.role_ids() == vec![1, 2]));

        let rest = repo.find_all(PageRequest::new(5, 5)).await.unwrap();
        assert_eq!(rest.items.len(), 2);
        assert_eq!(rest.items[0].username, "user5");

        // Offsets that are not a multiple of the limit still slice correctly
        let odd = repo.find_all(PageRequest::new(3, 2)).await.unwrap();
        let names: Vec<&str> = odd.items.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["user3", "user4"]);
    }
}
