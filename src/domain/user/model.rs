use crate::domain::Role;

/// Stored user.
///
/// `id` is `None` until the store assigns one on first save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<i32>,
    pub username: String,
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub roles: Vec<Role>,
}

impl User {
    pub fn role_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.roles.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
