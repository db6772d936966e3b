//! Role aggregate (read-only for this service)

pub mod model;
pub mod repository;

pub use model::Role;
pub use repository::RoleRepository;
