//! # Office Service
//!
//! User management REST service: paginated listing, lookup, creation and
//! profile updates of users with role assignments.
//!
//! ## Architecture
//!
//! - **domain**: entities, repository traits and the error taxonomy
//! - **application**: `UserService` use cases and wire DTOs
//! - **infrastructure**: SeaORM database (entities, migrations, repositories) and in-memory stores
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime bootstrap and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{
    init_database, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider,
};

pub use interfaces::http::create_api_router;
