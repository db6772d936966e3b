//! In-memory store implementations

mod memory;

pub use memory::{InMemoryRepositoryProvider, InMemoryRoleRepository, InMemoryUserRepository};
