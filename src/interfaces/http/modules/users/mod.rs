//! Users module: user management CRUD

pub mod handlers;

pub use handlers::*;
