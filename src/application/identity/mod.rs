//! Identity module: user management
//!
//! Contains the `UserService` which orchestrates the user use-cases:
//! paging, lookup, creation, profile updates.

pub mod dto;
pub mod service;

pub use dto::{PaginatedRequestDto, PaginatedResponseDto, RoleDto, UserDto};
pub use service::UserService;
