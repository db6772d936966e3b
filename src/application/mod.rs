pub mod identity;

pub use identity::{PaginatedRequestDto, PaginatedResponseDto, RoleDto, UserDto, UserService};
