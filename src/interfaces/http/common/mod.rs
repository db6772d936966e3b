pub mod extractors;
pub mod response;
pub mod validated_json;

pub use extractors::{ApiPath, ApiQuery};
pub use response::{status_for, ApiError, GenericResponseDto, HeaderDto};
pub use validated_json::ValidatedJson;
