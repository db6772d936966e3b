use crate::shared::{DomainError, PageRequest};

/// Largest offset or limit SQL backends bind (signed 64-bit).
pub const MAX_PAGE_VALUE: u64 = i64::MAX as u64;

/// Normalizes a raw offset/limit pair.
///
/// A missing limit falls back to `default_limit`, a limit above `max_limit`
/// is clamped. A zero limit and an offset above [`MAX_PAGE_VALUE`] are rejected.
pub fn validate_page_request(
    offset: Option<u64>,
    limit: Option<u64>,
    default_limit: u64,
    max_limit: u64,
) -> Result<PageRequest, DomainError> {
    let limit = limit.unwrap_or(default_limit);
    if limit == 0 {
        return Err(DomainError::Validation(
            "limit must be greater than zero".into(),
        ));
    }

    let offset = offset.unwrap_or(0);
    if offset > MAX_PAGE_VALUE {
        return Err(DomainError::Validation(format!(
            "offset must not exceed {}",
            MAX_PAGE_VALUE
        )));
    }

    let limit = limit.min(max_limit.max(1)).min(MAX_PAGE_VALUE);
    Ok(PageRequest::new(offset, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_missing() {
        let req = validate_page_request(None, None, 20, 100).unwrap();
        assert_eq!(req, PageRequest::new(0, 20));
    }

    #[test]
    fn limit_is_clamped() {
        let req = validate_page_request(Some(40), Some(1_000), 20, 100).unwrap();
        assert_eq!(req, PageRequest::new(40, 100));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = validate_page_request(Some(0), Some(0), 20, 100).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn offset_beyond_signed_range_is_rejected() {
        let err = validate_page_request(Some(u64::MAX), Some(5), 20, 100).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let req = validate_page_request(Some(MAX_PAGE_VALUE), Some(5), 20, 100).unwrap();
        assert_eq!(req.offset, MAX_PAGE_VALUE);
    }

    #[test]
    fn huge_configured_maximum_still_fits_sql() {
        let req = validate_page_request(None, Some(u64::MAX), 20, u64::MAX).unwrap();
        assert_eq!(req.limit, MAX_PAGE_VALUE);
    }
}
