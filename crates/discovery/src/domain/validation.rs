//! Input validation shared by the discovery services.
//!
//! Every check here runs before any store or index access.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::pagination::PageRequest;

/// Largest accepted search page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Deepest result position a search page may reach, matching the index's
/// default `max_result_window`.
pub const MAX_RESULT_WINDOW: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("search query must not be empty")]
    EmptyQuery,

    #[error("page must be at least 1")]
    InvalidPage,

    #[error("page reaches past the first {max} results")]
    PageTooDeep { max: u64 },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("price must not be negative")]
    NegativePrice,

    #[error("minimum price must not exceed maximum price")]
    InvertedPriceRange,

    #[error("rating must be between 0 and 5")]
    InvalidRating,

    #[error("unknown product status: {0}")]
    UnknownStatus(String),

    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("unknown sort direction: {0}")]
    UnknownSortDirection(String),

    #[error("ip address must not be empty")]
    MissingIpAddress,

    #[error("session id must not be empty")]
    MissingSessionId,
}

/// Validates a page number and a page size bounded by `max_per_page`.
///
/// # Errors
///
/// Returns an error when `page` is zero or `per_page` is outside
/// `1..=max_per_page`.
pub fn page_request(
    page: u32,
    per_page: u32,
    max_per_page: u32,
) -> Result<PageRequest, ValidationError> {
    if page == 0 {
        return Err(ValidationError::InvalidPage);
    }

    let per_page = bounded("limit", per_page, 1, max_per_page)?;

    Ok(PageRequest::new(page, per_page))
}

/// Checks that `value` lies in `min..=max`.
///
/// # Errors
///
/// Returns [`ValidationError::OutOfRange`] naming `field` otherwise.
pub fn bounded(field: &'static str, value: u32, min: u32, max: u32) -> Result<u32, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange { field, min, max })
    }
}

/// Checks that a rating lies in `0..=5`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidRating`] otherwise.
pub fn rating(value: Decimal) -> Result<Decimal, ValidationError> {
    if (Decimal::ZERO..=Decimal::from(5)).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::InvalidRating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_zero_is_rejected() {
        assert_eq!(page_request(0, 10, 100), Err(ValidationError::InvalidPage));
    }

    #[test]
    fn page_size_is_bounded() {
        assert!(page_request(1, 0, 100).is_err());
        assert!(page_request(1, 101, 100).is_err());
        assert!(page_request(1, 100, 100).is_ok());
    }

    #[test]
    fn rating_outside_zero_to_five_is_rejected() {
        assert!(rating(Decimal::new(-1, 1)).is_err());
        assert!(rating(Decimal::new(51, 1)).is_err());
        assert_eq!(rating(Decimal::new(45, 1)), Ok(Decimal::new(45, 1)));
    }
}
