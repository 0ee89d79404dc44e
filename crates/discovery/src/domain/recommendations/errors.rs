//! Recommendation errors.

use sqlx::Error;
use thiserror::Error;

use crate::domain::validation::ValidationError;

#[derive(Debug, Error)]
pub enum RecommendationsServiceError {
    #[error("invalid recommendation request: {0}")]
    Validation(#[from] ValidationError),

    #[error("product not found")]
    NotFound,

    /// The seed cannot anchor a price band.
    #[error("product has no positive price")]
    InvalidState,

    #[error("storage error")]
    Store(#[source] Error),
}

impl From<Error> for RecommendationsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Store(error)
    }
}
