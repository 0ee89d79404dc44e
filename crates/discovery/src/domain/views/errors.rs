//! View tracking errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ViewsServiceError {
    #[error("invalid view request: {0}")]
    Validation(#[from] ValidationError),

    #[error("product not found")]
    NotFound,

    #[error("storage error")]
    Store(#[source] Error),
}

impl From<Error> for ViewsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound,
            _ => Self::Store(error),
        }
    }
}
