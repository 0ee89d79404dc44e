//! Search errors.

use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::validation::ValidationError;

/// Failures talking to the secondary search index.
#[derive(Debug, Error)]
pub enum SearchIndexError {
    /// The index could not be reached in time.
    #[error("search index unavailable")]
    Unavailable(#[source] reqwest::Error),

    /// A transport or serialization error other than unreachability.
    #[error("search index request failed")]
    Http(#[source] reqwest::Error),

    /// The index answered with a non-success status.
    #[error("{operation} request failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The index answered with a body that could not be used.
    #[error("unexpected response from search index: {0}")]
    UnexpectedResponse(String),
}

impl SearchIndexError {
    /// Whether the index itself is down, as opposed to refusing the request.
    ///
    /// Only these failures are absorbed by the degraded backend.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            Self::Status { status, .. } => status.is_server_error(),
            Self::Http(_) | Self::UnexpectedResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for SearchIndexError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::Unavailable(error)
        } else {
            Self::Http(error)
        }
    }
}

/// Failures of a single search backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("search index error")]
    Index(#[from] SearchIndexError),

    #[error("storage error")]
    Store(#[source] sqlx::Error),
}

impl From<sqlx::Error> for BackendError {
    fn from(error: sqlx::Error) -> Self {
        Self::Store(error)
    }
}

#[derive(Debug, Error)]
pub enum SearchServiceError {
    #[error("invalid search request: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error")]
    Store(#[source] sqlx::Error),

    #[error("search index error")]
    Index(#[source] SearchIndexError),
}

impl From<BackendError> for SearchServiceError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Index(source) => Self::Index(source),
            BackendError::Store(source) => Self::Store(source),
        }
    }
}

#[derive(Debug, Error)]
pub enum IndexSyncError {
    #[error("failed to create search index schema")]
    Schema(#[source] SearchIndexError),

    #[error("search index error")]
    Index(#[from] SearchIndexError),

    #[error("storage error")]
    Store(#[source] sqlx::Error),
}

impl From<sqlx::Error> for IndexSyncError {
    fn from(error: sqlx::Error) -> Self {
        Self::Store(error)
    }
}
