//! Response Envelope
//!
//! Every discovery payload leaves the crate wrapped in an [`Envelope`].

use std::fmt::Display;

use serde::Serialize;

use crate::domain::{
    recommendations::RecommendationsServiceError, search::SearchServiceError,
    views::ViewsServiceError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: Some(error.into()),
        }
    }

    /// Wraps a service result. Failures carry the error's own display text as
    /// the diagnostic, never its source chain.
    pub fn from_result<E>(result: Result<T, E>) -> Self
    where
        E: Failure,
    {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::failure(error.summary(), error.to_string()),
        }
    }
}

/// A service error that can be reported to a caller.
pub trait Failure: Display {
    /// Short human-readable summary of what went wrong.
    fn summary(&self) -> &'static str;
}

impl Failure for SearchServiceError {
    fn summary(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid search request",
            Self::Store(_) | Self::Index(_) => "Search failed",
        }
    }
}

impl Failure for RecommendationsServiceError {
    fn summary(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid recommendation request",
            Self::NotFound => "Product not found",
            Self::InvalidState => "Product cannot be used for recommendations",
            Self::Store(_) => "Failed to load similar products",
        }
    }
}

impl Failure for ViewsServiceError {
    fn summary(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid view request",
            Self::NotFound => "Product not found",
            Self::Store(_) => "Failed to process product views",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::domain::validation::ValidationError;

    use super::*;

    #[test]
    fn success_omits_message_and_error() -> TestResult {
        let envelope = Envelope::ok(json!({ "productId": 3 }));

        assert_eq!(
            serde_json::to_value(&envelope)?,
            json!({ "success": true, "data": { "productId": 3 } })
        );

        Ok(())
    }

    #[test]
    fn failure_omits_data() -> TestResult {
        let result: Result<u32, ViewsServiceError> = Err(ViewsServiceError::NotFound);

        assert_eq!(
            serde_json::to_value(Envelope::from_result(result))?,
            json!({
                "success": false,
                "message": "Product not found",
                "error": "product not found"
            })
        );

        Ok(())
    }

    #[test]
    fn validation_failures_name_the_problem() {
        let result: Result<u32, SearchServiceError> =
            Err(ValidationError::EmptyQuery.into());

        let envelope = Envelope::from_result(result);

        assert!(!envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("Invalid search request"));
        assert_eq!(
            envelope.error.as_deref(),
            Some("invalid search request: search query must not be empty")
        );
    }

    #[test]
    fn storage_failures_hide_the_source() {
        let result: Result<u32, RecommendationsServiceError> =
            Err(RecommendationsServiceError::Store(sqlx::Error::PoolTimedOut));

        let envelope = Envelope::from_result(result);

        assert_eq!(envelope.error.as_deref(), Some("storage error"));
    }
}
