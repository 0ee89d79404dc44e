//! Interchangeable search backends.
//!
//! Every backend answers the same validated queries with the same result
//! shapes; the selector decides which one serves a request.

use std::fmt;

use async_trait::async_trait;
use mockall::automock;

use crate::domain::search::{
    errors::BackendError,
    query::{SearchQuery, SuggestQuery},
    results::{SearchPage, Suggestion},
};

pub mod fulltext;
pub mod substring;

pub use fulltext::FullTextBackend;
pub use substring::SubstringBackend;

/// Which backend produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Relevance-scored search on the secondary index.
    FullText,
    /// Substring matching on the record store.
    Substring,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FullText => "full_text",
            Self::Substring => "substring",
        })
    }
}

#[automock]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Runs a validated search.
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, BackendError>;

    /// Completes a validated prefix.
    async fn suggest(&self, query: &SuggestQuery) -> Result<Vec<Suggestion>, BackendError>;
}
