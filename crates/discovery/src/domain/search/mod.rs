//! Product search and completion.

pub mod backends;
pub mod documents;
pub mod errors;
pub mod index;
pub mod query;
pub mod results;
pub mod selector;
pub mod service;
pub mod sync;

pub use errors::{IndexSyncError, SearchIndexError, SearchServiceError};
pub use selector::{BackendSelector, LivenessProbe};
pub use service::{FallbackSearchService, MockSearchService, SearchService};
pub use sync::IndexSynchronizer;
