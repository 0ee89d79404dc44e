//! Secondary search index (Elasticsearch).

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

use crate::domain::{
    catalog::models::ProductId,
    search::{documents::SearchDocument, errors::SearchIndexError},
};

pub mod client;
pub mod query_builder;
pub mod response;
pub mod schema;

pub use client::{ElasticsearchClient, ElasticsearchConfig};
pub use response::{BulkOutcome, FailedDocument, SearchResponse};

#[automock]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Whether the configured index exists.
    async fn index_exists(&self) -> Result<bool, SearchIndexError>;

    /// Creates the configured index with the given settings and mappings.
    async fn create_index(&self, definition: &Value) -> Result<(), SearchIndexError>;

    /// Writes documents keyed by product id, replacing any existing ones.
    async fn bulk_index(
        &self,
        documents: &[SearchDocument],
    ) -> Result<BulkOutcome, SearchIndexError>;

    /// Writes one document keyed by its product id.
    async fn index_document(&self, document: &SearchDocument) -> Result<(), SearchIndexError>;

    /// Product ids of every stored document, ascending.
    async fn document_ids(&self) -> Result<Vec<ProductId>, SearchIndexError>;

    /// Removes a document. Returns `false` when it was not present.
    async fn delete_document(&self, product: ProductId) -> Result<bool, SearchIndexError>;

    /// Executes a search request body.
    async fn search(&self, body: &Value) -> Result<SearchResponse, SearchIndexError>;

    /// Number of documents in the index.
    async fn count(&self) -> Result<u64, SearchIndexError>;
}
