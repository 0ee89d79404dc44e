//! Index Synchronizer
//!
//! The only writer of the search index. Keeps one document per active
//! product and none for inactive or missing ones.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{Span, info, warn};

use crate::domain::{
    catalog::{CatalogRepository, models::ProductId},
    search::{
        documents::SearchDocument,
        errors::IndexSyncError,
        index::{FailedDocument, SearchIndex, schema::index_definition},
    },
};

/// Documents sent per bulk request during a full resync.
pub const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// The product is active and its document was written.
    Indexed,
    /// The product is missing or inactive and its document was removed.
    Deleted,
}

/// Outcome of a full resync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncReport {
    /// Active products read from the record store.
    pub total: u64,
    pub indexed: u64,
    pub failed: Vec<FailedDocument>,
    /// Documents deleted because their product is no longer active.
    pub removed: u64,
}

#[derive(Clone)]
pub struct IndexSynchronizer {
    index: Arc<dyn SearchIndex>,
    catalog: Arc<dyn CatalogRepository>,
    batch_size: usize,
}

impl IndexSynchronizer {
    #[must_use]
    pub fn new(index: Arc<dyn SearchIndex>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self {
            index,
            catalog,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Creates the index with its mappings unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`IndexSyncError::Schema`] when the index is unreachable or
    /// rejects the mapping.
    #[tracing::instrument(name = "search.sync.ensure_schema", skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<SchemaStatus, IndexSyncError> {
        if self
            .index
            .index_exists()
            .await
            .map_err(IndexSyncError::Schema)?
        {
            return Ok(SchemaStatus::AlreadyExists);
        }

        self.index
            .create_index(&index_definition())
            .await
            .map_err(IndexSyncError::Schema)?;

        info!("created search index");

        Ok(SchemaStatus::Created)
    }

    /// Writes a document for every active product, in chunks, then deletes
    /// every document whose product is no longer active.
    ///
    /// Documents refused individually are reported, not retried. Chunks
    /// already written stay written when a later request fails.
    ///
    /// # Errors
    ///
    /// Returns an error when the record store cannot be read or a bulk
    /// request fails as a whole.
    #[tracing::instrument(
        name = "search.sync.resync_all",
        skip(self),
        fields(
            total = tracing::field::Empty,
            indexed = tracing::field::Empty,
            failed = tracing::field::Empty,
            removed = tracing::field::Empty
        ),
        err
    )]
    pub async fn resync_all(&self) -> Result<ResyncReport, IndexSyncError> {
        let products = self.catalog.list_active_products().await?;

        let mut report = ResyncReport {
            total: products.len() as u64,
            ..ResyncReport::default()
        };

        for chunk in products.chunks(self.batch_size) {
            let documents: Vec<SearchDocument> = chunk.iter().map(SearchDocument::from).collect();

            let outcome = self.index.bulk_index(&documents).await?;

            report.indexed += outcome.indexed;
            report.failed.extend(outcome.failed);
        }

        for failure in &report.failed {
            warn!(product_id = %failure.product_id, reason = %failure.reason, "document not indexed");
        }

        let active: FxHashSet<ProductId> =
            products.iter().map(|stored| stored.product.id).collect();

        for stale in self
            .index
            .document_ids()
            .await?
            .into_iter()
            .filter(|id| !active.contains(id))
        {
            if self.index.delete_document(stale).await? {
                report.removed += 1;
            }
        }

        let span = Span::current();

        span.record("total", report.total);
        span.record("indexed", report.indexed);
        span.record("failed", report.failed.len());
        span.record("removed", report.removed);

        info!(
            total = report.total,
            indexed = report.indexed,
            failed = report.failed.len(),
            removed = report.removed,
            "resynchronized search index"
        );

        Ok(report)
    }

    /// Re-projects one product, removing its document when it is no longer
    /// discoverable.
    ///
    /// # Errors
    ///
    /// Returns an error when the record store or the index fails.
    #[tracing::instrument(
        name = "search.sync.upsert_one",
        skip(self),
        fields(product_id = %product),
        err
    )]
    pub async fn upsert_one(&self, product: ProductId) -> Result<SyncAction, IndexSyncError> {
        let Some(catalog_product) = self.catalog.find_active_product(product).await? else {
            self.index.delete_document(product).await?;

            info!(product_id = %product, "removed document for undiscoverable product");

            return Ok(SyncAction::Deleted);
        };

        self.index
            .index_document(&SearchDocument::from(&catalog_product))
            .await?;

        info!(product_id = %product, "indexed product");

        Ok(SyncAction::Indexed)
    }

    /// Removes a product's document. Returns whether one was present.
    ///
    /// # Errors
    ///
    /// Returns an error when the index fails.
    #[tracing::instrument(
        name = "search.sync.delete_one",
        skip(self),
        fields(product_id = %product),
        err
    )]
    pub async fn delete_one(&self, product: ProductId) -> Result<bool, IndexSyncError> {
        Ok(self.index.delete_document(product).await?)
    }

    /// Number of documents currently in the index.
    ///
    /// # Errors
    ///
    /// Returns an error when the index fails.
    pub async fn document_count(&self) -> Result<u64, IndexSyncError> {
        Ok(self.index.count().await?)
    }
}
