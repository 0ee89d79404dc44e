//! Degraded backend over the record store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{
        catalog::CatalogRepository,
        search::{
            backends::{BackendKind, SearchBackend},
            documents::SearchDocument,
            errors::BackendError,
            query::{SearchQuery, SuggestQuery},
            results::{Highlights, SearchHit, SearchPage, Suggestion},
        },
    },
    pagination::Pagination,
};

/// Score given to every substring match, which carries no relevance signal.
pub const SUBSTRING_SCORE: f64 = 1.0;

/// Case-insensitive substring matching on the record store.
#[derive(Clone)]
pub struct SubstringBackend {
    catalog: Arc<dyn CatalogRepository>,
}

impl SubstringBackend {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl SearchBackend for SubstringBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Substring
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, BackendError> {
        let page = self.catalog.search_products(query).await?;

        let products = page
            .products
            .iter()
            .map(|product| {
                let document = SearchDocument::from(product);

                SearchHit {
                    highlights: Highlights::literal(&document),
                    product: document,
                    score: SUBSTRING_SCORE,
                }
            })
            .collect();

        Ok(SearchPage {
            products,
            pagination: Pagination::new(query.page(), page.total),
        })
    }

    async fn suggest(&self, query: &SuggestQuery) -> Result<Vec<Suggestion>, BackendError> {
        let names = self
            .catalog
            .suggest_names(query.prefix(), query.limit())
            .await?;

        Ok(names
            .into_iter()
            .map(|text| Suggestion {
                text,
                score: SUBSTRING_SCORE,
            })
            .collect())
    }
}
