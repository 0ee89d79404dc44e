//! Search Service

use async_trait::async_trait;
use mockall::automock;
use tracing::{Span, info};

use crate::domain::search::{
    errors::SearchServiceError,
    query::{SearchRequest, SuggestRequest},
    results::{SearchPage, SuggestionPage},
    selector::BackendSelector,
};

#[automock]
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Ranked, filtered and paginated product search.
    async fn search(&self, request: SearchRequest) -> Result<SearchPage, SearchServiceError>;

    /// Completion suggestions for a typed prefix.
    async fn suggest(&self, request: SuggestRequest)
    -> Result<SuggestionPage, SearchServiceError>;
}

/// Search that prefers the full-text index and degrades to the record store.
#[derive(Clone)]
pub struct FallbackSearchService {
    selector: BackendSelector,
}

impl FallbackSearchService {
    #[must_use]
    pub fn new(selector: BackendSelector) -> Self {
        Self { selector }
    }
}

#[async_trait]
impl SearchService for FallbackSearchService {
    #[tracing::instrument(
        name = "search.service.search",
        skip(self, request),
        fields(
            query = %request.query,
            backend = tracing::field::Empty,
            total_items = tracing::field::Empty
        ),
        err
    )]
    async fn search(&self, request: SearchRequest) -> Result<SearchPage, SearchServiceError> {
        let query = request.validate()?;

        let routed = self.selector.search(&query).await?;

        let span = Span::current();

        span.record("backend", tracing::field::display(routed.backend));
        span.record(
            "total_items",
            tracing::field::display(routed.value.pagination.total_items),
        );

        info!(
            backend = %routed.backend,
            returned = routed.value.products.len(),
            "searched products"
        );

        Ok(routed.value)
    }

    #[tracing::instrument(
        name = "search.service.suggest",
        skip(self, request),
        fields(prefix = %request.query, backend = tracing::field::Empty),
        err
    )]
    async fn suggest(
        &self,
        request: SuggestRequest,
    ) -> Result<SuggestionPage, SearchServiceError> {
        let query = request.validate()?;

        let routed = self.selector.suggest(&query).await?;

        Span::current().record("backend", tracing::field::display(routed.backend));

        Ok(SuggestionPage::new(routed.value, query.limit()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        domain::{
            catalog::models::CategoryId,
            search::{
                backends::{FullTextBackend, MockSearchBackend, SubstringBackend},
                errors::SearchIndexError,
                index::{MockSearchIndex, SearchResponse},
                selector::MockLivenessProbe,
            },
            validation::ValidationError,
        },
        test::{fixtures::product, memory::MemoryStore},
    };

    use super::*;

    fn probe(alive: bool) -> Arc<MockLivenessProbe> {
        let mut probe = MockLivenessProbe::new();

        probe.expect_is_alive().return_const(alive);

        Arc::new(probe)
    }

    fn catalog() -> Arc<MemoryStore> {
        let store = MemoryStore::default();

        store.insert_product(
            product(1, "iPhone 15", 1, Decimal::from(999))
                .category_name("Phones")
                .views(50)
                .build(),
        );
        store.insert_product(
            product(2, "iPhone 15 Case", 2, Decimal::from(29))
                .category_name("Accessories")
                .views(10)
                .build(),
        );
        store.insert_product(
            product(3, "Desk Lamp", 3, Decimal::from(45))
                .category_name("Lighting")
                .views(5)
                .build(),
        );
        store.insert_product(
            product(4, "Phone Stand", 2, Decimal::from(15))
                .category_name("Accessories")
                .description("Holds any iPhone upright")
                .views(80)
                .build(),
        );

        Arc::new(store)
    }

    fn degraded_service(index: MockSearchIndex, store: Arc<MemoryStore>) -> FallbackSearchService {
        FallbackSearchService::new(BackendSelector::new(
            Arc::new(FullTextBackend::new(Arc::new(index))),
            Arc::new(SubstringBackend::new(store)),
            probe(false),
        ))
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_a_backend() -> TestResult {
        let mut primary = MockSearchBackend::new();
        let mut degraded = MockSearchBackend::new();
        let mut probe = MockLivenessProbe::new();

        primary.expect_search().never();
        degraded.expect_search().never();
        probe.expect_is_alive().never();

        let service = FallbackSearchService::new(BackendSelector::new(
            Arc::new(primary),
            Arc::new(degraded),
            Arc::new(probe),
        ));

        let result = service.search(SearchRequest::new("   ")).await;

        assert!(
            matches!(
                result,
                Err(SearchServiceError::Validation(ValidationError::EmptyQuery))
            ),
            "expected EmptyQuery, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn misspelling_finds_nothing_once_degraded() -> TestResult {
        let mut index = MockSearchIndex::new();

        index.expect_search().never();

        let service = degraded_service(index, catalog());

        let page = service.search(SearchRequest::new("iphnoe")).await?;

        assert!(page.products.is_empty());
        assert_eq!(page.pagination.total_items, 0);
        assert_eq!(page.pagination.total_pages, 0);

        Ok(())
    }

    #[tokio::test]
    async fn degraded_search_matches_name_description_and_category() -> TestResult {
        let service = degraded_service(MockSearchIndex::new(), catalog());

        let page = service.search(SearchRequest::new("IPHONE")).await?;

        let ids: Vec<i64> = page
            .products
            .iter()
            .map(|hit| hit.product.id.into_i64())
            .collect();

        assert_eq!(ids, vec![1, 2, 4], "relevance ties fall back to insertion order");
        assert!(page.products.iter().all(|hit| (hit.score - 1.0).abs() < f64::EPSILON));

        Ok(())
    }

    #[tokio::test]
    async fn both_paths_apply_the_same_filters() -> TestResult {
        let request = SearchRequest {
            category_id: Some(CategoryId::from_i64(2)),
            max_price: Some(Decimal::from(20)),
            ..SearchRequest::new("phone")
        };

        let mut index = MockSearchIndex::new();

        index
            .expect_search()
            .once()
            .withf(|body| {
                body["query"]["bool"]["filter"]
                    == json!([
                        { "term": { "isActive": true } },
                        { "term": { "categoryId": 2 } },
                        { "range": { "price": { "lte": 20.0 } } }
                    ])
            })
            .return_once(|_| Ok(SearchResponse::default()));

        let live = FallbackSearchService::new(BackendSelector::new(
            Arc::new(FullTextBackend::new(Arc::new(index))),
            Arc::new(SubstringBackend::new(catalog())),
            probe(true),
        ));

        live.search(request.clone()).await?;

        let degraded = degraded_service(MockSearchIndex::new(), catalog());
        let page = degraded.search(request).await?;

        let ids: Vec<i64> = page
            .products
            .iter()
            .map(|hit| hit.product.id.into_i64())
            .collect();

        assert_eq!(ids, vec![4]);

        Ok(())
    }

    #[tokio::test]
    async fn index_outage_after_probe_is_invisible_to_callers() -> TestResult {
        let mut index = MockSearchIndex::new();

        index.expect_search().once().return_once(|_| {
            Err(SearchIndexError::Status {
                operation: "search",
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: String::new(),
            })
        });

        let service = FallbackSearchService::new(BackendSelector::new(
            Arc::new(FullTextBackend::new(Arc::new(index))),
            Arc::new(SubstringBackend::new(catalog())),
            probe(true),
        ));

        let page = service.search(SearchRequest::new("lamp")).await?;

        assert_eq!(page.products.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn degraded_suggestions_are_a_single_page() -> TestResult {
        let service = degraded_service(MockSearchIndex::new(), catalog());

        let page = service
            .suggest(SuggestRequest {
                query: "phone".to_string(),
                limit: Some(5),
            })
            .await?;

        let texts: Vec<&str> = page
            .products
            .iter()
            .map(|suggestion| suggestion.text.as_str())
            .collect();

        assert_eq!(texts, vec!["Phone Stand", "iPhone 15", "iPhone 15 Case"]);
        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.pagination.items_per_page, 5);
        assert_eq!(page.pagination.total_items, 3);
        assert!(!page.pagination.has_next_page);

        Ok(())
    }
}
