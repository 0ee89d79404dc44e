//! Views Service

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use serde::Deserialize;
use tracing::{Span, debug, info};

use crate::{
    domain::{
        catalog::CatalogRepository,
        validation::{self, MAX_PAGE_SIZE, ValidationError},
        views::{
            errors::ViewsServiceError,
            identity::Identity,
            models::{
                HistoryPage, HistoryRecords, NewViewEvent, RecordOutcome, TrackedView, UserId,
                ViewRequest, ViewStats,
            },
            repository::ViewsRepository,
        },
    },
    pagination::{PageRequest, Pagination},
};

/// History entries per page when the caller does not supply a limit.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Statistics window when the caller does not supply one.
pub const DEFAULT_STATS_DAYS: u32 = 30;

/// Longest accepted statistics window.
pub const MAX_STATS_DAYS: u32 = 365;

/// Number of most-viewed products reported in statistics.
pub const TOP_PRODUCTS: u32 = 5;

/// Time windows governing deduplication and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingPolicy {
    /// Repeat views by the same visitor inside this window are not counted.
    pub dedup_window: SignedDuration,
    pub user_history_window: SignedDuration,
    pub guest_history_window: SignedDuration,
}

impl Default for TrackingPolicy {
    fn default() -> Self {
        Self {
            dedup_window: SignedDuration::from_secs(10),
            user_history_window: days(30),
            guest_history_window: days(7),
        }
    }
}

/// Page selection for history listings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl HistoryQuery {
    fn validate(self) -> Result<PageRequest, ValidationError> {
        validation::page_request(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            MAX_PAGE_SIZE,
        )
    }
}

#[automock]
#[async_trait]
pub trait ViewsService: Send + Sync {
    /// Records a product view unless it repeats the visitor's own most recent
    /// view of that product inside the dedup window.
    async fn track_view(
        &self,
        request: ViewRequest,
        point_in_time: Timestamp,
    ) -> Result<TrackedView, ViewsServiceError>;

    /// Products a user viewed recently, newest first, one entry per product.
    async fn user_history(
        &self,
        user: UserId,
        query: HistoryQuery,
        point_in_time: Timestamp,
    ) -> Result<HistoryPage, ViewsServiceError>;

    /// Products viewed anonymously in a session, newest first, one entry per
    /// product.
    async fn guest_history(
        &self,
        session: String,
        query: HistoryQuery,
        point_in_time: Timestamp,
    ) -> Result<HistoryPage, ViewsServiceError>;

    /// Deletes a user's view history, returning the number of events removed.
    async fn clear_history(&self, user: UserId) -> Result<u64, ViewsServiceError>;

    /// View statistics for one user over the last `days` days.
    async fn user_stats(
        &self,
        user: UserId,
        days: Option<u32>,
        point_in_time: Timestamp,
    ) -> Result<ViewStats, ViewsServiceError>;

    /// View statistics across all visitors over the last `days` days.
    async fn global_stats(
        &self,
        days: Option<u32>,
        point_in_time: Timestamp,
    ) -> Result<ViewStats, ViewsServiceError>;
}

#[derive(Clone)]
pub struct TrackingViewsService {
    catalog: Arc<dyn CatalogRepository>,
    views: Arc<dyn ViewsRepository>,
    policy: TrackingPolicy,
}

impl TrackingViewsService {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        views: Arc<dyn ViewsRepository>,
        policy: TrackingPolicy,
    ) -> Self {
        Self {
            catalog,
            views,
            policy,
        }
    }

    async fn stats(
        &self,
        user: Option<UserId>,
        days: Option<u32>,
        point_in_time: Timestamp,
    ) -> Result<ViewStats, ViewsServiceError> {
        let days = validation::bounded(
            "days",
            days.unwrap_or(DEFAULT_STATS_DAYS),
            1,
            MAX_STATS_DAYS,
        )?;

        let since = window_start(point_in_time, self::days(days));

        let counts = self.views.view_counts(user, since, TOP_PRODUCTS).await?;

        Ok(ViewStats::new(counts, days))
    }
}

#[async_trait]
impl ViewsService for TrackingViewsService {
    #[tracing::instrument(
        name = "views.service.track_view",
        skip(self, request),
        fields(
            product_id = %request.product_id,
            authenticated = request.user_id.is_some(),
            is_new_view = tracing::field::Empty
        ),
        err
    )]
    async fn track_view(
        &self,
        request: ViewRequest,
        point_in_time: Timestamp,
    ) -> Result<TrackedView, ViewsServiceError> {
        let ip_address = request.ip_address.trim();

        if ip_address.is_empty() {
            return Err(ValidationError::MissingIpAddress.into());
        }

        let identity = Identity::resolve(&request);
        let product = request.product_id;

        self.catalog
            .find_active_product(product)
            .await?
            .ok_or(ViewsServiceError::NotFound)?;

        let event = NewViewEvent {
            user_id: request.user_id,
            product_id: product,
            ip_address: ip_address.to_string(),
            user_agent: request.user_agent.trim().to_string(),
            session_id: request
                .session_id
                .map(|session| session.trim().to_string())
                .filter(|session| !session.is_empty()),
            viewed_at: point_in_time,
        };

        let outcome = self
            .views
            .record_view(
                event,
                &identity,
                window_start(point_in_time, self.policy.dedup_window),
            )
            .await?;

        let tracked = match outcome {
            RecordOutcome::Recorded(event) => {
                info!(product_id = %product, view_id = %event.id, "recorded product view");

                TrackedView {
                    view_id: Some(event.id),
                    product_id: product,
                    is_new_view: true,
                }
            }
            RecordOutcome::Duplicate(previous) => {
                debug!(product_id = %product, previous_view_id = %previous.id, "suppressed duplicate view");

                TrackedView {
                    view_id: None,
                    product_id: product,
                    is_new_view: false,
                }
            }
        };

        Span::current().record("is_new_view", tracked.is_new_view);

        Ok(tracked)
    }

    #[tracing::instrument(
        name = "views.service.user_history",
        skip(self, query),
        fields(user_id = %user),
        err
    )]
    async fn user_history(
        &self,
        user: UserId,
        query: HistoryQuery,
        point_in_time: Timestamp,
    ) -> Result<HistoryPage, ViewsServiceError> {
        let page = query.validate()?;
        let since = window_start(point_in_time, self.policy.user_history_window);

        let records = self.views.user_history(user, since, page).await?;

        Ok(history_page(records, page))
    }

    #[tracing::instrument(name = "views.service.guest_history", skip_all, err)]
    async fn guest_history(
        &self,
        session: String,
        query: HistoryQuery,
        point_in_time: Timestamp,
    ) -> Result<HistoryPage, ViewsServiceError> {
        let session = session.trim();

        if session.is_empty() {
            return Err(ValidationError::MissingSessionId.into());
        }

        let page = query.validate()?;
        let since = window_start(point_in_time, self.policy.guest_history_window);

        let records = self.views.guest_history(session, since, page).await?;

        Ok(history_page(records, page))
    }

    #[tracing::instrument(
        name = "views.service.clear_history",
        skip(self),
        fields(user_id = %user),
        err
    )]
    async fn clear_history(&self, user: UserId) -> Result<u64, ViewsServiceError> {
        let removed = self.views.clear_user_history(user).await?;

        info!(user_id = %user, removed, "cleared view history");

        Ok(removed)
    }

    #[tracing::instrument(
        name = "views.service.user_stats",
        skip(self),
        fields(user_id = %user),
        err
    )]
    async fn user_stats(
        &self,
        user: UserId,
        days: Option<u32>,
        point_in_time: Timestamp,
    ) -> Result<ViewStats, ViewsServiceError> {
        self.stats(Some(user), days, point_in_time).await
    }

    #[tracing::instrument(name = "views.service.global_stats", skip(self), err)]
    async fn global_stats(
        &self,
        days: Option<u32>,
        point_in_time: Timestamp,
    ) -> Result<ViewStats, ViewsServiceError> {
        self.stats(None, days, point_in_time).await
    }
}

fn history_page(records: HistoryRecords, page: PageRequest) -> HistoryPage {
    HistoryPage {
        history: records.entries,
        pagination: Pagination::new(page, records.total),
    }
}

fn window_start(point_in_time: Timestamp, window: SignedDuration) -> Timestamp {
    point_in_time.checked_sub(window).unwrap_or(Timestamp::MIN)
}

const fn days(count: u32) -> SignedDuration {
    SignedDuration::from_hours(count as i64 * 24)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::{catalog::MockCatalogRepository, views::MockViewsRepository},
        test::{fixtures::product, memory::MemoryStore},
    };

    use super::*;

    fn at(timestamp: &str) -> TestResult<Timestamp> {
        Ok(timestamp.parse()?)
    }

    fn store() -> Arc<MemoryStore> {
        let store = MemoryStore::default();

        store.insert_product(product(1, "Desk Lamp", 1, Decimal::from(45)).build());
        store.insert_product(product(2, "Desk", 1, Decimal::from(300)).build());
        store.insert_product(product(3, "Chair", 1, Decimal::from(120)).build());
        store.insert_product(
            product(4, "Retired Lamp", 1, Decimal::from(20))
                .inactive()
                .build(),
        );

        Arc::new(store)
    }

    fn service(store: &Arc<MemoryStore>) -> TrackingViewsService {
        TrackingViewsService::new(
            Arc::clone(store) as Arc<dyn CatalogRepository>,
            Arc::clone(store) as Arc<dyn ViewsRepository>,
            TrackingPolicy::default(),
        )
    }

    fn visit(product: i64, user: Option<i64>, ip_address: &str, user_agent: &str) -> ViewRequest {
        ViewRequest {
            product_id: product.into(),
            user_id: user.map(UserId::from_i64),
            ip_address: ip_address.to_string(),
            user_agent: user_agent.to_string(),
            session_id: Some("session-1".to_string()),
        }
    }

    #[tokio::test]
    async fn repeat_view_inside_window_is_not_counted() -> TestResult {
        let store = store();
        let service = service(&store);

        let first = service
            .track_view(visit(1, Some(7), "10.0.0.1", "Firefox"), at("2026-03-01T12:00:00Z")?)
            .await?;
        let second = service
            .track_view(visit(1, Some(7), "10.0.0.2", "Safari"), at("2026-03-01T12:00:05Z")?)
            .await?;

        assert!(first.is_new_view);
        assert!(first.view_id.is_some());
        assert!(!second.is_new_view);
        assert_eq!(second.view_id, None);
        assert_eq!(store.view_events().len(), 1);
        assert_eq!(store.product_views(1), 1);

        Ok(())
    }

    #[tokio::test]
    async fn repeat_view_after_window_is_counted() -> TestResult {
        let store = store();
        let service = service(&store);

        service
            .track_view(visit(1, None, "10.0.0.1", "Firefox"), at("2026-03-01T12:00:00Z")?)
            .await?;
        let second = service
            .track_view(visit(1, None, "10.0.0.1", "Firefox"), at("2026-03-01T12:00:11Z")?)
            .await?;

        assert!(second.is_new_view);
        assert_eq!(store.view_events().len(), 2);
        assert_eq!(store.product_views(1), 2);

        Ok(())
    }

    #[tokio::test]
    async fn interleaved_visitor_resets_duplicate_detection() -> TestResult {
        let store = store();
        let service = service(&store);

        let a = || visit(1, None, "10.0.0.1", "Firefox");
        let b = || visit(1, None, "10.0.0.2", "Firefox");

        let results = [
            service.track_view(a(), at("2026-03-01T12:00:00Z")?).await?,
            service.track_view(b(), at("2026-03-01T12:00:02Z")?).await?,
            service.track_view(a(), at("2026-03-01T12:00:04Z")?).await?,
        ];

        assert!(results.iter().all(|tracked| tracked.is_new_view));
        assert_eq!(store.product_views(1), 3);

        Ok(())
    }

    #[tokio::test]
    async fn other_products_do_not_suppress_a_view() -> TestResult {
        let store = store();
        let service = service(&store);

        service
            .track_view(visit(1, Some(7), "10.0.0.1", "Firefox"), at("2026-03-01T12:00:00Z")?)
            .await?;
        let other = service
            .track_view(visit(2, Some(7), "10.0.0.1", "Firefox"), at("2026-03-01T12:00:01Z")?)
            .await?;

        assert!(other.is_new_view);

        Ok(())
    }

    #[tokio::test]
    async fn missing_ip_is_rejected_before_store_access() -> TestResult {
        let mut catalog = MockCatalogRepository::new();
        let mut views = MockViewsRepository::new();

        catalog.expect_find_active_product().never();
        views.expect_record_view().never();

        let service = TrackingViewsService::new(
            Arc::new(catalog),
            Arc::new(views),
            TrackingPolicy::default(),
        );

        let result = service
            .track_view(visit(1, None, "  ", "Firefox"), at("2026-03-01T12:00:00Z")?)
            .await;

        assert!(
            matches!(
                result,
                Err(ViewsServiceError::Validation(ValidationError::MissingIpAddress))
            ),
            "expected MissingIpAddress, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn inactive_product_is_not_found() -> TestResult {
        let store = store();

        let result = service(&store)
            .track_view(visit(4, None, "10.0.0.1", "Firefox"), at("2026-03-01T12:00:00Z")?)
            .await;

        assert!(
            matches!(result, Err(ViewsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
        assert!(store.view_events().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn user_history_collapses_to_latest_view_per_product() -> TestResult {
        let store = store();
        let service = service(&store);

        for (product, timestamp) in [
            (3, "2026-01-10T09:00:00Z"),
            (1, "2026-02-25T09:00:00Z"),
            (2, "2026-02-26T09:00:00Z"),
            (1, "2026-02-28T09:00:00Z"),
        ] {
            service
                .track_view(visit(product, Some(7), "10.0.0.1", "Firefox"), at(timestamp)?)
                .await?;
        }

        let page = service
            .user_history(
                UserId::from_i64(7),
                HistoryQuery::default(),
                at("2026-03-01T12:00:00Z")?,
            )
            .await?;

        let products: Vec<i64> = page
            .history
            .iter()
            .map(|entry| entry.product.id.into_i64())
            .collect();

        assert_eq!(products, vec![1, 2], "product 3 fell outside the 30 day window");
        assert_eq!(
            page.history.first().map(|entry| entry.viewed_at),
            Some(at("2026-02-28T09:00:00Z")?)
        );
        assert_eq!(page.pagination.total_items, 2);

        Ok(())
    }

    #[tokio::test]
    async fn guest_history_ignores_signed_in_views() -> TestResult {
        let store = store();
        let service = service(&store);

        service
            .track_view(visit(1, None, "10.0.0.1", "Firefox"), at("2026-02-28T09:00:00Z")?)
            .await?;
        service
            .track_view(visit(2, Some(7), "10.0.0.1", "Firefox"), at("2026-02-28T10:00:00Z")?)
            .await?;

        let page = service
            .guest_history(
                "session-1".to_string(),
                HistoryQuery::default(),
                at("2026-03-01T12:00:00Z")?,
            )
            .await?;

        let products: Vec<i64> = page
            .history
            .iter()
            .map(|entry| entry.product.id.into_i64())
            .collect();

        assert_eq!(products, vec![1]);

        Ok(())
    }

    #[tokio::test]
    async fn clearing_history_removes_only_that_user() -> TestResult {
        let store = store();
        let service = service(&store);

        service
            .track_view(visit(1, Some(7), "10.0.0.1", "Firefox"), at("2026-02-28T09:00:00Z")?)
            .await?;
        service
            .track_view(visit(2, Some(7), "10.0.0.1", "Firefox"), at("2026-02-28T09:01:00Z")?)
            .await?;
        service
            .track_view(visit(1, Some(8), "10.0.0.1", "Firefox"), at("2026-02-28T09:02:00Z")?)
            .await?;

        assert_eq!(service.clear_history(UserId::from_i64(7)).await?, 2);
        assert_eq!(store.view_events().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn stats_report_totals_top_products_and_days() -> TestResult {
        let store = store();
        let service = service(&store);

        for (product, user, timestamp) in [
            (1, 7, "2026-02-27T09:00:00Z"),
            (1, 7, "2026-02-28T09:00:00Z"),
            (2, 7, "2026-02-28T23:59:59Z"),
            (1, 8, "2026-02-28T10:00:00Z"),
            (3, 7, "2025-12-01T10:00:00Z"),
        ] {
            service
                .track_view(visit(product, Some(user), "10.0.0.1", "Firefox"), at(timestamp)?)
                .await?;
        }

        let now = at("2026-03-01T12:00:00Z")?;

        let mine = service
            .user_stats(UserId::from_i64(7), Some(7), now)
            .await?;

        assert_eq!(mine.total_views, 3);
        assert_eq!(mine.unique_products, 2);
        assert_eq!(mine.window_days, 7);
        assert_eq!(
            mine.top_products
                .iter()
                .map(|top| (top.product_id.into_i64(), top.views))
                .collect::<Vec<_>>(),
            vec![(1, 2), (2, 1)]
        );
        assert_eq!(
            mine.daily_views
                .iter()
                .map(|day| (day.date.to_string(), day.views))
                .collect::<Vec<_>>(),
            vec![("2026-02-27".to_string(), 1), ("2026-02-28".to_string(), 2)]
        );

        let everyone = service.global_stats(None, now).await?;

        assert_eq!(everyone.total_views, 4);
        assert_eq!(everyone.window_days, DEFAULT_STATS_DAYS);

        Ok(())
    }

    #[tokio::test]
    async fn stats_window_is_bounded() -> TestResult {
        let mut views = MockViewsRepository::new();

        views.expect_view_counts().never();

        let service = TrackingViewsService::new(
            Arc::new(MockCatalogRepository::new()),
            Arc::new(views),
            TrackingPolicy::default(),
        );

        let result = service
            .global_stats(Some(366), at("2026-03-01T12:00:00Z")?)
            .await;

        assert!(
            matches!(
                result,
                Err(ViewsServiceError::Validation(ValidationError::OutOfRange {
                    field: "days",
                    ..
                }))
            ),
            "expected OutOfRange, got {result:?}"
        );

        Ok(())
    }
}
