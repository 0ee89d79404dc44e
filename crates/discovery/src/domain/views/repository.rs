//! Views Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    domain::{
        catalog::models::{CatalogProduct, ProductId, ProductSummary},
        views::{
            identity::Identity,
            models::{
                DailyViews, HistoryEntry, HistoryRecords, NewViewEvent, RecordOutcome,
                TopViewedProduct, UserId, ViewCounts, ViewEvent, ViewEventId,
            },
        },
    },
    pagination::PageRequest,
};

const LOCK_PRODUCT_VIEWS_SQL: &str = include_str!("sql/lock_product_views.sql");
const FIND_RECENT_VIEW_SQL: &str = include_str!("sql/find_recent_view.sql");
const INSERT_VIEW_SQL: &str = include_str!("sql/insert_view.sql");
const INCREMENT_PRODUCT_VIEWS_SQL: &str = include_str!("sql/increment_product_views.sql");
const USER_HISTORY_SQL: &str = include_str!("sql/user_history.sql");
const COUNT_USER_HISTORY_SQL: &str = include_str!("sql/count_user_history.sql");
const GUEST_HISTORY_SQL: &str = include_str!("sql/guest_history.sql");
const COUNT_GUEST_HISTORY_SQL: &str = include_str!("sql/count_guest_history.sql");
const DELETE_USER_VIEWS_SQL: &str = include_str!("sql/delete_user_views.sql");
const VIEW_TOTALS_SQL: &str = include_str!("sql/view_totals.sql");
const TOP_VIEWED_PRODUCTS_SQL: &str = include_str!("sql/top_viewed_products.sql");
const DAILY_VIEWS_SQL: &str = include_str!("sql/daily_views.sql");

#[automock]
#[async_trait]
pub trait ViewsRepository: Send + Sync {
    /// Stores `event` and increments the product's view counter, unless the
    /// most recent view of the product since `window_start` belongs to
    /// `identity`.
    ///
    /// Concurrent calls for the same product are serialized.
    async fn record_view(
        &self,
        event: NewViewEvent,
        identity: &Identity,
        window_start: Timestamp,
    ) -> Result<RecordOutcome, sqlx::Error>;

    /// A user's viewed products since `since`, one entry per product, newest first.
    async fn user_history(
        &self,
        user: UserId,
        since: Timestamp,
        page: PageRequest,
    ) -> Result<HistoryRecords, sqlx::Error>;

    /// Anonymous views in a session since `since`, one entry per product,
    /// newest first.
    async fn guest_history(
        &self,
        session: &str,
        since: Timestamp,
        page: PageRequest,
    ) -> Result<HistoryRecords, sqlx::Error>;

    /// Deletes every view recorded for `user`, returning how many were removed.
    async fn clear_user_history(&self, user: UserId) -> Result<u64, sqlx::Error>;

    /// Aggregates since `since`, for one user or across everyone.
    async fn view_counts(
        &self,
        user: Option<UserId>,
        since: Timestamp,
        top: u32,
    ) -> Result<ViewCounts, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgViewsRepository {
    pool: PgPool,
}

impl PgViewsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn history(
        &self,
        (list_sql, count_sql): (&'static str, &'static str),
        key: HistoryKey<'_>,
        since: Timestamp,
        page: PageRequest,
    ) -> Result<HistoryRecords, sqlx::Error> {
        let offset = i64::try_from(page.offset()).map_err(|e| decode_error("offset", e))?;

        let (count, list) = match key {
            HistoryKey::User(user) => (
                query(count_sql).bind(user.into_i64()),
                query(list_sql).bind(user.into_i64()),
            ),
            HistoryKey::Session(session) => {
                (query(count_sql).bind(session), query(list_sql).bind(session))
            }
        };

        let mut tx = self.pool.begin().await?;

        // Count and page must observe the same snapshot.
        query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let total: i64 = count
            .bind(SqlxTimestamp::from(since))
            .fetch_one(&mut *tx)
            .await?
            .try_get(0)?;

        let entries = list
            .bind(SqlxTimestamp::from(since))
            .bind(i64::from(page.per_page()))
            .bind(offset)
            .try_map(|row: PgRow| history_entry(&row))
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(HistoryRecords {
            entries,
            total: u64::try_from(total).map_err(|e| decode_error("count", e))?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum HistoryKey<'a> {
    User(UserId),
    Session(&'a str),
}

#[async_trait]
impl ViewsRepository for PgViewsRepository {
    async fn record_view(
        &self,
        event: NewViewEvent,
        identity: &Identity,
        window_start: Timestamp,
    ) -> Result<RecordOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Serializes check-then-insert per product until commit.
        query(LOCK_PRODUCT_VIEWS_SQL)
            .bind(event.product_id.into_i64())
            .execute(&mut *tx)
            .await?;

        let latest = query_as::<Postgres, ViewEvent>(FIND_RECENT_VIEW_SQL)
            .bind(event.product_id.into_i64())
            .bind(SqlxTimestamp::from(window_start))
            .bind(SqlxTimestamp::from(event.viewed_at))
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(latest) = latest
            && identity.matches(&latest)
        {
            tx.commit().await?;

            return Ok(RecordOutcome::Duplicate(latest));
        }

        let recorded = query_as::<Postgres, ViewEvent>(INSERT_VIEW_SQL)
            .bind(event.user_id.map(UserId::into_i64))
            .bind(event.product_id.into_i64())
            .bind(&event.ip_address)
            .bind(&event.user_agent)
            .bind(event.session_id.as_deref())
            .bind(SqlxTimestamp::from(event.viewed_at))
            .fetch_one(&mut *tx)
            .await?;

        let updated = query(INCREMENT_PRODUCT_VIEWS_SQL)
            .bind(event.product_id.into_i64())
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() != 1 {
            return Err(sqlx::Error::RowNotFound);
        }

        tx.commit().await?;

        Ok(RecordOutcome::Recorded(recorded))
    }

    async fn user_history(
        &self,
        user: UserId,
        since: Timestamp,
        page: PageRequest,
    ) -> Result<HistoryRecords, sqlx::Error> {
        self.history(
            (USER_HISTORY_SQL, COUNT_USER_HISTORY_SQL),
            HistoryKey::User(user),
            since,
            page,
        )
        .await
    }

    async fn guest_history(
        &self,
        session: &str,
        since: Timestamp,
        page: PageRequest,
    ) -> Result<HistoryRecords, sqlx::Error> {
        self.history(
            (GUEST_HISTORY_SQL, COUNT_GUEST_HISTORY_SQL),
            HistoryKey::Session(session),
            since,
            page,
        )
        .await
    }

    async fn clear_user_history(&self, user: UserId) -> Result<u64, sqlx::Error> {
        let result = query(DELETE_USER_VIEWS_SQL)
            .bind(user.into_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn view_counts(
        &self,
        user: Option<UserId>,
        since: Timestamp,
        top: u32,
    ) -> Result<ViewCounts, sqlx::Error> {
        let user = user.map(UserId::into_i64);

        let mut tx = self.pool.begin().await?;

        query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let totals = query(VIEW_TOTALS_SQL)
            .bind(user)
            .bind(SqlxTimestamp::from(since))
            .fetch_one(&mut *tx)
            .await?;

        let top_products = query(TOP_VIEWED_PRODUCTS_SQL)
            .bind(user)
            .bind(SqlxTimestamp::from(since))
            .bind(i64::from(top))
            .try_map(|row: PgRow| {
                Ok(TopViewedProduct {
                    product_id: ProductId::from_i64(row.try_get("product_id")?),
                    name: row.try_get("name")?,
                    views: count_column(&row, "views")?,
                })
            })
            .fetch_all(&mut *tx)
            .await?;

        let daily_views = query(DAILY_VIEWS_SQL)
            .bind(user)
            .bind(SqlxTimestamp::from(since))
            .try_map(|row: PgRow| {
                Ok(DailyViews {
                    date: row.try_get::<SqlxDate, _>("day")?.to_jiff(),
                    views: count_column(&row, "views")?,
                })
            })
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ViewCounts {
            total_views: count_column(&totals, "total_views")?,
            unique_products: count_column(&totals, "unique_products")?,
            top_products,
            daily_views,
        })
    }
}

fn history_entry(row: &PgRow) -> sqlx::Result<HistoryEntry> {
    let product = CatalogProduct::from_row(row)?;

    Ok(HistoryEntry {
        product: ProductSummary::from(&product),
        viewed_at: row.try_get::<SqlxTimestamp, _>("last_viewed_at")?.to_jiff(),
    })
}

fn count_column(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    let count: i64 = row.try_get(column)?;

    u64::try_from(count).map_err(|e| decode_error(column, e))
}

fn decode_error<E>(index: &str, source: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(source),
    }
}

impl<'r> FromRow<'r, PgRow> for ViewEvent {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let user_id: Option<i64> = row.try_get("user_id")?;

        Ok(Self {
            id: ViewEventId::from_i64(row.try_get("id")?),
            user_id: user_id.map(UserId::from_i64),
            product_id: ProductId::from_i64(row.try_get("product_id")?),
            ip_address: row.try_get("ip_address")?,
            user_agent: row.try_get("user_agent")?,
            session_id: row.try_get("session_id")?,
            viewed_at: row.try_get::<SqlxTimestamp, _>("viewed_at")?.to_jiff(),
        })
    }
}
