//! Catalog Repository
//!
//! Read-side adapter over the primary record store. Every query is scoped to
//! active products and joins the owning category.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{
    FromRow, PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, query, query_as, query_scalar,
};

use crate::domain::{
    catalog::models::{
        CatalogPage, CatalogProduct, Category, CategoryId, Product, ProductId, ProductStatus,
    },
    recommendations::models::SimilarityCriteria,
    search::query::{SearchFilter, SearchQuery, SortDirection, SortField},
};

const SELECT_CATALOG_PRODUCTS_SQL: &str = include_str!("sql/select_catalog_products.sql");
const COUNT_CATALOG_PRODUCTS_SQL: &str = include_str!("sql/count_catalog_products.sql");
const GET_ACTIVE_PRODUCT_SQL: &str = include_str!("sql/get_active_product.sql");
const LIST_ACTIVE_PRODUCTS_SQL: &str = include_str!("sql/list_active_products.sql");
const FIND_SIMILAR_PRODUCTS_SQL: &str = include_str!("sql/find_similar_products.sql");
const LIST_POPULAR_PRODUCTS_SQL: &str = include_str!("sql/list_popular_products.sql");
const SUGGEST_PRODUCT_NAMES_SQL: &str = include_str!("sql/suggest_product_names.sql");

#[automock]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Fetch one product if it exists and is active.
    async fn find_active_product(
        &self,
        product: ProductId,
    ) -> Result<Option<CatalogProduct>, sqlx::Error>;

    /// Every active product, in identifier order.
    async fn list_active_products(&self) -> Result<Vec<CatalogProduct>, sqlx::Error>;

    /// Case-insensitive substring search over name, description and category
    /// name, with the query's filters, sort and page applied.
    async fn search_products(&self, query: &SearchQuery) -> Result<CatalogPage, sqlx::Error>;

    /// Names of active products containing `fragment`, most viewed first.
    async fn suggest_names(&self, fragment: &str, limit: u32) -> Result<Vec<String>, sqlx::Error>;

    /// Active products other than `seed` meeting any of `criteria`, ranked.
    async fn find_similar(
        &self,
        seed: ProductId,
        criteria: &SimilarityCriteria,
        limit: u32,
    ) -> Result<Vec<CatalogProduct>, sqlx::Error>;

    /// Most viewed active products not listed in `excluding`.
    async fn list_popular(
        &self,
        excluding: &[ProductId],
        limit: u32,
    ) -> Result<Vec<CatalogProduct>, sqlx::Error>;
}

/// PostgreSQL-backed catalog repository.
#[derive(Debug, Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn find_active_product(
        &self,
        product: ProductId,
    ) -> Result<Option<CatalogProduct>, sqlx::Error> {
        query_as::<Postgres, CatalogProduct>(GET_ACTIVE_PRODUCT_SQL)
            .bind(product.into_i64())
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_active_products(&self) -> Result<Vec<CatalogProduct>, sqlx::Error> {
        query_as::<Postgres, CatalogProduct>(LIST_ACTIVE_PRODUCTS_SQL)
            .fetch_all(&self.pool)
            .await
    }

    async fn search_products(&self, search: &SearchQuery) -> Result<CatalogPage, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Count and page must observe the same snapshot.
        query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new(COUNT_CATALOG_PRODUCTS_SQL);
        push_search_conditions(&mut count, search);

        let total: i64 = count.build_query_scalar().fetch_one(&mut *tx).await?;

        let page = search.page();
        let offset = i64::try_from(page.offset()).map_err(|e| decode_error("offset", e))?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_CATALOG_PRODUCTS_SQL);
        push_search_conditions(&mut select, search);
        select.push(order_clause(search.sort(), search.direction()));
        select.push(" LIMIT ");
        select.push_bind(i64::from(page.per_page()));
        select.push(" OFFSET ");
        select.push_bind(offset);

        let products = select
            .build_query_as::<CatalogProduct>()
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(CatalogPage {
            products,
            total: u64::try_from(total).map_err(|e| decode_error("count", e))?,
        })
    }

    async fn suggest_names(&self, fragment: &str, limit: u32) -> Result<Vec<String>, sqlx::Error> {
        query_scalar::<Postgres, String>(SUGGEST_PRODUCT_NAMES_SQL)
            .bind(contains_pattern(fragment))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
    }

    async fn find_similar(
        &self,
        seed: ProductId,
        criteria: &SimilarityCriteria,
        limit: u32,
    ) -> Result<Vec<CatalogProduct>, sqlx::Error> {
        query_as::<Postgres, CatalogProduct>(FIND_SIMILAR_PRODUCTS_SQL)
            .bind(seed.into_i64())
            .bind(criteria.category_id.into_i64())
            .bind(criteria.price_range.min)
            .bind(criteria.price_range.max)
            .bind(criteria.rating_range.map(|range| range.min))
            .bind(criteria.rating_range.map(|range| range.max))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
    }

    async fn list_popular(
        &self,
        excluding: &[ProductId],
        limit: u32,
    ) -> Result<Vec<CatalogProduct>, sqlx::Error> {
        let excluding: Vec<i64> = excluding.iter().map(|id| id.into_i64()).collect();

        query_as::<Postgres, CatalogProduct>(LIST_POPULAR_PRODUCTS_SQL)
            .bind(excluding)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
    }
}

/// `ILIKE` pattern matching `text` anywhere, with wildcards in `text` escaped.
pub(crate) fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);

    pattern.push('%');

    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }

        pattern.push(ch);
    }

    pattern.push('%');

    pattern
}

fn push_search_conditions(builder: &mut QueryBuilder<'_, Postgres>, search: &SearchQuery) {
    let pattern = contains_pattern(search.text());

    builder.push(" WHERE p.is_active AND (p.name ILIKE ");
    builder.push_bind(pattern.clone());
    builder.push(" ESCAPE '\\' OR p.description ILIKE ");
    builder.push_bind(pattern.clone());
    builder.push(" ESCAPE '\\' OR c.name ILIKE ");
    builder.push_bind(pattern);
    builder.push(" ESCAPE '\\')");

    for filter in search.filters() {
        match filter {
            SearchFilter::Category(category) => {
                builder.push(" AND p.category_id = ");
                builder.push_bind(category.into_i64());
            }
            SearchFilter::PriceRange { min, max } => {
                if let Some(min) = min {
                    builder.push(" AND p.price >= ");
                    builder.push_bind(*min);
                }

                if let Some(max) = max {
                    builder.push(" AND p.price <= ");
                    builder.push_bind(*max);
                }
            }
            SearchFilter::MinRating(min) => {
                builder.push(" AND p.rating >= ");
                builder.push_bind(*min);
            }
            SearchFilter::Status(status) => {
                builder.push(" AND p.status = ");
                builder.push_bind(status.as_str());
            }
        }
    }
}

fn order_clause(sort: SortField, direction: SortDirection) -> String {
    let column = match sort {
        // Every degraded match scores the same, so relevance falls back to
        // insertion order.
        SortField::Relevance => return " ORDER BY p.id ASC".to_string(),
        SortField::Name => "p.name",
        SortField::Price => "p.price",
        SortField::CreatedAt => "p.created_at",
        SortField::Views => "p.views",
        SortField::Rating => "p.rating",
        SortField::Discount => "p.discount",
    };

    format!(
        " ORDER BY {column} {} NULLS LAST, p.id ASC",
        direction.as_str().to_ascii_uppercase()
    )
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

impl<'r> FromRow<'r, PgRow> for CatalogProduct {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount: i16 = row.try_get("discount")?;
        let stock: i32 = row.try_get("stock")?;
        let views: i64 = row.try_get("views")?;
        let rating_count: i32 = row.try_get("rating_count")?;
        let status: String = row.try_get("status")?;

        let category_id = CategoryId::from_i64(row.try_get("category_id")?);

        Ok(Self {
            product: Product {
                id: ProductId::from_i64(row.try_get("id")?),
                category_id,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                price: row.try_get("price")?,
                original_price: row.try_get("original_price")?,
                discount: u8::try_from(discount).map_err(|e| decode_error("discount", e))?,
                stock: u32::try_from(stock).map_err(|e| decode_error("stock", e))?,
                status: status
                    .parse::<ProductStatus>()
                    .map_err(|e| decode_error("status", e))?,
                views: u64::try_from(views).map_err(|e| decode_error("views", e))?,
                rating: row.try_get("rating")?,
                rating_count: u32::try_from(rating_count)
                    .map_err(|e| decode_error("rating_count", e))?,
                image_url: row.try_get("image_url")?,
                is_active: row.try_get("is_active")?,
                created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
                updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            },
            category: Category {
                id: category_id,
                name: row.try_get("category_name")?,
                description: row.try_get("category_description")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::search::query::SearchRequest,
        test::{db::TestDb, fixtures::product},
    };

    use super::*;

    async fn seeded() -> TestDb {
        let db = TestDb::new().await;

        for fixture in [
            product(1, "iPhone 15", 1, Decimal::from(999))
                .category_name("Phones")
                .views(50)
                .build(),
            product(2, "iPhone 15 Case", 2, Decimal::from(29))
                .category_name("Accessories")
                .views(10)
                .build(),
            product(3, "100% Cotton Sleeve", 2, Decimal::from(12))
                .category_name("Accessories")
                .build(),
            product(4, "Retired iPhone", 1, Decimal::from(499))
                .category_name("Phones")
                .views(900)
                .inactive()
                .build(),
        ] {
            db.insert_product(&fixture).await;
        }

        db
    }

    #[test]
    fn contains_pattern_wraps_and_escapes_wildcards() {
        assert_eq!(contains_pattern("phone"), "%phone%");
        assert_eq!(contains_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[test]
    fn relevance_orders_by_insertion() {
        assert_eq!(
            order_clause(SortField::Relevance, SortDirection::Desc),
            " ORDER BY p.id ASC"
        );
    }

    #[test]
    fn field_sorts_break_ties_by_identifier() {
        assert_eq!(
            order_clause(SortField::Price, SortDirection::Asc),
            " ORDER BY p.price ASC NULLS LAST, p.id ASC"
        );
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn substring_search_skips_inactive_products() -> TestResult {
        let db = seeded().await;
        let repository = PgCatalogRepository::new(db.pool().clone());

        let page = repository
            .search_products(&SearchRequest::new("IPHONE").validate()?)
            .await?;

        let ids: Vec<i64> = page
            .products
            .iter()
            .map(|found| found.product.id.into_i64())
            .collect();

        assert_eq!(ids, vec![1, 2]);
        assert_eq!(page.total, 2);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn wildcards_in_query_text_match_literally() -> TestResult {
        let db = seeded().await;
        let repository = PgCatalogRepository::new(db.pool().clone());

        let page = repository
            .search_products(&SearchRequest::new("100%").validate()?)
            .await?;

        assert_eq!(page.total, 1);
        assert_eq!(
            page.products.first().map(|found| found.product.id.into_i64()),
            Some(3)
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn popular_products_exclude_listed_and_inactive() -> TestResult {
        let db = seeded().await;
        let repository = PgCatalogRepository::new(db.pool().clone());

        let popular = repository
            .list_popular(&[ProductId::from_i64(1)], 10)
            .await?;

        let ids: Vec<i64> = popular
            .iter()
            .map(|found| found.product.id.into_i64())
            .collect();

        assert_eq!(ids, vec![2, 3]);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn suggestions_are_most_viewed_first() -> TestResult {
        let db = seeded().await;
        let repository = PgCatalogRepository::new(db.pool().clone());

        let names = repository.suggest_names("iph", 5).await?;

        assert_eq!(names, vec!["iPhone 15", "iPhone 15 Case"]);

        Ok(())
    }
}
