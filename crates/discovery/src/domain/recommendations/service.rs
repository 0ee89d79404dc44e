//! Recommendations Service

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashSet;
use tracing::{Span, info};

use crate::domain::{
    catalog::{
        CatalogRepository,
        models::{CatalogProduct, ProductId, ProductSummary},
    },
    recommendations::{
        errors::RecommendationsServiceError,
        models::{MatchSource, SimilarProduct, SimilarProducts, SimilarityCriteria},
    },
    validation,
};

/// Recommendation count used when the caller does not supply one.
pub const DEFAULT_SIMILAR_LIMIT: u32 = 8;

/// Largest accepted recommendation count.
pub const MAX_SIMILAR_LIMIT: u32 = 50;

#[automock]
#[async_trait]
pub trait RecommendationsService: Send + Sync {
    /// Products similar to `product`, padded with popular products when too
    /// few qualify.
    async fn similar_products(
        &self,
        product: ProductId,
        limit: Option<u32>,
    ) -> Result<SimilarProducts, RecommendationsServiceError>;
}

#[derive(Clone)]
pub struct CatalogRecommendationsService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogRecommendationsService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl RecommendationsService for CatalogRecommendationsService {
    #[tracing::instrument(
        name = "recommendations.service.similar_products",
        skip(self),
        fields(
            product_id = %product,
            matched = tracing::field::Empty,
            backfilled = tracing::field::Empty
        ),
        err
    )]
    async fn similar_products(
        &self,
        product: ProductId,
        limit: Option<u32>,
    ) -> Result<SimilarProducts, RecommendationsServiceError> {
        let limit = validation::bounded(
            "limit",
            limit.unwrap_or(DEFAULT_SIMILAR_LIMIT),
            1,
            MAX_SIMILAR_LIMIT,
        )?;

        let seed = self
            .catalog
            .find_active_product(product)
            .await?
            .ok_or(RecommendationsServiceError::NotFound)?;

        let criteria = SimilarityCriteria::for_seed(&seed.product)
            .ok_or(RecommendationsServiceError::InvalidState)?;

        let wanted = usize::try_from(limit).unwrap_or(usize::MAX);

        let mut selected = FxHashSet::default();
        selected.insert(product);

        let mut similar = Vec::with_capacity(wanted);

        let candidates = self.catalog.find_similar(product, &criteria, limit).await?;

        push_unique(
            &mut similar,
            &mut selected,
            candidates,
            wanted,
            MatchSource::Criteria,
        );

        let matched = similar.len();

        if similar.len() < wanted {
            let excluding: Vec<ProductId> = selected.iter().copied().collect();
            let remaining = u32::try_from(wanted - similar.len()).unwrap_or(limit);

            let popular = self.catalog.list_popular(&excluding, remaining).await?;

            push_unique(
                &mut similar,
                &mut selected,
                popular,
                wanted,
                MatchSource::Backfill,
            );
        }

        let span = Span::current();

        span.record("matched", matched);
        span.record("backfilled", similar.len() - matched);

        info!(
            product_id = %product,
            matched,
            backfilled = similar.len() - matched,
            "found similar products"
        );

        Ok(SimilarProducts {
            original_product: ProductSummary::from(&seed),
            total_found: similar.len(),
            similar_products: similar,
            criteria,
        })
    }
}

fn push_unique(
    similar: &mut Vec<SimilarProduct>,
    selected: &mut FxHashSet<ProductId>,
    candidates: Vec<CatalogProduct>,
    wanted: usize,
    source: MatchSource,
) {
    for candidate in candidates {
        if similar.len() >= wanted {
            break;
        }

        if candidate.product.is_active && selected.insert(candidate.product.id) {
            similar.push(SimilarProduct {
                product: ProductSummary::from(&candidate),
                matched_by: source,
            });
        }
    }
}
