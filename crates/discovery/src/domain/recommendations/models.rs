//! Recommendation Models

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::catalog::models::{CatalogProduct, CategoryId, Product, ProductSummary};

/// Inclusive decimal interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecimalRange {
    #[serde(with = "rust_decimal::serde::float")]
    pub min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max: Decimal,
}

impl DecimalRange {
    pub fn contains(&self, value: Decimal) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// The criteria a candidate must satisfy at least one of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityCriteria {
    pub category_id: CategoryId,
    pub price_range: DecimalRange,
    pub rating_range: Option<DecimalRange>,
}

impl SimilarityCriteria {
    /// Derives the criteria anchored on `seed`.
    ///
    /// Returns `None` when the seed price is not positive, since such a price
    /// cannot anchor a price band.
    pub fn for_seed(seed: &Product) -> Option<Self> {
        if seed.price <= Decimal::ZERO {
            return None;
        }

        let price_range = DecimalRange {
            min: seed.price * Decimal::new(8, 1),
            max: seed.price * Decimal::new(12, 1),
        };

        let five = Decimal::from(5);
        let half = Decimal::new(5, 1);

        let rating_range = seed
            .rating
            .filter(|rating| *rating > Decimal::ZERO && *rating <= five)
            .map(|rating| DecimalRange {
                min: (rating - half).max(Decimal::ZERO),
                max: (rating + half).min(five),
            });

        Some(Self {
            category_id: seed.category_id,
            price_range,
            rating_range,
        })
    }

    /// Whether `candidate` meets any one of the criteria.
    ///
    /// Reference predicate for `find_similar_products.sql`.
    #[cfg(test)]
    pub(crate) fn matches(&self, candidate: &CatalogProduct) -> bool {
        let product = &candidate.product;

        product.category_id == self.category_id
            || self.price_range.contains(product.price)
            || self
                .rating_range
                .zip(product.rating)
                .is_some_and(|(range, rating)| range.contains(rating))
    }

    /// Candidate ordering: same category first, then most viewed, then newest.
    ///
    /// Reference ordering for `find_similar_products.sql`.
    #[cfg(test)]
    pub(crate) fn rank(&self, a: &CatalogProduct, b: &CatalogProduct) -> std::cmp::Ordering {
        let same_category = |p: &CatalogProduct| p.product.category_id == self.category_id;

        same_category(b)
            .cmp(&same_category(a))
            .then_with(|| b.product.views.cmp(&a.product.views))
            .then_with(|| b.product.created_at.cmp(&a.product.created_at))
            .then_with(|| a.product.id.cmp(&b.product.id))
    }
}

/// Why a product was recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    /// Met at least one similarity criterion.
    Criteria,
    /// Popularity padding after the criteria ran out.
    Backfill,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarProduct {
    #[serde(flatten)]
    pub product: ProductSummary,
    pub matched_by: MatchSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarProducts {
    pub original_product: ProductSummary,
    pub similar_products: Vec<SimilarProduct>,
    pub total_found: usize,
    pub criteria: SimilarityCriteria,
}
