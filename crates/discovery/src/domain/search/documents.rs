//! Search Documents

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::models::{CatalogProduct, CategoryId, ProductId, ProductStatus};

/// Flattened, read-optimized projection of one active product and its
/// category, as stored in the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub original_price: Option<Decimal>,
    pub discount: u8,
    pub stock: u32,
    pub status: ProductStatus,
    pub views: u64,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub rating: Option<Decimal>,
    pub rating_count: u32,
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&CatalogProduct> for SearchDocument {
    fn from(value: &CatalogProduct) -> Self {
        let product = &value.product;

        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            original_price: product.original_price,
            discount: product.discount,
            stock: product.stock,
            status: product.status,
            views: product.views,
            rating: product.rating,
            rating_count: product.rating_count,
            category_id: value.category.id,
            category_name: value.category.name.clone(),
            category_description: value.category.description.clone(),
            image_url: product.image_url.clone(),
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::fixtures::product;

    use super::*;

    #[test]
    fn projection_carries_category_text() {
        let catalog = product(4, "iPhone 15 Pro Max", 2, Decimal::from(1_199))
            .category_name("Phones")
            .build();

        let document = SearchDocument::from(&catalog);

        assert_eq!(document.id, ProductId::from_i64(4));
        assert_eq!(document.category_id, CategoryId::from_i64(2));
        assert_eq!(document.category_name, "Phones");
    }

    #[test]
    fn numeric_fields_are_stored_as_json_numbers() -> TestResult {
        let catalog = product(1, "Lamp", 1, Decimal::new(1_999, 2))
            .rating(Decimal::new(45, 1))
            .build();

        let json = serde_json::to_value(SearchDocument::from(&catalog))?;

        assert_eq!(json["price"], serde_json::json!(19.99));
        assert_eq!(json["rating"], serde_json::json!(4.5));
        assert_eq!(json["categoryId"], serde_json::json!(1));
        assert_eq!(json["isActive"], serde_json::json!(true));

        let decoded: SearchDocument = serde_json::from_value(json)?;

        assert_eq!(decoded.price, Decimal::new(1_999, 2));

        Ok(())
    }
}
