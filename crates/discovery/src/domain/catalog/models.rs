//! Catalog Models

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{domain::validation::ValidationError, ids::TypedId};

/// Product identifier
pub type ProductId = TypedId<Product>;

/// Category identifier
pub type CategoryId = TypedId<Category>;

/// Stock status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    InStock,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::OutOfStock => "out_of_stock",
            Self::Discontinued => "discontinued",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "in_stock" => Ok(Self::InStock),
            "out_of_stock" => Ok(Self::OutOfStock),
            "discontinued" => Ok(Self::Discontinued),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Category Model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

/// Product Model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub original_price: Option<Decimal>,
    pub discount: u8,
    pub stock: u32,
    pub status: ProductStatus,
    pub views: u64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rating: Option<Decimal>,
    pub rating_count: u32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A product joined with the category it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogProduct {
    pub product: Product,
    pub category: Category,
}

/// Condensed product view used by recommendations and view history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub original_price: Option<Decimal>,
    pub discount: u8,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rating: Option<Decimal>,
    pub views: u64,
    pub status: ProductStatus,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
    pub category_name: String,
}

impl From<&CatalogProduct> for ProductSummary {
    fn from(value: &CatalogProduct) -> Self {
        let product = &value.product;

        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            original_price: product.original_price,
            discount: product.discount,
            rating: product.rating,
            views: product.views,
            status: product.status,
            image_url: product.image_url.clone(),
            category_id: value.category.id,
            category_name: value.category.name.clone(),
        }
    }
}

/// One page of record-store matches plus the exact match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    pub products: Vec<CatalogProduct>,
    pub total: u64,
}
