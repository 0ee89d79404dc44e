//! Catalog fixtures

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::domain::catalog::models::{
    CatalogProduct, Category, CategoryId, Product, ProductId, ProductStatus,
};

pub(crate) fn category_id(id: i64) -> CategoryId {
    CategoryId::from_i64(id)
}

/// Starts an active, in-stock product in category `category`.
pub(crate) fn product(id: i64, name: &str, category: i64, price: Decimal) -> ProductBuilder {
    ProductBuilder {
        product: Product {
            id: ProductId::from_i64(id),
            category_id: category_id(category),
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            original_price: None,
            discount: 0,
            stock: 10,
            status: ProductStatus::InStock,
            views: 0,
            rating: None,
            rating_count: 0,
            image_url: None,
            is_active: true,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        },
        category: Category {
            id: category_id(category),
            name: format!("Category {category}"),
            description: String::new(),
        },
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ProductBuilder {
    product: Product,
    category: Category,
}

impl ProductBuilder {
    pub(crate) fn rating(mut self, rating: Decimal) -> Self {
        self.product.rating = Some(rating);
        self.product.rating_count = 1;
        self
    }

    pub(crate) fn views(mut self, views: u64) -> Self {
        self.product.views = views;
        self
    }

    pub(crate) fn description(mut self, description: &str) -> Self {
        self.product.description = description.to_string();
        self
    }

    pub(crate) fn category_name(mut self, name: &str) -> Self {
        self.category.name = name.to_string();
        self
    }

    pub(crate) fn inactive(mut self) -> Self {
        self.product.is_active = false;
        self
    }

    pub(crate) fn build(self) -> CatalogProduct {
        CatalogProduct {
            product: self.product,
            category: self.category,
        }
    }
}
