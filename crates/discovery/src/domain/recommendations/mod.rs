//! Similar-product recommendations.

pub mod errors;
pub mod models;
pub mod service;

pub use errors::RecommendationsServiceError;
pub use service::{
    CatalogRecommendationsService, MockRecommendationsService, RecommendationsService,
};
