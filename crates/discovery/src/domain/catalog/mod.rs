//! Catalog
//!
//! The primary record store for products and categories. Discovery only reads
//! from it; view counters are written by the view tracker.

pub mod models;
pub mod repository;

pub use repository::{CatalogRepository, MockCatalogRepository, PgCatalogRepository};
