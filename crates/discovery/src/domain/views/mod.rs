//! Product view tracking, history and statistics.

pub mod errors;
pub mod identity;
pub mod models;
pub mod repository;
pub mod service;

pub use errors::ViewsServiceError;
pub use repository::{MockViewsRepository, PgViewsRepository, ViewsRepository};
pub use service::{MockViewsService, TrackingPolicy, TrackingViewsService, ViewsService};
