//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    config::DiscoveryConfig,
    database,
    domain::{
        catalog::{CatalogRepository, PgCatalogRepository},
        recommendations::{CatalogRecommendationsService, RecommendationsService},
        search::{
            BackendSelector, FallbackSearchService, IndexSynchronizer, SearchService,
            backends::{FullTextBackend, SubstringBackend},
            index::ElasticsearchClient,
        },
        views::{PgViewsRepository, TrackingViewsService, ViewsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] MigrateError),
}

/// Every discovery service, wired to the record store and the search index.
#[derive(Clone)]
pub struct AppContext {
    pub search: Arc<dyn SearchService>,
    pub recommendations: Arc<dyn RecommendationsService>,
    pub views: Arc<dyn ViewsService>,
    pub index_sync: IndexSynchronizer,
}

impl AppContext {
    /// Connects to the record store, applies migrations and builds the
    /// services.
    ///
    /// # Errors
    ///
    /// Returns an error when the database is unreachable or a migration fails.
    pub async fn from_config(config: &DiscoveryConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrations)?;

        let catalog: Arc<dyn CatalogRepository> = Arc::new(PgCatalogRepository::new(pool.clone()));
        let index = Arc::new(ElasticsearchClient::new(config.search.to_elasticsearch()));

        let selector = BackendSelector::new(
            Arc::new(FullTextBackend::new(index.clone())),
            Arc::new(SubstringBackend::new(Arc::clone(&catalog))),
            index.clone(),
        );

        Ok(Self {
            search: Arc::new(FallbackSearchService::new(selector)),
            recommendations: Arc::new(CatalogRecommendationsService::new(Arc::clone(&catalog))),
            views: Arc::new(TrackingViewsService::new(
                Arc::clone(&catalog),
                Arc::new(PgViewsRepository::new(pool)),
                config.tracking.policy(),
            )),
            index_sync: IndexSynchronizer::new(index, catalog),
        })
    }
}
