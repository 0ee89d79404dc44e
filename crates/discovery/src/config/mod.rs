//! Discovery configuration
//!
//! Every setting can be given as a flag or through the environment; a `.env`
//! file is honoured when present.

use clap::Args;

pub mod db;
pub mod logging;
pub mod search;
pub mod tracking;

pub use db::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use search::SearchIndexConfig;
pub use tracking::TrackingConfig;

/// Settings shared by every discovery command.
#[derive(Debug, Args)]
pub struct DiscoveryConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Record store settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Search index settings.
    #[command(flatten)]
    pub search: SearchIndexConfig,

    /// View tracking windows.
    #[command(flatten)]
    pub tracking: TrackingConfig,
}
