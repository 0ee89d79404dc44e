//! Search Index Config

use std::time::Duration;

use clap::Args;

use crate::domain::search::index::ElasticsearchConfig;

/// Search index settings.
#[derive(Debug, Args)]
pub struct SearchIndexConfig {
    /// Elasticsearch base URL
    #[arg(long, env = "SEARCH_URL", default_value = "http://localhost:9200")]
    pub search_url: String,

    /// Name of the product index
    #[arg(long, env = "SEARCH_INDEX", default_value = "products")]
    pub search_index: String,

    /// Basic auth user
    #[arg(long, env = "SEARCH_USERNAME")]
    pub search_username: Option<String>,

    /// Basic auth password
    #[arg(long, env = "SEARCH_PASSWORD", hide_env_values = true)]
    pub search_password: Option<String>,

    /// Liveness probe timeout in milliseconds
    #[arg(long, env = "SEARCH_PROBE_TIMEOUT_MS", default_value_t = 1_000_u64)]
    pub search_probe_timeout_ms: u64,

    /// Timeout for every other index request in milliseconds
    #[arg(long, env = "SEARCH_REQUEST_TIMEOUT_MS", default_value_t = 5_000_u64)]
    pub search_request_timeout_ms: u64,
}

impl SearchIndexConfig {
    #[must_use]
    pub fn to_elasticsearch(&self) -> ElasticsearchConfig {
        ElasticsearchConfig {
            url: self.search_url.clone(),
            index: self.search_index.clone(),
            username: self.search_username.clone(),
            password: self.search_password.clone(),
            probe_timeout: Duration::from_millis(self.search_probe_timeout_ms),
            request_timeout: Duration::from_millis(self.search_request_timeout_ms),
        }
    }
}
