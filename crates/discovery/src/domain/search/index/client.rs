//! Elasticsearch REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{
    catalog::models::ProductId,
    search::{
        documents::SearchDocument,
        errors::SearchIndexError,
        index::{
            SearchIndex,
            query_builder::build_id_scan_body,
            response::{BulkOutcome, BulkResponse, CountResponse, IdScanResponse, SearchResponse},
        },
        selector::LivenessProbe,
    },
};

/// Documents fetched per page when listing stored ids.
const ID_SCAN_PAGE_SIZE: usize = 1_000;

/// Connection settings for an Elasticsearch cluster.
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Base URL, e.g. `"http://localhost:9200"`.
    pub url: String,

    /// Name of the product index.
    pub index: String,

    pub username: Option<String>,
    pub password: Option<String>,

    /// Upper bound for the liveness probe.
    pub probe_timeout: Duration,

    /// Upper bound for every other request.
    pub request_timeout: Duration,
}

/// HTTP client for the product index.
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    config: ElasticsearchConfig,
    http: Client,
}

impl ElasticsearchClient {
    #[must_use]
    pub fn new(mut config: ElasticsearchConfig) -> Self {
        let trimmed = config.url.trim_end_matches('/').len();
        config.url.truncate(trimmed);

        Self {
            config,
            http: Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}{path}", self.config.url, self.config.index);

        self.authorize(self.http.request(method, url))
            .timeout(self.config.request_timeout)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.username {
            Some(username) => builder.basic_auth(username, self.config.password.as_ref()),
            None => builder,
        }
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchClient {
    async fn index_exists(&self) -> Result<bool, SearchIndexError> {
        let response = self.request(Method::HEAD, "").send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(SearchIndexError::Status {
                operation: "index lookup",
                status,
                body: String::new(),
            }),
        }
    }

    async fn create_index(&self, definition: &Value) -> Result<(), SearchIndexError> {
        let response = self.request(Method::PUT, "").json(definition).send().await?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        // Lost a creation race with another process; the index is there.
        if status == StatusCode::BAD_REQUEST && text.contains("resource_already_exists_exception")
        {
            return Ok(());
        }

        Err(SearchIndexError::Status {
            operation: "create index",
            status,
            body: text,
        })
    }

    async fn bulk_index(
        &self,
        documents: &[SearchDocument],
    ) -> Result<BulkOutcome, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let mut body = String::new();

        for document in documents {
            let action = json!({ "index": { "_id": document.id.to_string() } });
            let source = serde_json::to_string(document).map_err(|error| {
                SearchIndexError::UnexpectedResponse(format!(
                    "document {} could not be serialized: {error}",
                    document.id
                ))
            })?;

            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(&source);
            body.push('\n');
        }

        let response = self
            .request(Method::POST, "/_bulk")
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        let parsed: BulkResponse = success_json(response, "bulk").await?;
        let outcome = parsed.into_outcome();

        debug!(
            indexed = outcome.indexed,
            failed = outcome.failed.len(),
            "bulk request completed"
        );

        Ok(outcome)
    }

    async fn index_document(&self, document: &SearchDocument) -> Result<(), SearchIndexError> {
        let response = self
            .request(Method::PUT, &format!("/_doc/{}", document.id))
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(SearchIndexError::Status {
                operation: "index document",
                status,
                body: text,
            });
        }

        Ok(())
    }

    async fn document_ids(&self) -> Result<Vec<ProductId>, SearchIndexError> {
        let mut ids = Vec::new();
        let mut after = None;

        loop {
            let response = self
                .request(Method::POST, "/_search")
                .json(&build_id_scan_body(after, ID_SCAN_PAGE_SIZE))
                .send()
                .await?;

            let page: IdScanResponse = success_json(response, "id scan").await?;
            let fetched = page.hits.hits.len();

            for hit in page.hits.hits {
                let id = hit.id.parse::<i64>().map_err(|error| {
                    SearchIndexError::UnexpectedResponse(format!(
                        "document id {} is not a product id: {error}",
                        hit.id
                    ))
                })?;

                ids.push(ProductId::from_i64(id));
            }

            if fetched < ID_SCAN_PAGE_SIZE {
                return Ok(ids);
            }

            after = ids.last().copied();
        }
    }

    async fn delete_document(&self, product: ProductId) -> Result<bool, SearchIndexError> {
        let response = self
            .request(Method::DELETE, &format!("/_doc/{product}"))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => {
                let text = response.text().await.unwrap_or_default();

                Err(SearchIndexError::Status {
                    operation: "delete document",
                    status,
                    body: text,
                })
            }
        }
    }

    async fn search(&self, body: &Value) -> Result<SearchResponse, SearchIndexError> {
        let response = self
            .request(Method::POST, "/_search")
            .json(body)
            .send()
            .await?;

        success_json(response, "search").await
    }

    async fn count(&self) -> Result<u64, SearchIndexError> {
        let response = self.request(Method::GET, "/_count").send().await?;
        let parsed: CountResponse = success_json(response, "count").await?;

        Ok(parsed.count)
    }
}

#[async_trait]
impl LivenessProbe for ElasticsearchClient {
    async fn is_alive(&self) -> bool {
        let request = self
            .authorize(self.http.head(format!("{}/", self.config.url)))
            .timeout(self.config.probe_timeout);

        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                debug!(%error, "search index liveness probe failed");
                false
            }
        }
    }
}

async fn success_json<T>(
    response: Response,
    operation: &'static str,
) -> Result<T, SearchIndexError>
where
    T: serde::de::DeserializeOwned,
{
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        return Err(SearchIndexError::Status {
            operation,
            status,
            body: text,
        });
    }

    Ok(response.json().await?)
}
