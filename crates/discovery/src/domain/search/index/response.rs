//! Elasticsearch response bodies.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{catalog::models::ProductId, search::documents::SearchDocument};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Hits,

    #[serde(default)]
    pub suggest: HashMap<String, Vec<SuggestEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,

    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TotalHits {
    pub value: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,

    #[serde(rename = "_source")]
    pub source: SearchDocument,

    #[serde(default)]
    pub highlight: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestEntry {
    #[serde(default)]
    pub options: Vec<SuggestOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestOption {
    pub text: String,

    #[serde(rename = "_score", default)]
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IdScanResponse {
    #[serde(default)]
    pub hits: IdHits,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IdHits {
    #[serde(default)]
    pub hits: Vec<IdHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdHit {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkResponse {
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkItem {
    #[serde(rename = "_id")]
    pub id: String,

    pub status: u16,

    #[serde(default)]
    pub error: Option<Value>,
}

/// A document the index refused during a bulk write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDocument {
    pub product_id: ProductId,
    pub reason: String,
}

/// Per-document result of a bulk write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub indexed: u64,
    pub failed: Vec<FailedDocument>,
}

impl BulkResponse {
    pub(crate) fn into_outcome(self) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();

        for item in self.items.into_iter().flat_map(HashMap::into_values) {
            if item.status < 300 && item.error.is_none() {
                outcome.indexed += 1;
                continue;
            }

            let reason = item
                .error
                .as_ref()
                .and_then(|error| error.get("reason"))
                .and_then(Value::as_str)
                .map_or_else(|| format!("status {}", item.status), str::to_string);

            outcome.failed.push(FailedDocument {
                product_id: ProductId::from_i64(item.id.parse().unwrap_or_default()),
                reason,
            });
        }

        outcome
    }
}
