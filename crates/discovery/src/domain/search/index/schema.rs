//! Index settings and field mappings.

use serde_json::{Value, json};

/// Completion sub-field on `name` used by the suggester.
pub const SUGGEST_FIELD: &str = "name.suggest";

/// Exact-value sub-field on `name` used for sorting.
pub const NAME_KEYWORD_FIELD: &str = "name.keyword";

/// Settings and mappings for the product index.
pub fn index_definition() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0
        },
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "id": { "type": "long" },
                "name": {
                    "type": "text",
                    "fields": {
                        "keyword": { "type": "keyword", "ignore_above": 256 },
                        "suggest": { "type": "completion" }
                    }
                },
                "description": { "type": "text" },
                "price": { "type": "scaled_float", "scaling_factor": 100 },
                "originalPrice": { "type": "scaled_float", "scaling_factor": 100 },
                "discount": { "type": "short" },
                "stock": { "type": "integer" },
                "status": { "type": "keyword" },
                "views": { "type": "long" },
                "rating": { "type": "scaled_float", "scaling_factor": 100 },
                "ratingCount": { "type": "integer" },
                "categoryId": { "type": "long" },
                "categoryName": { "type": "text" },
                "categoryDescription": { "type": "text" },
                "imageUrl": { "type": "keyword", "index": false },
                "isActive": { "type": "boolean" },
                "createdAt": { "type": "date" },
                "updatedAt": { "type": "date" }
            }
        }
    })
}
