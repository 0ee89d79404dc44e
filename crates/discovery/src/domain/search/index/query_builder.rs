//! Query DSL bodies for the full-text backend.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::{Map, Value, json};

use crate::domain::{
    catalog::models::ProductId,
    search::{
        index::schema::{NAME_KEYWORD_FIELD, SUGGEST_FIELD},
        query::{SearchFilter, SearchQuery, SortField, SuggestQuery},
    },
};

/// Name of the completion suggester in suggestion requests.
pub const SUGGESTER_NAME: &str = "product_suggest";

pub const HIGHLIGHT_PRE_TAG: &str = "<mark>";
pub const HIGHLIGHT_POST_TAG: &str = "</mark>";

/// Highlighted fields, as named in the index.
pub const HIGHLIGHT_FIELDS: [&str; 3] = ["name", "description", "categoryName"];

/// Builds the `_search` body for a validated query.
pub fn build_search_body(query: &SearchQuery) -> Value {
    let text = query.text();
    let page = query.page();

    let should = vec![
        json!({ "match": { "name": { "query": text, "fuzziness": "AUTO", "boost": 1.0 } } }),
        json!({ "match_phrase": { "name": { "query": text, "boost": 2.0 } } }),
        json!({ "match": { "description": { "query": text, "boost": 1.5 } } }),
        json!({ "match": { "categoryName": { "query": text, "boost": 1.2 } } }),
    ];

    let mut filter = vec![json!({ "term": { "isActive": true } })];
    filter.extend(query.filters().iter().map(filter_clause));

    let highlight_fields: Map<String, Value> = HIGHLIGHT_FIELDS
        .iter()
        .map(|field| ((*field).to_string(), json!({})))
        .collect();

    json!({
        "query": {
            "bool": {
                "must": [{
                    "bool": {
                        "should": should,
                        "minimum_should_match": 1
                    }
                }],
                "filter": filter
            }
        },
        "sort": sort_clauses(query),
        "from": page.offset(),
        "size": page.per_page(),
        "track_total_hits": true,
        "highlight": {
            "pre_tags": [HIGHLIGHT_PRE_TAG],
            "post_tags": [HIGHLIGHT_POST_TAG],
            "fields": highlight_fields
        }
    })
}

/// Builds one page of an id scan over every document, resuming after `after`.
pub fn build_id_scan_body(after: Option<ProductId>, size: usize) -> Value {
    let mut body = json!({
        "_source": false,
        "query": { "match_all": {} },
        "sort": [{ "id": "asc" }],
        "size": size
    });

    if let (Some(after), Some(fields)) = (after, body.as_object_mut()) {
        fields.insert("search_after".to_string(), json!([after.into_i64()]));
    }

    body
}

/// Builds the completion-suggester body for a validated prefix.
pub fn build_suggest_body(query: &SuggestQuery) -> Value {
    json!({
        "_source": false,
        "suggest": {
            SUGGESTER_NAME: {
                "prefix": query.prefix(),
                "completion": {
                    "field": SUGGEST_FIELD,
                    "size": query.limit(),
                    "skip_duplicates": false
                }
            }
        }
    })
}

fn filter_clause(filter: &SearchFilter) -> Value {
    match filter {
        SearchFilter::Category(category) => {
            json!({ "term": { "categoryId": category.into_i64() } })
        }
        SearchFilter::PriceRange { min, max } => {
            let mut range = Map::new();

            if let Some(min) = min {
                range.insert("gte".to_string(), decimal_json(*min));
            }

            if let Some(max) = max {
                range.insert("lte".to_string(), decimal_json(*max));
            }

            json!({ "range": { "price": range } })
        }
        SearchFilter::MinRating(min) => {
            json!({ "range": { "rating": { "gte": decimal_json(*min) } } })
        }
        SearchFilter::Status(status) => json!({ "term": { "status": status.as_str() } }),
    }
}

fn sort_clauses(query: &SearchQuery) -> Value {
    let direction = query.direction().as_str();

    let field = match query.sort() {
        SortField::Relevance => {
            return json!([{ "_score": { "order": "desc" } }, { "id": { "order": "asc" } }]);
        }
        SortField::Name => NAME_KEYWORD_FIELD,
        SortField::Price => "price",
        SortField::CreatedAt => "createdAt",
        SortField::Views => "views",
        SortField::Rating => "rating",
        SortField::Discount => "discount",
    };

    json!([
        { field: { "order": direction, "missing": "_last" } },
        { "id": { "order": "asc" } }
    ])
}

fn decimal_json(value: Decimal) -> Value {
    json!(value.to_f64())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::domain::{
        catalog::models::CategoryId,
        search::query::{SearchRequest, SortDirection, SuggestRequest},
    };

    use super::*;

    #[test]
    fn misspelled_query_matches_name_fuzzily() -> TestResult {
        let query = SearchRequest::new("iphnoe").validate()?;

        let body = build_search_body(&query);
        let should = &body["query"]["bool"]["must"][0]["bool"]["should"];

        assert_eq!(
            should[0],
            json!({ "match": { "name": { "query": "iphnoe", "fuzziness": "AUTO", "boost": 1.0 } } })
        );
        assert_eq!(should[1]["match_phrase"]["name"]["boost"], json!(2.0));
        assert_eq!(should[2]["match"]["description"]["boost"], json!(1.5));
        assert_eq!(should[3]["match"]["categoryName"]["boost"], json!(1.2));
        assert_eq!(
            body["query"]["bool"]["must"][0]["bool"]["minimum_should_match"],
            json!(1)
        );

        Ok(())
    }

    #[test]
    fn filters_translate_to_clauses_after_active_term() -> TestResult {
        let query = SearchRequest {
            category_id: Some(CategoryId::from_i64(7)),
            min_price: Some(Decimal::from(10)),
            max_price: Some(Decimal::new(9_950, 2)),
            min_rating: Some(Decimal::new(35, 1)),
            status: Some("in_stock".to_string()),
            ..SearchRequest::new("lamp")
        }
        .validate()?;

        let body = build_search_body(&query);

        assert_eq!(
            body["query"]["bool"]["filter"],
            json!([
                { "term": { "isActive": true } },
                { "term": { "categoryId": 7 } },
                { "range": { "price": { "gte": 10.0, "lte": 99.5 } } },
                { "range": { "rating": { "gte": 3.5 } } },
                { "term": { "status": "in_stock" } }
            ])
        );

        Ok(())
    }

    #[test]
    fn relevance_sorts_by_score_then_identifier() -> TestResult {
        let body = build_search_body(&SearchRequest::new("lamp").validate()?);

        assert_eq!(
            body["sort"],
            json!([{ "_score": { "order": "desc" } }, { "id": { "order": "asc" } }])
        );

        Ok(())
    }

    #[test]
    fn name_sort_uses_keyword_subfield() -> TestResult {
        let query = SearchRequest {
            sort: Some(SortField::Name),
            direction: Some(SortDirection::Asc),
            ..SearchRequest::new("lamp")
        }
        .validate()?;

        let body = build_search_body(&query);

        assert_eq!(
            body["sort"][0],
            json!({ "name.keyword": { "order": "asc", "missing": "_last" } })
        );
        assert_eq!(body["sort"][1], json!({ "id": { "order": "asc" } }));

        Ok(())
    }

    #[test]
    fn page_maps_to_from_and_size_with_exact_totals() -> TestResult {
        let query = SearchRequest {
            page: Some(3),
            page_size: Some(25),
            ..SearchRequest::new("lamp")
        }
        .validate()?;

        let body = build_search_body(&query);

        assert_eq!(body["from"], json!(50));
        assert_eq!(body["size"], json!(25));
        assert_eq!(body["track_total_hits"], json!(true));
        assert_eq!(body["highlight"]["pre_tags"], json!(["<mark>"]));
        assert_eq!(body["highlight"]["post_tags"], json!(["</mark>"]));

        Ok(())
    }

    #[test]
    fn suggest_body_targets_completion_field() -> TestResult {
        let query = SuggestRequest {
            query: "  iph ".to_string(),
            limit: Some(5),
        }
        .validate()?;

        let body = build_suggest_body(&query);

        assert_eq!(
            body["suggest"]["product_suggest"],
            json!({
                "prefix": "iph",
                "completion": { "field": "name.suggest", "size": 5, "skip_duplicates": false }
            })
        );

        Ok(())
    }

    #[test]
    fn id_scan_resumes_after_the_last_id() {
        let first = build_id_scan_body(None, 1_000);
        let next = build_id_scan_body(Some(ProductId::from_i64(1_000)), 1_000);

        assert!(first.get("search_after").is_none());
        assert_eq!(first["sort"], json!([{ "id": "asc" }]));
        assert_eq!(next["search_after"], json!([1_000]));
        assert_eq!(next["size"], json!(1_000));
    }
}
