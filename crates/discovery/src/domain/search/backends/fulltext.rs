//! Full-text backend over the search index.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::{
    domain::search::{
        backends::{BackendKind, SearchBackend},
        errors::BackendError,
        index::{
            SearchIndex,
            query_builder::{SUGGESTER_NAME, build_search_body, build_suggest_body},
            response::Hit,
        },
        query::{SearchQuery, SuggestQuery},
        results::{Highlights, SearchHit, SearchPage, Suggestion},
    },
    pagination::Pagination,
};

/// Relevance-ranked search and completion backed by the search index.
#[derive(Clone)]
pub struct FullTextBackend {
    index: Arc<dyn SearchIndex>,
}

impl FullTextBackend {
    #[must_use]
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl SearchBackend for FullTextBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::FullText
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, BackendError> {
        let response = self.index.search(&build_search_body(query)).await?;

        let total = response
            .hits
            .total
            .map_or(response.hits.hits.len() as u64, |total| total.value);

        let products = response.hits.hits.into_iter().map(into_search_hit).collect();

        Ok(SearchPage {
            products,
            pagination: Pagination::new(query.page(), total),
        })
    }

    async fn suggest(&self, query: &SuggestQuery) -> Result<Vec<Suggestion>, BackendError> {
        let mut response = self.index.search(&build_suggest_body(query)).await?;

        let suggestions = response
            .suggest
            .remove(SUGGESTER_NAME)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|entry| entry.options)
            .map(|option| Suggestion {
                text: option.text,
                score: option.score,
            })
            .collect();

        Ok(suggestions)
    }
}

fn into_search_hit(hit: Hit) -> SearchHit {
    let mut highlight = hit.highlight;

    SearchHit {
        product: hit.source,
        score: hit.score.unwrap_or_default(),
        highlights: Highlights {
            name: take_fragments(&mut highlight, "name"),
            description: take_fragments(&mut highlight, "description"),
            category_name: take_fragments(&mut highlight, "categoryName"),
        },
    }
}

fn take_fragments(highlight: &mut HashMap<String, Vec<String>>, field: &str) -> Vec<String> {
    highlight.remove(field).unwrap_or_default()
}
