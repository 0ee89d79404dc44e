//! Search and suggestion results.
//!
//! Both backends produce these exact shapes so callers cannot tell which one
//! answered.

use serde::Serialize;

use crate::{domain::search::documents::SearchDocument, pagination::Pagination};

/// Highlighted fragments per searchable field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlights {
    pub name: Vec<String>,
    pub description: Vec<String>,
    pub category_name: Vec<String>,
}

impl Highlights {
    /// One unmarked fragment per field holding its literal value.
    pub fn literal(document: &SearchDocument) -> Self {
        Self {
            name: vec![document.name.clone()],
            description: vec![document.description.clone()],
            category_name: vec![document.category_name.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub product: SearchDocument,
    pub score: f64,
    pub highlights: Highlights,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub products: Vec<SearchHit>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub text: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionPage {
    pub products: Vec<Suggestion>,
    pub pagination: Pagination,
}

impl SuggestionPage {
    pub fn new(suggestions: Vec<Suggestion>, limit: u32) -> Self {
        let pagination = Pagination::single(limit, suggestions.len() as u64);

        Self {
            products: suggestions,
            pagination,
        }
    }
}
