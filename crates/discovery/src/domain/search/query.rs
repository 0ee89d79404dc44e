//! Search and suggestion inputs.
//!
//! Raw requests arrive as [`SearchRequest`] / [`SuggestRequest`] and are
//! validated exactly once into [`SearchQuery`] / [`SuggestQuery`]. Backends
//! only ever see the validated form.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    domain::{
        catalog::models::{CatalogProduct, CategoryId, ProductStatus},
        validation::{self, MAX_PAGE_SIZE, MAX_RESULT_WINDOW, ValidationError},
    },
    pagination::PageRequest,
};

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Suggestion count used when the caller does not supply one.
pub const DEFAULT_SUGGESTION_LIMIT: u32 = 10;

/// Largest accepted suggestion count.
pub const MAX_SUGGESTION_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Relevance,
    Name,
    Price,
    CreatedAt,
    Views,
    Rating,
    Discount,
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "relevance" => Ok(Self::Relevance),
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "views" => Ok(Self::Views),
            "rating" => Ok(Self::Rating),
            "discount" => Ok(Self::Discount),
            other => Err(ValidationError::UnknownSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ValidationError::UnknownSortDirection(other.to_string())),
        }
    }
}

/// A structured filter, translated per backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchFilter {
    Category(CategoryId),
    PriceRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    MinRating(Decimal),
    Status(ProductStatus),
}

impl SearchFilter {
    /// Whether `candidate` satisfies this filter.
    pub fn accepts(&self, candidate: &CatalogProduct) -> bool {
        let product = &candidate.product;

        match self {
            Self::Category(category) => product.category_id == *category,
            Self::PriceRange { min, max } => {
                min.is_none_or(|min| product.price >= min)
                    && max.is_none_or(|max| product.price <= max)
            }
            Self::MinRating(min) => product.rating.is_some_and(|rating| rating >= *min),
            Self::Status(status) => product.status == *status,
        }
    }
}

/// Unvalidated search input as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub query: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<Decimal>,
    pub status: Option<String>,
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Validates the request into a [`SearchQuery`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty query, an out-of-range page
    /// or page size, a page reaching past [`MAX_RESULT_WINDOW`], a negative
    /// or inverted price range, a rating outside `0..=5`, or an unknown
    /// status.
    pub fn validate(self) -> Result<SearchQuery, ValidationError> {
        let text = self.query.trim();

        if text.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        let page = validation::page_request(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            MAX_PAGE_SIZE,
        )?;

        if page.offset() + u64::from(page.per_page()) > MAX_RESULT_WINDOW {
            return Err(ValidationError::PageTooDeep {
                max: MAX_RESULT_WINDOW,
            });
        }

        let mut filters = SmallVec::new();

        if let Some(category) = self.category_id {
            filters.push(SearchFilter::Category(category));
        }

        if self.min_price.is_some() || self.max_price.is_some() {
            if self.min_price.is_some_and(|min| min.is_sign_negative())
                || self.max_price.is_some_and(|max| max.is_sign_negative())
            {
                return Err(ValidationError::NegativePrice);
            }

            if let (Some(min), Some(max)) = (self.min_price, self.max_price)
                && min > max
            {
                return Err(ValidationError::InvertedPriceRange);
            }

            filters.push(SearchFilter::PriceRange {
                min: self.min_price,
                max: self.max_price,
            });
        }

        if let Some(min_rating) = self.min_rating {
            filters.push(SearchFilter::MinRating(validation::rating(min_rating)?));
        }

        if let Some(status) = self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filters.push(SearchFilter::Status(status.parse()?));
        }

        Ok(SearchQuery {
            text: text.to_string(),
            page,
            filters,
            sort: self.sort.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
        })
    }
}

/// A validated search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    text: String,
    page: PageRequest,
    filters: SmallVec<[SearchFilter; 4]>,
    sort: SortField,
    direction: SortDirection,
}

impl SearchQuery {
    /// The trimmed query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn page(&self) -> PageRequest {
        self.page
    }

    pub fn filters(&self) -> &[SearchFilter] {
        &self.filters
    }

    pub const fn sort(&self) -> SortField {
        self.sort
    }

    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Whether `candidate` is discoverable under this query's filters.
    ///
    /// Text matching is backend specific and not considered here.
    pub fn admits(&self, candidate: &CatalogProduct) -> bool {
        candidate.product.is_active && self.filters.iter().all(|filter| filter.accepts(candidate))
    }
}

/// Unvalidated completion input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SuggestRequest {
    pub query: String,
    pub limit: Option<u32>,
}

impl SuggestRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: None,
        }
    }

    /// Validates the request into a [`SuggestQuery`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty prefix or a limit outside
    /// `1..=20`.
    pub fn validate(self) -> Result<SuggestQuery, ValidationError> {
        let prefix = self.query.trim();

        if prefix.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        let limit = validation::bounded(
            "limit",
            self.limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT),
            1,
            MAX_SUGGESTION_LIMIT,
        )?;

        Ok(SuggestQuery {
            prefix: prefix.to_string(),
            limit,
        })
    }
}

/// A validated completion lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestQuery {
    prefix: String,
    limit: u32,
}

impl SuggestQuery {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }
}
