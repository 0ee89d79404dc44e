//! View Tracking Models

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

use crate::{
    domain::catalog::models::{ProductId, ProductSummary},
    ids::TypedId,
    pagination::Pagination,
};

/// Marker for accounts owned by the identity service.
#[derive(Debug)]
pub enum User {}

/// User identifier
pub type UserId = TypedId<User>;

/// View event identifier
pub type ViewEventId = TypedId<ViewEvent>;

/// One accepted product view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEvent {
    pub id: ViewEventId,
    pub user_id: Option<UserId>,
    pub product_id: ProductId,
    pub ip_address: String,
    pub user_agent: String,
    pub session_id: Option<String>,
    pub viewed_at: Timestamp,
}

/// A view event about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewViewEvent {
    pub user_id: Option<UserId>,
    pub product_id: ProductId,
    pub ip_address: String,
    pub user_agent: String,
    pub session_id: Option<String>,
    pub viewed_at: Timestamp,
}

/// Unvalidated view input as received from a caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Result of a view request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_id: Option<ViewEventId>,
    pub product_id: ProductId,
    pub is_new_view: bool,
}

/// What the store did with a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Stored, and the product counter was incremented.
    Recorded(ViewEvent),
    /// Suppressed as a repeat of this earlier event.
    Duplicate(ViewEvent),
}

/// A product in a visitor's history with the time it was last viewed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub product: ProductSummary,
    pub viewed_at: Timestamp,
}

/// One page of collapsed history entries and the number of distinct
/// products in the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryRecords {
    pub entries: Vec<HistoryEntry>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub history: Vec<HistoryEntry>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopViewedProduct {
    pub product_id: ProductId,
    pub name: String,
    pub views: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyViews {
    pub date: Date,
    pub views: u64,
}

/// Raw aggregates over a window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewCounts {
    pub total_views: u64,
    pub unique_products: u64,
    pub top_products: Vec<TopViewedProduct>,
    pub daily_views: Vec<DailyViews>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    pub total_views: u64,
    pub unique_products: u64,
    pub top_products: Vec<TopViewedProduct>,
    pub daily_views: Vec<DailyViews>,
    pub window_days: u32,
}

impl ViewStats {
    pub fn new(counts: ViewCounts, window_days: u32) -> Self {
        Self {
            total_views: counts.total_views,
            unique_products: counts.unique_products,
            top_products: counts.top_products,
            daily_views: counts.daily_views,
            window_days,
        }
    }
}
