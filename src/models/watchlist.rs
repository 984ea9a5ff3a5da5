use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::MarketQuoteResponse;

// ==============================================================================
// Watchlist Models
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub coin_id: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddWatchlistItemRequest {
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchlistResponse {
    pub item_count: usize,
    pub items: Vec<WatchlistEntry>,
}

// ==============================================================================
// Watchlist Quote Models
// ==============================================================================

/// A watchlist entry with its live quote, or the reason the quote is missing.
#[derive(Debug, Clone, Serialize)]
pub struct WatchlistQuote {
    pub symbol: String,
    pub added_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<MarketQuoteResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<QuoteError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteError {
    pub kind: String,
    pub message: String,
}
