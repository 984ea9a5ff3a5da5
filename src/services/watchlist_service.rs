use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::price_provider::PriceProviderError;
use crate::models::{MarketQuoteResponse, QuoteError, SymbolPair, WatchlistEntry, WatchlistQuote};
use crate::services::price_service;
use crate::services::upstream_errors;
use crate::state::AppState;

/// Single-user watchlist kept in memory, in insertion order.
#[derive(Clone, Default)]
pub struct WatchlistStore {
    entries: Arc<RwLock<Vec<WatchlistEntry>>>,
}

impl WatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, pair: &SymbolPair) -> Result<WatchlistEntry, AppError> {
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.symbol == pair.display) {
            return Err(AppError::Conflict(format!("{} is already on the watchlist", pair.display)));
        }

        let entry = WatchlistEntry {
            symbol: pair.display.clone(),
            coin_id: pair.coin_id.clone(),
            added_at: Utc::now(),
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    pub fn remove(&self, symbol: &str) -> Result<(), AppError> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| !e.symbol.eq_ignore_ascii_case(symbol));
        if entries.len() == before {
            return Err(AppError::NotFound(format!("{} is not on the watchlist", symbol)));
        }
        Ok(())
    }

    pub fn list(&self) -> Vec<WatchlistEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

pub fn add_symbol(state: &AppState, symbol: &str) -> Result<WatchlistEntry, AppError> {
    let pair = state.symbols.resolve(symbol)?;
    let entry = state.watchlist.add(&pair)?;
    info!("Added {} to watchlist", entry.symbol);
    Ok(entry)
}

pub fn remove_symbol(state: &AppState, symbol: &str) -> Result<(), AppError> {
    // Accept coin ids too, falling back to the raw input for symbols no longer registered
    let display_symbol = state
        .symbols
        .resolve(symbol)
        .map(|p| p.display)
        .unwrap_or_else(|_| symbol.trim().to_uppercase());
    state.watchlist.remove(&display_symbol)?;
    info!("Removed {} from watchlist", display_symbol);
    Ok(())
}

/// Live quotes for every watchlist entry, fetched concurrently.
///
/// A failed quote is reported on its own entry and never fails the whole list.
pub async fn get_quotes(state: &AppState) -> Vec<WatchlistQuote> {
    let entries = state.watchlist.list();

    let fetches = entries.iter().map(|entry| async move {
        match price_service::fetch_live(state, &entry.coin_id).await {
            Ok(data) => WatchlistQuote {
                symbol: entry.symbol.clone(),
                added_at: entry.added_at,
                quote: Some(MarketQuoteResponse::new(&entry.symbol, &entry.coin_id, data)),
                error: None,
            },
            Err(e) => {
                warn!("Quote for watchlist symbol {} failed: {}", entry.symbol, e);
                WatchlistQuote {
                    symbol: entry.symbol.clone(),
                    added_at: entry.added_at,
                    quote: None,
                    error: Some(quote_error(&e)),
                }
            }
        }
    });

    join_all(fetches).await
}

fn quote_error(err: &AppError) -> QuoteError {
    match err {
        AppError::MarketData(e) => QuoteError {
            kind: e.kind().as_str().to_string(),
            message: upstream_errors::user_message_for(e),
        },
        AppError::RateLimited => QuoteError {
            kind: "service_error".to_string(),
            message: upstream_errors::user_message_for(&PriceProviderError::RateLimited),
        },
        other => QuoteError {
            kind: "service_error".to_string(),
            message: other.to_string(),
        },
    }
}
