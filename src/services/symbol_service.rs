use tracing::warn;

use crate::errors::AppError;
use crate::models::SymbolPair;

const DEFAULT_SYMBOLS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("ADA", "cardano"),
    ("XRP", "ripple"),
    ("DOT", "polkadot"),
    ("DOGE", "dogecoin"),
    ("AVAX", "avalanche-2"),
    ("LINK", "chainlink"),
];

/// Known display symbols and their provider coin ids, in registration order.
#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    pairs: Vec<SymbolPair>,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::with_extra(Vec::new())
    }
}

impl SymbolRegistry {
    /// Default pairs followed by `extra`. An extra pair reusing a known display
    /// symbol is skipped.
    pub fn with_extra(extra: Vec<SymbolPair>) -> Self {
        let mut pairs: Vec<SymbolPair> = DEFAULT_SYMBOLS
            .iter()
            .map(|(display, coin_id)| SymbolPair::new(*display, *coin_id))
            .collect();

        for pair in extra {
            if pairs.iter().any(|p| p.display == pair.display) {
                warn!("Ignoring duplicate symbol {} ({})", pair.display, pair.coin_id);
                continue;
            }
            pairs.push(pair);
        }

        Self { pairs }
    }

    pub fn list(&self) -> &[SymbolPair] {
        &self.pairs
    }

    pub fn count(&self) -> usize {
        self.pairs.len()
    }

    /// Looks up by display symbol or coin id, case-insensitively.
    pub fn resolve(&self, symbol: &str) -> Result<SymbolPair, AppError> {
        let needle = symbol.trim();
        if needle.is_empty() {
            return Err(AppError::Validation("symbol must not be empty".to_string()));
        }

        self.pairs
            .iter()
            .find(|p| p.display.eq_ignore_ascii_case(needle) || p.coin_id.eq_ignore_ascii_case(needle))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Unknown symbol: {}", needle)))
    }

    /// Substring match against display symbol and coin id. An empty query lists everything.
    pub fn search(&self, query: &str) -> Vec<SymbolPair> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.pairs.clone();
        }

        self.pairs
            .iter()
            .filter(|p| {
                p.display.to_lowercase().contains(&query) || p.coin_id.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }
}
