use serde::{Deserialize, Serialize};

/// Maps a ticker-style display symbol (e.g. `BTC`) to the provider's coin id
/// (e.g. `bitcoin`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolPair {
    pub display: String,
    pub coin_id: String,
}

impl SymbolPair {
    pub fn new(display: impl Into<String>, coin_id: impl Into<String>) -> Self {
        Self {
            display: display.into().to_uppercase(),
            coin_id: coin_id.into().to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolSearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolListResponse {
    pub total: usize,
    pub symbols: Vec<SymbolPair>,
}
