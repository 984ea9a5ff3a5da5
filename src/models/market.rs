use serde::{Deserialize, Serialize};

use crate::models::PriceSample;
use crate::utils::format::{format_market_cap, format_percent, format_price};

/// Live quote for a single coin, USD denominated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMarketData {
    pub price: f64,
    pub change_24h: Option<f64>,
    pub market_cap: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketQuoteResponse {
    pub symbol: String,
    pub coin_id: String,
    pub price: f64,
    pub change_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub price_display: String,
    pub change_24h_display: Option<String>,
    pub market_cap_display: Option<String>,
}

impl MarketQuoteResponse {
    pub fn new(symbol: &str, coin_id: &str, data: LiveMarketData) -> Self {
        Self {
            symbol: symbol.to_string(),
            coin_id: coin_id.to_string(),
            price: data.price,
            change_24h: data.change_24h,
            market_cap: data.market_cap,
            price_display: format_price(data.price),
            change_24h_display: data.change_24h.map(format_percent),
            market_cap_display: data.market_cap.map(format_market_cap),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceHistoryResponse {
    pub symbol: String,
    pub coin_id: String,
    pub days: u32,
    pub samples: Vec<PriceSample>,
}
