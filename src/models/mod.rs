mod price_sample;
mod market;
mod symbol;
pub mod forecast;
pub mod watchlist;
pub mod alert;

pub use price_sample::{sort_samples, PriceSample};
pub use market::{LiveMarketData, MarketQuoteResponse, PriceHistoryResponse};
pub use symbol::{SymbolListResponse, SymbolPair, SymbolSearchParams};
pub use forecast::{
    ForecastMethod, ForecastMethodPreference, ForecastOutput, ForecastParams, ForecastSeriesPoint, ForecastStatistics,
    SetForecastMethodRequest, SymbolForecastResponse,
};
pub use watchlist::{AddWatchlistItemRequest, QuoteError, WatchlistEntry, WatchlistQuote, WatchlistResponse};
pub use alert::{
    AlertDirection, AlertEvent, AlertEventKind, AlertQueryParams, AlertSettings, CreateAlertRequest,
    PriceAlert,
};
