use std::sync::Arc;

use crate::config::AppConfig;
use crate::external::price_provider::PriceProvider;
use crate::services::alert_service::AlertStore;
use crate::services::failure_cache::FailureCache;
use crate::services::preference_service::ForecastPreferences;
use crate::services::rate_limiter::RateLimiter;
use crate::services::symbol_service::SymbolRegistry;
use crate::services::watchlist_service::WatchlistStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub price_provider: Arc<dyn PriceProvider>,
    pub failure_cache: FailureCache,
    pub rate_limiter: Arc<RateLimiter>,
    pub symbols: Arc<SymbolRegistry>,
    pub watchlist: WatchlistStore,
    pub alerts: AlertStore,
    pub preferences: ForecastPreferences,
}

impl AppState {
    pub fn new(config: AppConfig, price_provider: Arc<dyn PriceProvider>) -> Self {
        let rate_limiter = RateLimiter::new(config.max_concurrent_requests, config.requests_per_minute);
        let symbols = SymbolRegistry::with_extra(config.extra_symbols.clone());

        Self {
            config: Arc::new(config),
            price_provider,
            failure_cache: FailureCache::new(),
            rate_limiter: Arc::new(rate_limiter),
            symbols: Arc::new(symbols),
            watchlist: WatchlistStore::new(),
            alerts: AlertStore::new(),
            preferences: ForecastPreferences::new(),
        }
    }
}
