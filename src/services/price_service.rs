use std::future::Future;

use tokio::time::{sleep as async_sleep, Duration};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::external::price_provider::PriceProviderError;
use crate::models::{LiveMarketData, PriceSample};
use crate::state::AppState;

/// Daily price history for `coin_id`, ascending by timestamp.
pub async fn fetch_history(
    state: &AppState,
    coin_id: &str,
    days: u32,
) -> Result<Vec<PriceSample>, AppError> {
    let key = format!("history:{}:{}", coin_id, days);
    let provider = state.price_provider.clone();

    let samples = fetch_with_retry(state, &key, coin_id, || {
        let provider = provider.clone();
        async move { provider.fetch_price_history(coin_id, days).await }
    })
    .await?;

    info!("✓ Fetched {} price samples for {} ({} days)", samples.len(), coin_id, days);
    Ok(samples)
}

pub async fn fetch_live(state: &AppState, coin_id: &str) -> Result<LiveMarketData, AppError> {
    let key = format!("live:{}", coin_id);
    let provider = state.price_provider.clone();

    fetch_with_retry(state, &key, coin_id, || {
        let provider = provider.clone();
        async move { provider.fetch_live_market(coin_id).await }
    })
    .await
}

/// Runs one provider call behind the failure cache and rate limiter.
///
/// `RateLimited` responses are retried with linear backoff
/// (`retry_base_delay_ms * attempt`); any other error is final.
async fn fetch_with_retry<T, F, Fut>(
    state: &AppState,
    cache_key: &str,
    coin_id: &str,
    mut call: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PriceProviderError>>,
{
    if let Some(failure) = state.failure_cache.is_failed(cache_key) {
        info!(
            "⚠️ Skipping API call for {} - in failure cache ({}). Will retry after {}",
            cache_key,
            failure.error,
            failure.expires_at()
        );
        return Err(into_app_error(failure.error));
    }

    let max_retries = state.config.max_fetch_retries;
    let base_delay_ms = state.config.retry_base_delay_ms;
    let mut retry_count = 0;

    loop {
        let result = {
            let _guard = state.rate_limiter.acquire().await?;
            call().await
        };

        match result {
            Ok(value) => {
                state.failure_cache.clear(cache_key);
                return Ok(value);
            }
            Err(PriceProviderError::RateLimited) if retry_count < max_retries => {
                retry_count += 1;
                let delay = Duration::from_millis(base_delay_ms * retry_count as u64);
                warn!(
                    "Rate limited fetching {}, retrying in {}ms (attempt {}/{})",
                    coin_id,
                    delay.as_millis(),
                    retry_count,
                    max_retries
                );
                async_sleep(delay).await;
            }
            Err(e) => {
                state.failure_cache.record_failure(cache_key, e.clone());
                error!("✗ Failed to fetch {} from {}: {}", cache_key, state.price_provider.name(), e);
                return Err(into_app_error(e));
            }
        }
    }
}

fn into_app_error(err: PriceProviderError) -> AppError {
    match err {
        PriceProviderError::RateLimited => AppError::RateLimited,
        other => AppError::MarketData(other),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::config::AppConfig;
    use crate::external::price_provider::PriceProvider;

    /// Fails with the queued errors, then succeeds.
    struct FlakyProvider {
        failures: parking_lot::Mutex<Vec<PriceProviderError>>,
        calls: AtomicUsize,
    }

    impl FlakyProvider {
        fn new(failures: Vec<PriceProviderError>) -> Self {
            Self {
                failures: parking_lot::Mutex::new(failures),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PriceProvider for FlakyProvider {
        async fn fetch_price_history(
            &self,
            _coin_id: &str,
            _days: u32,
        ) -> Result<Vec<PriceSample>, PriceProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.failures.lock().pop() {
                return Err(err);
            }
            Ok(vec![PriceSample::new(0, 1.0), PriceSample::new(86_400_000, 2.0)])
        }

        async fn fetch_live_market(&self, _coin_id: &str) -> Result<LiveMarketData, PriceProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.failures.lock().pop() {
                return Err(err);
            }
            Ok(LiveMarketData { price: 10.0, change_24h: None, market_cap: None })
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn state_with(provider: Arc<FlakyProvider>) -> AppState {
        let config = AppConfig {
            retry_base_delay_ms: 1,
            requests_per_minute: 60_000,
            ..AppConfig::default()
        };
        AppState::new(config, provider)
    }

    #[tokio::test]
    async fn test_rate_limited_is_retried() {
        let provider = Arc::new(FlakyProvider::new(vec![PriceProviderError::RateLimited]));
        let state = state_with(provider.clone());

        let samples = fetch_history(&state, "bitcoin", 30).await.unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_rate_limit() {
        let provider = Arc::new(FlakyProvider::new(vec![PriceProviderError::RateLimited; 5]));
        let state = state_with(provider.clone());

        let err = fetch_live(&state, "bitcoin").await.unwrap_err();

        assert!(matches!(err, AppError::RateLimited));
        // one initial attempt plus the default two retries
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failure_is_cached_and_short_circuits() {
        let provider = Arc::new(FlakyProvider::new(vec![PriceProviderError::NoData("nope".into())]));
        let state = state_with(provider.clone());

        let first = fetch_history(&state, "nope", 30).await.unwrap_err();
        let second = fetch_history(&state, "nope", 30).await.unwrap_err();

        assert!(matches!(first, AppError::MarketData(PriceProviderError::NoData(_))));
        assert!(matches!(second, AppError::MarketData(PriceProviderError::NoData(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_history_failure_cached_per_window() {
        let provider = Arc::new(FlakyProvider::new(vec![PriceProviderError::NoData("bitcoin".into())]));
        let state = state_with(provider.clone());

        assert!(fetch_history(&state, "bitcoin", 2).await.is_err());
        assert!(fetch_history(&state, "bitcoin", 30).await.is_ok());
        assert!(state.failure_cache.is_failed("history:bitcoin:2").is_some());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_history_and_live_cached_separately() {
        let provider = Arc::new(FlakyProvider::new(vec![PriceProviderError::Parse("bad".into())]));
        let state = state_with(provider.clone());

        assert!(fetch_history(&state, "bitcoin", 30).await.is_err());
        assert!(fetch_live(&state, "bitcoin").await.is_ok());
    }
}
