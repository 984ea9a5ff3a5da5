use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{LiveMarketData, PriceSample};

/// Offline provider producing a reproducible random walk per coin.
///
/// The same coin id always yields the same price path, so charts and
/// forecasts are stable across restarts when running without network access.
#[derive(Debug, Clone, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }

    fn seed_for(coin_id: &str) -> u64 {
        // FNV-1a
        coin_id.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
            (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        })
    }

    fn base_price(coin_id: &str) -> f64 {
        match coin_id {
            "bitcoin" => 60_000.0,
            "ethereum" => 3_000.0,
            "solana" => 150.0,
            "avalanche-2" => 35.0,
            "chainlink" => 15.0,
            "polkadot" => 7.0,
            "ripple" => 0.55,
            "cardano" => 0.45,
            "dogecoin" => 0.15,
            other => 1.0 + (Self::seed_for(other) % 10_000) as f64 / 100.0,
        }
    }

    /// Daily closes oldest-first, ending at today's midnight UTC.
    ///
    /// The walk runs backwards from today's base price, so every window
    /// length shares the same recent prices.
    fn walk(coin_id: &str, days: u32) -> Vec<PriceSample> {
        let mut rng = StdRng::seed_from_u64(Self::seed_for(coin_id));
        let today = Utc::now().date_naive();
        let mut price = Self::base_price(coin_id);

        let mut samples = Vec::with_capacity(days as usize + 1);
        for back in 0..=days as i64 {
            let day = today - Duration::days(back);
            let timestamp = day
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis())
                .unwrap_or_default();

            samples.push(PriceSample::new(timestamp, price));
            price /= 1.0 + (rng.random::<f64>() - 0.5) * 0.06;
        }
        samples.reverse();
        samples
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    async fn fetch_price_history(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<Vec<PriceSample>, PriceProviderError> {
        if coin_id.trim().is_empty() {
            return Err(PriceProviderError::NoData(coin_id.to_string()));
        }
        Ok(Self::walk(coin_id, days))
    }

    async fn fetch_live_market(&self, coin_id: &str) -> Result<LiveMarketData, PriceProviderError> {
        let samples = Self::walk(coin_id, 1);
        let (Some(previous), Some(latest)) = (samples.first(), samples.last()) else {
            return Err(PriceProviderError::NoData(coin_id.to_string()));
        };

        let change_24h = (latest.price - previous.price) / previous.price * 100.0;
        Ok(LiveMarketData {
            price: latest.price,
            change_24h: Some(change_24h),
            market_cap: Some(latest.price * 19_000_000.0),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_is_reproducible() {
        let provider = MockProvider::new();

        let first = provider.fetch_price_history("bitcoin", 30).await.unwrap();
        let second = provider.fetch_price_history("bitcoin", 30).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 31);
    }

    #[tokio::test]
    async fn test_history_is_ascending_and_daily() {
        let samples = MockProvider::new().fetch_price_history("solana", 10).await.unwrap();

        for pair in samples.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, 86_400_000);
        }
        assert!(samples.iter().all(|s| s.price > 0.0));
    }

    #[tokio::test]
    async fn test_live_quote_has_change() {
        let quote = MockProvider::new().fetch_live_market("ethereum").await.unwrap();

        assert!(quote.price > 0.0);
        assert!(quote.change_24h.is_some());
    }

    #[tokio::test]
    async fn test_live_price_matches_latest_close() {
        let provider = MockProvider::new();

        let history = provider.fetch_price_history("cardano", 14).await.unwrap();
        let quote = provider.fetch_live_market("cardano").await.unwrap();

        assert_eq!(history.last().unwrap().price, quote.price);
    }

    #[tokio::test]
    async fn test_blank_coin_id_is_no_data() {
        let err = MockProvider::new().fetch_price_history(" ", 5).await.unwrap_err();
        assert!(matches!(err, PriceProviderError::NoData(_)));
    }
}
