use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::AppConfig;
use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::external::response_parser::{parse_historical_response, parse_live_market_response};
use crate::models::{LiveMarketData, PriceSample};

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

pub struct CoinGeckoProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PriceProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PriceProviderError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, PriceProviderError> {
        Self::new(
            config.coingecko_base_url.clone(),
            config.coingecko_api_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Sends a GET and returns the raw body; HTTP-level failures are mapped here,
    /// payload-level failures are left to the response parser.
    async fn get_body(
        &self,
        path: &str,
        query: &[(&str, String)],
        coin_id: &str,
    ) -> Result<String, PriceProviderError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("CoinGecko GET {} {:?}", url, query);

        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PriceProviderError::Network(format!("request timed out: {}", e))
            } else {
                PriceProviderError::Network(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceProviderError::NoData(coin_id.to_string()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(PriceProviderError::Service(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    async fn fetch_price_history(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<Vec<PriceSample>, PriceProviderError> {
        let path = format!("/coins/{}/market_chart", coin_id);
        let query = [
            ("vs_currency", "usd".to_string()),
            ("days", days.to_string()),
            ("interval", "daily".to_string()),
        ];

        let body = self.get_body(&path, &query, coin_id).await?;
        parse_historical_response(&body).into_result(coin_id)
    }

    async fn fetch_live_market(&self, coin_id: &str) -> Result<LiveMarketData, PriceProviderError> {
        let query = [
            ("ids", coin_id.to_string()),
            ("vs_currencies", "usd".to_string()),
            ("include_24hr_change", "true".to_string()),
            ("include_market_cap", "true".to_string()),
        ];

        let body = self.get_body("/simple/price", &query, coin_id).await?;
        parse_live_market_response(&body, coin_id).into_result(coin_id)
    }

    fn name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = CoinGeckoProvider::new(
            "https://api.coingecko.com/api/v3/",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(provider.base_url, "https://api.coingecko.com/api/v3");
        assert_eq!(provider.name(), "coingecko");
    }

    #[test]
    fn test_from_config_carries_api_key() {
        let config = AppConfig {
            coingecko_api_key: Some("demo-key".to_string()),
            ..AppConfig::default()
        };
        let provider = CoinGeckoProvider::from_config(&config).unwrap();
        assert_eq!(provider.api_key.as_deref(), Some("demo-key"));
    }
}
