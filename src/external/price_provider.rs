use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::{LiveMarketData, PriceSample};

/// Closed taxonomy callers branch on when a fetch does not produce samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NoData,
    ParseError,
    ServiceError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NoData => "no_data",
            FailureKind::ParseError => "parse_error",
            FailureKind::ServiceError => "service_error",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service error: {0}")]
    Service(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no data available for {0}")]
    NoData(String),

    #[error("rate limited")]
    RateLimited,
}

impl PriceProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PriceProviderError::NoData(_) => FailureKind::NoData,
            PriceProviderError::Parse(_) => FailureKind::ParseError,
            PriceProviderError::Network(_)
            | PriceProviderError::Service(_)
            | PriceProviderError::RateLimited => FailureKind::ServiceError,
        }
    }
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily price samples for `coin_id`, ascending by timestamp.
    async fn fetch_price_history(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<Vec<PriceSample>, PriceProviderError>;

    async fn fetch_live_market(
        &self,
        coin_id: &str,
    ) -> Result<LiveMarketData, PriceProviderError>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(PriceProviderError::NoData("bitcoin".into()).kind(), FailureKind::NoData);
        assert_eq!(PriceProviderError::Parse("bad".into()).kind(), FailureKind::ParseError);
        assert_eq!(PriceProviderError::RateLimited.kind(), FailureKind::ServiceError);
        assert_eq!(PriceProviderError::Network("down".into()).kind(), FailureKind::ServiceError);
        assert_eq!(PriceProviderError::Service("500".into()).kind(), FailureKind::ServiceError);
    }
}
