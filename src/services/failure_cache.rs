use std::sync::Arc;
use chrono::{DateTime, Utc, Duration};
use dashmap::DashMap;

use crate::external::price_provider::{FailureKind, PriceProviderError};

/// A failed upstream fetch remembered until its TTL runs out
#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error: PriceProviderError,
    pub ttl: Duration,
}

impl FailureInfo {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.failed_at + self.ttl
    }
}

/// Short-circuits repeated fetches for keys that just failed.
///
/// Keys are free-form; the price service uses `"<endpoint>:<coin-id>"`.
#[derive(Clone, Default)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn ttl_for(error: &PriceProviderError) -> Duration {
        match error {
            PriceProviderError::RateLimited => Duration::minutes(1),
            _ => match error.kind() {
                FailureKind::NoData => Duration::minutes(30),
                FailureKind::ParseError => Duration::minutes(10),
                FailureKind::ServiceError => Duration::minutes(2),
            },
        }
    }

    /// Returns the remembered failure if it is still within its TTL
    pub fn is_failed(&self, key: &str) -> Option<FailureInfo> {
        let info = self.cache.get(key)?.value().clone();
        if Utc::now() < info.expires_at() {
            return Some(info);
        }
        self.cache.remove(key);
        None
    }

    pub fn record_failure(&self, key: &str, error: PriceProviderError) {
        let info = FailureInfo {
            failed_at: Utc::now(),
            ttl: Self::ttl_for(&error),
            error,
        };
        self.cache.insert(key.to_string(), info);
    }

    pub fn clear(&self, key: &str) {
        self.cache.remove(key);
    }

    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.cache.len();
        self.cache.retain(|_, info| now < info.expires_at());
        before - self.cache.len()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
