use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::models::forecast::{MAX_FORECAST_HORIZON, MAX_MOVING_AVERAGE_PERIOD};
use crate::models::SymbolPair;
use crate::services::forecasting_service::{MAX_HISTORY_DAYS, MIN_HISTORY_DAYS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("{0}")]
    Constraint(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    CoinGecko,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coingecko" => Ok(ProviderKind::CoinGecko),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub provider: ProviderKind,
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub requests_per_minute: u32,
    pub max_fetch_retries: u32,
    pub retry_base_delay_ms: u64,
    pub default_history_days: u32,
    pub default_ma_period: usize,
    pub default_forecast_horizon: usize,
    pub alerts_enabled: bool,
    pub alert_check_schedule: String,
    pub extra_symbols: Vec<SymbolPair>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            provider: ProviderKind::CoinGecko,
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            coingecko_api_key: None,
            request_timeout_secs: 15,
            max_concurrent_requests: 3,
            // CoinGecko public tier allows roughly 30 calls per minute
            requests_per_minute: 30,
            max_fetch_retries: 2,
            retry_base_delay_ms: 2_000,
            default_history_days: 30,
            default_ma_period: 7,
            default_forecast_horizon: 5,
            alerts_enabled: true,
            alert_check_schedule: "0 */5 * * * *".to_string(),
            extra_symbols: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            bind_addr: env_parse("BIND_ADDR", defaults.bind_addr)?,
            provider: env_parse("MARKET_DATA_PROVIDER", defaults.provider)?,
            coingecko_base_url: std::env::var("COINGECKO_BASE_URL")
                .unwrap_or(defaults.coingecko_base_url),
            coingecko_api_key: std::env::var("COINGECKO_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            max_concurrent_requests: env_parse("MAX_CONCURRENT_REQUESTS", defaults.max_concurrent_requests)?,
            requests_per_minute: env_parse("REQUESTS_PER_MINUTE", defaults.requests_per_minute)?,
            max_fetch_retries: env_parse("MAX_FETCH_RETRIES", defaults.max_fetch_retries)?,
            retry_base_delay_ms: env_parse("RETRY_BASE_DELAY_MS", defaults.retry_base_delay_ms)?,
            default_history_days: env_parse("DEFAULT_HISTORY_DAYS", defaults.default_history_days)?,
            default_ma_period: env_parse("DEFAULT_MA_PERIOD", defaults.default_ma_period)?,
            default_forecast_horizon: env_parse("DEFAULT_FORECAST_HORIZON", defaults.default_forecast_horizon)?,
            alerts_enabled: env_parse("ALERTS_ENABLED", defaults.alerts_enabled)?,
            alert_check_schedule: std::env::var("ALERT_CHECK_SCHEDULE")
                .unwrap_or(defaults.alert_check_schedule),
            extra_symbols: match std::env::var("EXTRA_SYMBOLS") {
                Ok(raw) => parse_symbol_pairs(&raw)?,
                Err(_) => Vec::new(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.coingecko_base_url).map_err(|_| ConfigError::Invalid {
            key: "COINGECKO_BASE_URL",
            value: self.coingecko_base_url.clone(),
        })?;

        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Constraint("MAX_CONCURRENT_REQUESTS must be at least 1".into()));
        }
        if self.requests_per_minute == 0 {
            return Err(ConfigError::Constraint("REQUESTS_PER_MINUTE must be at least 1".into()));
        }
        if !(MIN_HISTORY_DAYS..=MAX_HISTORY_DAYS).contains(&self.default_history_days) {
            return Err(ConfigError::Constraint(format!(
                "DEFAULT_HISTORY_DAYS must be between {} and {}",
                MIN_HISTORY_DAYS, MAX_HISTORY_DAYS
            )));
        }
        if !(1..=MAX_MOVING_AVERAGE_PERIOD).contains(&self.default_ma_period) {
            return Err(ConfigError::Constraint(format!(
                "DEFAULT_MA_PERIOD must be between 1 and {}",
                MAX_MOVING_AVERAGE_PERIOD
            )));
        }
        if !(1..=MAX_FORECAST_HORIZON).contains(&self.default_forecast_horizon) {
            return Err(ConfigError::Constraint(format!(
                "DEFAULT_FORECAST_HORIZON must be between 1 and {}",
                MAX_FORECAST_HORIZON
            )));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

/// Parses `SYM:coin-id,SYM2:coin-id-2`.
pub fn parse_symbol_pairs(raw: &str) -> Result<Vec<SymbolPair>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (display, coin_id) = entry.split_once(':').ok_or_else(|| ConfigError::Invalid {
                key: "EXTRA_SYMBOLS",
                value: entry.to_string(),
            })?;
            let (display, coin_id) = (display.trim(), coin_id.trim());
            if display.is_empty() || coin_id.is_empty() {
                return Err(ConfigError::Invalid {
                    key: "EXTRA_SYMBOLS",
                    value: entry.to_string(),
                });
            }
            Ok(SymbolPair::new(display, coin_id))
        })
        .collect()
}
