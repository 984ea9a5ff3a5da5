//! Subscriber setup: env filter, fmt output and optional Loki shipping.

use std::str::FromStr;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use crate::config::ConfigError;

const DEFAULT_FILTER: &str = "info,cryptoboard_backend=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Full,
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "pretty" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Where log batches are pushed, and the labels attached to every stream.
#[derive(Debug, Clone, PartialEq)]
pub struct LokiTarget {
    pub url: Url,
    pub service: String,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: String,
    pub format: LogFormat,
    pub loki: Option<LokiTarget>,
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `CRYPTOBOARD_LOG` takes precedence over `RUST_LOG`. Loki is only
    /// configured when `LOKI_ENABLED` is true, and then `LOKI_URL` is required.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let (filter_key, filter) = ["CRYPTOBOARD_LOG", "RUST_LOG"]
            .into_iter()
            .find_map(|key| var(key).map(|value| (key, value)))
            .unwrap_or(("RUST_LOG", DEFAULT_FILTER.to_string()));
        if EnvFilter::try_new(&filter).is_err() {
            return Err(ConfigError::Invalid { key: filter_key, value: filter });
        }

        let format = match var("LOG_FORMAT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "LOG_FORMAT", value: raw })?,
            None => LogFormat::Full,
        };

        let loki_enabled = match var("LOKI_ENABLED") {
            Some(raw) => raw
                .parse::<bool>()
                .map_err(|_| ConfigError::Invalid { key: "LOKI_ENABLED", value: raw })?,
            None => false,
        };

        let loki = if loki_enabled {
            let raw = var("LOKI_URL").ok_or_else(|| {
                ConfigError::Constraint("LOKI_ENABLED is true but LOKI_URL is not set".into())
            })?;
            let url = Url::parse(&raw).map_err(|_| ConfigError::Invalid { key: "LOKI_URL", value: raw })?;
            Some(LokiTarget {
                url,
                service: var("SERVICE_NAME").unwrap_or_else(|| "cryptoboard".to_string()),
                environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            })
        } else {
            None
        };

        Ok(Self { filter, format, loki })
    }
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let compact = config.format == LogFormat::Compact;
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.filter)?)
        .with(compact.then(|| fmt::layer().compact()))
        .with((!compact).then(|| fmt::layer()));

    #[cfg(feature = "loki")]
    {
        if let Some(target) = &config.loki {
            let (loki_layer, task) = tracing_loki::builder()
                .label("service", &target.service)?
                .label("environment", &target.environment)?
                .build_url(target.url.clone())?;
            registry.with(loki_layer).try_init()?;
            tokio::spawn(task);

            tracing::info!("✅ Shipping logs to Loki at {} ({})", target.url, target.environment);
            return Ok(());
        }
    }

    registry.try_init()?;
    if config.loki.is_some() && !cfg!(feature = "loki") {
        tracing::warn!("LOKI_ENABLED is set but the loki feature is not compiled in, logging to console only");
    }
    tracing::info!("📊 Console logging initialized ({:?})", config.format);
    Ok(())
}
