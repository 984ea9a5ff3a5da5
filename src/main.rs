use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use cryptoboard_backend::app;
use cryptoboard_backend::config::{AppConfig, ProviderKind};
use cryptoboard_backend::external::coingecko::CoinGeckoProvider;
use cryptoboard_backend::external::mock_provider::MockProvider;
use cryptoboard_backend::external::price_provider::PriceProvider;
use cryptoboard_backend::logging::{init_logging, LoggingConfig};
use cryptoboard_backend::services::job_scheduler_service::JobSchedulerService;
use cryptoboard_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    let logging = LoggingConfig::from_env().context("invalid logging configuration")?;
    init_logging(&logging).context("failed to initialize logging")?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let provider: Arc<dyn PriceProvider> = match config.provider {
        ProviderKind::CoinGecko => {
            tracing::info!("📊 Using price provider: CoinGecko ({})", config.coingecko_base_url);
            Arc::new(CoinGeckoProvider::from_config(&config).context("failed to create CoinGecko provider")?)
        }
        ProviderKind::Mock => {
            tracing::info!("📊 Using price provider: offline mock");
            Arc::new(MockProvider::new())
        }
    };

    let bind_addr = config.bind_addr;
    let alerts_enabled = config.alerts_enabled;
    let state = AppState::new(config, provider);
    tracing::info!("🪙 {} symbols registered", state.symbols.count());

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = if alerts_enabled {
        let mut scheduler = JobSchedulerService::new(state.clone()).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("⏸️ Alert monitoring disabled");
        None
    };

    let app = app::create_app(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("🚀 Cryptoboard backend running at http://{}/", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
