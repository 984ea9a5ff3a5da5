use tracing::{error, info};

use crate::errors::AppError;
use crate::services::job_scheduler_service::{JobContext, JobResult};
use crate::services::price_service;

/// Evaluates every symbol with an active price alert or enabled percent-move
/// settings against its live quote.
///
/// A symbol whose quote cannot be fetched is counted as failed; the rest still run.
pub async fn run_alert_monitoring(ctx: JobContext) -> Result<JobResult, AppError> {
    let state = &ctx.state;
    let symbols = state.alerts.monitored_symbols();

    if symbols.is_empty() {
        info!("No symbols to monitor for alerts");
        return Ok(JobResult {
            items_processed: 0,
            items_failed: 0,
        });
    }

    info!("Monitoring {} symbols for alerts", symbols.len());

    let mut processed = 0;
    let mut failed = 0;
    let mut total_events = 0;

    for symbol in &symbols {
        let pair = match state.symbols.resolve(symbol) {
            Ok(pair) => pair,
            Err(e) => {
                error!("Cannot resolve monitored symbol {}: {}", symbol, e);
                failed += 1;
                continue;
            }
        };

        match price_service::fetch_live(state, &pair.coin_id).await {
            Ok(data) => {
                total_events += state.alerts.evaluate(&pair.display, &data).len();
                processed += 1;
            }
            Err(e) => {
                error!("Failed to fetch quote for {}: {}", pair.display, e);
                failed += 1;
            }
        }
    }

    info!(
        "Alert monitoring completed: {} symbols processed, {} failed, {} events",
        processed, failed, total_events
    );

    Ok(JobResult {
        items_processed: processed,
        items_failed: failed,
    })
}
