use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{MarketQuoteResponse, PriceHistoryResponse};
use crate::services::forecasting_service::{MAX_HISTORY_DAYS, MIN_HISTORY_DAYS};
use crate::services::price_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    days: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(get_quote))
        .route("/:symbol/history", get(get_history))
}

pub async fn get_quote(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MarketQuoteResponse>, AppError> {
    info!("GET /api/market/{} - Fetching live quote", symbol);
    let pair = state.symbols.resolve(&symbol)?;

    let data = price_service::fetch_live(&state, &pair.coin_id)
        .await
        .map_err(|e| {
            log_fetch_error(&pair.display, &e);
            e
        })?;

    Ok(Json(MarketQuoteResponse::new(&pair.display, &pair.coin_id, data)))
}

pub async fn get_history(
    Path(symbol): Path<String>,
    Query(params): Query<HistoryParams>,
    State(state): State<AppState>,
) -> Result<Json<PriceHistoryResponse>, AppError> {
    let days = params.days.unwrap_or(state.config.default_history_days);
    info!("GET /api/market/{}/history - Fetching {} days", symbol, days);

    if !(MIN_HISTORY_DAYS..=MAX_HISTORY_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "days must be between {} and {}",
            MIN_HISTORY_DAYS, MAX_HISTORY_DAYS
        )));
    }

    let pair = state.symbols.resolve(&symbol)?;
    let samples = price_service::fetch_history(&state, &pair.coin_id, days)
        .await
        .map_err(|e| {
            log_fetch_error(&pair.display, &e);
            e
        })?;

    Ok(Json(PriceHistoryResponse {
        symbol: pair.display,
        coin_id: pair.coin_id,
        days,
        samples,
    }))
}

fn log_fetch_error(symbol: &str, err: &AppError) {
    match err {
        AppError::RateLimited => warn!("Rate limited fetching market data for {}", symbol),
        _ => error!("Failed to fetch market data for {}: {}", symbol, err),
    }
}
