use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{ForecastParams, SymbolForecastResponse};
use crate::services::forecasting_service;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    period: Option<usize>,
    horizon: Option<usize>,
    days: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/:symbol", get(get_forecast))
}

pub async fn get_forecast(
    Path(symbol): Path<String>,
    Query(query): Query<ForecastQuery>,
    State(state): State<AppState>,
) -> Result<Json<SymbolForecastResponse>, AppError> {
    info!("GET /api/forecast/{} - Building forecast", symbol);

    let params = ForecastParams::new(
        query.period.unwrap_or(state.config.default_ma_period),
        query.horizon.unwrap_or(state.config.default_forecast_horizon),
    )?;
    let days = query.days.unwrap_or(state.config.default_history_days);

    let response = forecasting_service::generate_symbol_forecast(&state, &symbol, days, params)
        .await
        .map_err(|e| {
            error!("Failed to build forecast for {}: {}", symbol, e);
            e
        })?;

    Ok(Json(response))
}
