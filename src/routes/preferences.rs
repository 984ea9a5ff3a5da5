use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{ForecastMethodPreference, SetForecastMethodRequest};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/:symbol/forecast-method",
        get(get_forecast_method).put(set_forecast_method),
    )
}

pub async fn get_forecast_method(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ForecastMethodPreference>, AppError> {
    let pair = state.symbols.resolve(&symbol)?;
    let method = state.preferences.get(&pair.display);
    Ok(Json(ForecastMethodPreference::new(pair.display, method)))
}

pub async fn set_forecast_method(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<SetForecastMethodRequest>,
) -> Result<Json<ForecastMethodPreference>, AppError> {
    let pair = state.symbols.resolve(&symbol)?;
    info!("⚙️ Forecast method for {} set to {:?}", pair.display, req.method);

    state.preferences.set(&pair.display, req.method);
    Ok(Json(ForecastMethodPreference::new(pair.display, Some(req.method))))
}
