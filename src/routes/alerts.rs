use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::alert::*;
use crate::services::alert_service;
use crate::state::AppState;

const DEFAULT_EVENT_LIMIT: usize = 50;

// ==============================================================================
// Router - 9 endpoints
// ==============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_alerts).post(create_alert))
        // static segments before /:id
        .route("/events", get(list_events))
        .route("/disable", post(disable_all_alerts))
        .route("/settings/:symbol", get(get_settings).put(update_settings))
        .route("/:id", get(get_alert).delete(delete_alert))
        .route("/:id/disable", post(disable_alert))
}

// ==============================================================================
// Request / Response types
// ==============================================================================

#[derive(Debug, Deserialize)]
struct EventQueryParams {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct DisableAllResponse {
    disabled: usize,
}

#[derive(Debug, Serialize)]
struct SymbolSettingsResponse {
    symbol: String,
    #[serde(flatten)]
    settings: AlertSettings,
}

// ==============================================================================
// Price Alert Handlers
// ==============================================================================

async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertQueryParams>,
) -> Json<Vec<PriceAlert>> {
    info!("🔔 Listing alerts (active={:?})", params.active);
    Json(state.alerts.list(params.active))
}

async fn create_alert(
    State(state): State<AppState>,
    Json(req): Json<CreateAlertRequest>,
) -> Result<(StatusCode, Json<PriceAlert>), AppError> {
    info!("🔔 Setting {} alert for {} at {}", req.direction.as_str(), req.symbol, req.target_price);
    let alert = alert_service::create_alert(&state, req)?;
    Ok((StatusCode::CREATED, Json(alert)))
}

async fn get_alert(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<PriceAlert>, AppError> {
    Ok(Json(state.alerts.get(id)?))
}

async fn disable_alert(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<PriceAlert>, AppError> {
    info!("🔕 Disabling alert {}", id);
    Ok(Json(state.alerts.disable(id)?))
}

async fn disable_all_alerts(State(state): State<AppState>) -> Json<DisableAllResponse> {
    let disabled = state.alerts.disable_all();
    info!("🔕 Disabled {} alerts", disabled);
    Json(DisableAllResponse { disabled })
}

async fn delete_alert(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    info!("🗑️ Deleting alert {}", id);
    state.alerts.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventQueryParams>,
) -> Json<Vec<AlertEvent>> {
    Json(state.alerts.recent_events(params.limit.unwrap_or(DEFAULT_EVENT_LIMIT)))
}

// ==============================================================================
// Percent-move Settings Handlers
// ==============================================================================

async fn get_settings(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SymbolSettingsResponse>, AppError> {
    let (symbol, settings) = alert_service::get_settings(&state, &symbol)?;
    Ok(Json(SymbolSettingsResponse { symbol, settings }))
}

async fn update_settings(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
    Json(settings): Json<AlertSettings>,
) -> Result<Json<SymbolSettingsResponse>, AppError> {
    info!(
        "⚙️ Updating alert settings for {} (enabled={}, threshold={}%)",
        symbol, settings.enabled, settings.threshold_percent
    );
    let (symbol, settings) = alert_service::update_settings(&state, &symbol, settings)?;
    Ok(Json(SymbolSettingsResponse { symbol, settings }))
}
