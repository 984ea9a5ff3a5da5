use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::info;

use crate::errors::AppError;
use crate::models::watchlist::*;
use crate::services::watchlist_service;
use crate::state::AppState;

// ==============================================================================
// Router - 4 endpoints
// ==============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_watchlist).post(add_item))
        // specific route before the parameterized one
        .route("/quotes", get(get_quotes))
        .route("/:symbol", delete(remove_item))
}

async fn list_watchlist(State(state): State<AppState>) -> Json<WatchlistResponse> {
    info!("📋 Listing watchlist");
    let items = state.watchlist.list();
    Json(WatchlistResponse {
        item_count: items.len(),
        items,
    })
}

async fn get_quotes(State(state): State<AppState>) -> Json<Vec<WatchlistQuote>> {
    info!("📈 Fetching quotes for {} watchlist symbols", state.watchlist.len());
    Json(watchlist_service::get_quotes(&state).await)
}

async fn add_item(
    State(state): State<AppState>,
    Json(req): Json<AddWatchlistItemRequest>,
) -> Result<(StatusCode, Json<WatchlistEntry>), AppError> {
    info!("➕ Adding {} to watchlist", req.symbol);
    let entry = watchlist_service::add_symbol(&state, &req.symbol)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn remove_item(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    info!("➖ Removing {} from watchlist", symbol);
    watchlist_service::remove_symbol(&state, &symbol)?;
    Ok(StatusCode::NO_CONTENT)
}
