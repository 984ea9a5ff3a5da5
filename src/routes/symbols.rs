use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{SymbolListResponse, SymbolPair, SymbolSearchParams};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_symbols))
        .route("/:symbol", get(get_symbol))
}

pub async fn list_symbols(
    State(state): State<AppState>,
    Query(params): Query<SymbolSearchParams>,
) -> Json<SymbolListResponse> {
    let query = params.q.unwrap_or_default();
    info!("GET /api/symbols - Listing symbols (q={:?})", query);

    let symbols = state.symbols.search(&query);
    Json(SymbolListResponse {
        total: symbols.len(),
        symbols,
    })
}

pub async fn get_symbol(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SymbolPair>, AppError> {
    info!("GET /api/symbols/{} - Resolving symbol", symbol);
    Ok(Json(state.symbols.resolve(&symbol)?))
}
