use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{alerts, forecast, health, market, preferences, symbols, watchlist};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/symbols", symbols::router())
        .nest("/api/market", market::router())
        .nest("/api/forecast", forecast::router())
        .nest("/api/watchlist", watchlist::router())
        .nest("/api/alerts", alerts::router())
        .nest("/api/preferences", preferences::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
