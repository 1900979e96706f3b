use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes, no authentication
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics));

    // Protected API routes, Bearer token required when API_TOKEN is set
    let protected = Router::new()
        // Dashboard
        .route("/api/dashboard/summary", get(handlers::dashboard::summary))
        // Markets
        .route("/api/markets", get(handlers::markets::list))
        .route("/api/markets/categories", get(handlers::markets::categories))
        .route("/api/markets/:id", get(handlers::markets::detail))
        .route("/api/opportunities", get(handlers::markets::opportunities))
        // Signals
        .route("/api/signals", get(handlers::signals::list))
        .route("/api/signals/summary", get(handlers::signals::summary))
        // Analytics
        .route("/api/analytics/pnl-history", get(handlers::analytics::pnl_history))
        .route("/api/analytics/performance", get(handlers::analytics::performance))
        .route("/api/analytics/opportunities", get(handlers::analytics::opportunities))
        // Risk
        .route("/api/risk/status", get(handlers::risk::status))
        .route("/api/risk/logs", get(handlers::risk::logs))
        .route("/api/risk/trades-today", get(handlers::risk::trades_today))
        .route("/api/risk/rules", get(handlers::risk::rules))
        // Backtests
        .route("/api/backtests", get(handlers::backtests::list))
        .route("/api/backtests/:name", get(handlers::backtests::detail))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Read-only API; any origin may fetch with a token
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
