// Router assembly for the UI boundary

use crate::app_state::SharedState;
use crate::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Build the full HTTP surface. Factored out of `main` so integration
/// tests can drive the router in process.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // ===== MARKET ACTIONS =====
        .route("/action/bet", post(place_bet))
        .route("/action/initialize", post(initialize_market))
        .route("/action/deploy", post(deploy_program))
        // ===== MARKET STATS =====
        .route("/stats", get(get_stats))
        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
