//! Route Definitions
//!
//! Maps URLs to handlers with type-safe routing.

use super::{handlers::*, monitoring::metrics_handler};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check (high priority)
        .route("/health", get(health_handler))
        // Wallet lifecycle and audit trail
        .route("/api/users", post(register_handler))
        .route("/api/wallet/:user_id", get(wallet_handler))
        .route(
            "/api/wallet/:user_id/transactions",
            get(transactions_handler),
        )
        // The Saw
        .route("/api/saw/spin", post(saw_spin_handler))
        // The Job Site
        .route("/api/mines/boards", post(create_board_handler))
        .route("/api/mines/boards/:board_id/reveal", post(reveal_handler))
        .route("/api/mines/boards/:board_id/cashout", post(cashout_handler))
        // Daily prize wheel and purchases
        .route("/api/daily/spin", post(daily_spin_handler))
        .route("/api/purchase", post(purchase_handler))
        // Jackpot pool, polled by the UI on an interval
        .route("/api/jackpot", get(jackpot_handler))
        // Metrics endpoint for Prometheus
        .route("/metrics", get(metrics_handler))
        // Attach shared state
        .with_state(state)
}
