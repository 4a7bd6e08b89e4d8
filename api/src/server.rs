//! Axum router and server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::state::AppState;

/// Assemble the full route table.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/webhooks/tx", post(handlers::ingest_webhook))
        .route("/webhooks/chain", post(handlers::chain_webhook))
        .route("/payouts/trigger", post(handlers::trigger_payout))
        .route("/payouts/retry/:payout_id", post(handlers::retry_payout))
        .route(
            "/payouts/:event_id",
            get(handlers::get_payout).delete(handlers::cancel_payout),
        )
        .route("/tips", post(handlers::send_tip))
        .route("/admin/metrics/refresh", post(handlers::refresh_metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, build_router(state)).await
}
