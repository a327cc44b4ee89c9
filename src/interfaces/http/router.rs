use super::handlers;
use crate::application::service::BalanceService;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use std::sync::Arc;

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Builds the full route table over a shared `BalanceService`.
pub fn router(service: Arc<BalanceService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/wallet/create", post(handlers::create_wallet))
        .route("/api/v1/wallet", post(handlers::operate))
        .route("/api/v1/wallets/{id}", get(handlers::get_balance))
        .with_state(service)
}
