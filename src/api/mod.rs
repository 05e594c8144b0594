//! API module - read-only HTTP routes over the alert loop's state

pub mod display;
pub mod handlers;

use axum::{routing::get, Router};

use crate::engine::ReadModel;

/// Build the read-only router
pub fn router(model: ReadModel) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/prices", get(handlers::prices))
        .route("/alerts/config", get(handlers::alert_config))
        .route("/status", get(handlers::status))
        .route("/display", get(handlers::display))
        .route("/display/auto-refresh", get(handlers::display_auto_refresh))
        .fallback(handlers::not_found)
        .with_state(model)
}
