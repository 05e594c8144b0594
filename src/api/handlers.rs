//! HTTP handlers for the read-only API

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use super::display::{render_board, render_board_page};
use crate::common::errors::PusherError;
use crate::common::types::{AlertThreshold, Asset, FetchStatus};
use crate::engine::ReadModel;
use crate::notify::format::format_fiat;

impl IntoResponse for PusherError {
    fn into_response(self) -> Response {
        let status = match self {
            PusherError::CacheEmpty => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(json!({ "error": self.to_string(), "kind": self.kind().to_string() })),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct PriceView {
    pub asset: Asset,
    pub name: &'static str,
    pub price: Decimal,
    pub formatted_price: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub version: u64,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
    pub prices: Vec<PriceView>,
}

#[derive(Debug, Serialize)]
pub struct AlertConfigResponse<'a> {
    pub currency: &'a str,
    pub cooldown_seconds: u64,
    pub thresholds: &'a [AlertThreshold],
}

pub async fn home() -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/health": "Liveness check",
            "/prices": "Latest BTC/ETH prices",
            "/alerts/config": "Configured alert bands",
            "/status": "Outcome of the last price fetch",
            "/display": "Plain-text price board",
            "/display/auto-refresh": "Self-refreshing HTML price board",
        }
    }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn prices(State(model): State<ReadModel>) -> Result<Json<PricesResponse>, PusherError> {
    let batch = model.latest_prices().await?;
    let prices = batch
        .snapshots
        .iter()
        .map(|s| PriceView {
            asset: s.asset,
            name: s.asset.name(),
            price: s.price,
            formatted_price: format_fiat(s.price, model.currency()),
            fetched_at: s.fetched_at,
        })
        .collect();

    Ok(Json(PricesResponse {
        version: batch.version,
        currency: model.currency().to_string(),
        updated_at: batch.updated_at,
        prices,
    }))
}

pub async fn alert_config(State(model): State<ReadModel>) -> Response {
    Json(AlertConfigResponse {
        currency: model.currency(),
        cooldown_seconds: model.cooldown().as_secs(),
        thresholds: model.alert_config(),
    })
    .into_response()
}

pub async fn status(State(model): State<ReadModel>) -> Json<FetchStatus> {
    Json(model.status().await)
}

async fn current_board(model: &ReadModel) -> String {
    let batch = model.latest_prices().await.ok();
    render_board(
        batch.as_deref(),
        model.alert_config(),
        model.currency(),
        Utc::now(),
    )
}

pub async fn display(State(model): State<ReadModel>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        current_board(&model).await,
    )
        .into_response()
}

pub async fn display_auto_refresh(State(model): State<ReadModel>) -> Html<String> {
    Html(render_board_page(&current_board(&model).await))
}

pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
