//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use crypto_pusher::common::errors::{PusherError, Result};
use crypto_pusher::common::traits::{Notifier, PriceSource};
use crypto_pusher::common::types::{
    AlertThreshold, Asset, NotificationPayload, PriceSnapshot, PriceSummary,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// BTC band used across the tests
pub fn btc_threshold() -> AlertThreshold {
    AlertThreshold::new(Asset::Btc, dec!(610000), dec!(630000)).unwrap()
}

/// ETH band used across the tests
pub fn eth_threshold() -> AlertThreshold {
    AlertThreshold::new(Asset::Eth, dec!(20000), dec!(26000)).unwrap()
}

/// A full batch at the current time
pub fn sample_batch(btc: Decimal, eth: Decimal) -> Vec<PriceSnapshot> {
    let now = Utc::now();
    vec![
        PriceSnapshot::new(Asset::Btc, btc, now),
        PriceSnapshot::new(Asset::Eth, eth, now),
    ]
}

/// Price source that replays scripted fetch outcomes
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<PriceSnapshot>>>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Vec<PriceSnapshot>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }

    /// Replay BTC prices with ETH parked inside its band
    pub fn btc_prices(prices: &[Decimal]) -> Self {
        Self::new(
            prices
                .iter()
                .map(|p| Ok(sample_batch(*p, dec!(23000))))
                .collect(),
        )
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<PriceSnapshot>> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PusherError::InvalidResponse("script exhausted".to_string())))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Notifier that records payloads and can be told to fail
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<NotificationPayload>>>,
    pub summaries: Arc<Mutex<Vec<PriceSummary>>>,
    failures_left: Arc<Mutex<usize>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` sends
    pub fn fail_next(&self, n: usize) {
        *self.failures_left.lock().unwrap() = n;
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().unwrap().clone()
    }

    pub fn summaries(&self) -> Vec<PriceSummary> {
        self.summaries.lock().unwrap().clone()
    }

    fn take_failure(&self) -> Result<()> {
        let mut left = self.failures_left.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            return Err(PusherError::Dispatch("push gateway unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<()> {
        self.take_failure()?;
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn send_summary(&self, summary: &PriceSummary) -> Result<()> {
        self.take_failure()?;
        self.summaries.lock().unwrap().push(summary.clone());
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "recording"
    }
}

/// Sample API responses for testing
pub mod api_responses {
    /// Binance `/api/v3/ticker/price?symbols=["BTCBRL","ETHBRL"]`
    pub const BINANCE_TICKERS: &str = r#"[
        {"symbol": "BTCBRL", "price": "615576.00000000"},
        {"symbol": "ETHBRL", "price": "25807.12000000"}
    ]"#;

    /// Binance response missing ETH
    pub const BINANCE_PARTIAL: &str = r#"[
        {"symbol": "BTCBRL", "price": "615576.00000000"}
    ]"#;

    /// Binance error body
    pub const BINANCE_ERROR: &str = r#"{"code": -1121, "msg": "Invalid symbol."}"#;

    /// CoinGecko `/api/v3/simple/price?ids=bitcoin,ethereum&vs_currencies=brl`
    pub const COINGECKO_SIMPLE: &str = r#"{
        "bitcoin": {"brl": 615576.0},
        "ethereum": {"brl": 25807.12}
    }"#;

    /// CoinGecko response with a non-numeric price
    pub const COINGECKO_NON_NUMERIC: &str = r#"{
        "bitcoin": {"brl": "n/a"},
        "ethereum": {"brl": 25807.12}
    }"#;
}
