//! Exchange wire formats and conversion into snapshots

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

use crate::common::errors::{PusherError, Result};

/// One entry of Binance's `/api/v3/ticker/price?symbols=[...]` response
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceTickerPrice {
    pub symbol: String,
    /// Decimal encoded as a string, e.g. `"615000.12000000"`
    pub price: String,
}

/// Binance error body, returned alongside non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceErrorResponse {
    pub code: i64,
    pub msg: String,
}

/// CoinGecko `/api/v3/simple/price` response: coin id -> currency -> price
pub type CoinGeckoSimplePrice = HashMap<String, HashMap<String, serde_json::Value>>;

/// Parse a price field, rejecting anything that is not a positive number
pub fn parse_price(label: &str, raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    let price = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| PusherError::InvalidResponse(format!("Invalid {} price {:?}: {}", label, raw, e)))?;

    if price <= Decimal::ZERO {
        return Err(PusherError::InvalidResponse(format!(
            "Non-positive {} price: {}",
            label, price
        )));
    }
    Ok(price)
}

/// Parse a JSON price value, which may be a number or a numeric string
pub fn parse_price_value(label: &str, value: &serde_json::Value) -> Result<Decimal> {
    match value {
        serde_json::Value::Number(n) => parse_price(label, &n.to_string()),
        serde_json::Value::String(s) => parse_price(label, s),
        other => Err(PusherError::InvalidResponse(format!(
            "Non-numeric {} price: {}",
            label, other
        ))),
    }
}
