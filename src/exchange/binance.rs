//! Binance REST ticker price source

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use super::messages::{parse_price, BinanceErrorResponse, BinanceTickerPrice};
use crate::common::errors::{PusherError, Result};
use crate::common::traits::PriceSource;
use crate::common::types::{Asset, PriceSnapshot};

/// Price source backed by Binance's public ticker endpoint
#[derive(Debug, Clone)]
pub struct BinancePriceSource {
    /// HTTP client
    client: Client,
    /// Base URL for the Binance API
    base_url: String,
    /// Quote currency, e.g. `BRL`
    currency: String,
}

impl BinancePriceSource {
    /// Create a new source with the default 10s timeout
    pub fn new(base_url: &str, currency: &str) -> Result<Self> {
        Self::with_timeout(base_url, currency, Duration::from_secs(10))
    }

    /// Create a new source with a custom per-request timeout
    pub fn with_timeout(base_url: &str, currency: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PusherError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            currency: currency.trim().to_ascii_uppercase(),
        })
    }

    /// Trading pair symbol for an asset, e.g. `BTCBRL`
    pub fn pair_symbol(&self, asset: Asset) -> String {
        format!("{}{}", asset.symbol(), self.currency)
    }
}

#[async_trait]
impl PriceSource for BinancePriceSource {
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<PriceSnapshot>> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let pairs: Vec<String> = Asset::ALL.iter().map(|a| self.pair_symbol(*a)).collect();
        let symbols = serde_json::to_string(&pairs)?;
        debug!("Fetching prices from: {} symbols={}", url, symbols);

        let response = self
            .client
            .get(&url)
            .query(&[("symbols", symbols.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<BinanceErrorResponse>(&body)
                .map(|e| format!("{} ({})", e.msg, e.code))
                .unwrap_or(body);
            return Err(PusherError::InvalidResponse(format!(
                "Binance returned status {}: {}",
                status, detail
            )));
        }

        let tickers: Vec<BinanceTickerPrice> = response.json().await?;
        let fetched_at = Utc::now();

        Asset::ALL
            .iter()
            .map(|asset| {
                let pair = self.pair_symbol(*asset);
                let ticker = tickers.iter().find(|t| t.symbol == pair).ok_or_else(|| {
                    PusherError::InvalidResponse(format!("Missing ticker for {}", pair))
                })?;
                let price = parse_price(asset.symbol(), &ticker.price)?;
                Ok(PriceSnapshot::new(*asset, price, fetched_at))
            })
            .collect()
    }

    fn provider_name(&self) -> &'static str {
        "binance"
    }
}
