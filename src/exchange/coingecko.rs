//! CoinGecko simple-price source

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use super::messages::{parse_price_value, CoinGeckoSimplePrice};
use crate::common::errors::{PusherError, Result};
use crate::common::traits::PriceSource;
use crate::common::types::{Asset, PriceSnapshot};

/// CoinGecko coin id for an asset
pub fn coin_id(asset: Asset) -> &'static str {
    match asset {
        Asset::Btc => "bitcoin",
        Asset::Eth => "ethereum",
    }
}

/// Price source backed by CoinGecko's `/simple/price`
#[derive(Debug, Clone)]
pub struct CoinGeckoPriceSource {
    client: Client,
    base_url: String,
    /// Lowercase `vs_currency`, e.g. `brl`
    currency: String,
}

impl CoinGeckoPriceSource {
    pub fn new(base_url: &str, currency: &str) -> Result<Self> {
        Self::with_timeout(base_url, currency, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: &str, currency: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PusherError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            currency: currency.trim().to_ascii_lowercase(),
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoPriceSource {
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<Vec<PriceSnapshot>> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let ids = Asset::ALL
            .iter()
            .map(|a| coin_id(*a))
            .collect::<Vec<_>>()
            .join(",");
        debug!("Fetching prices from: {} ids={}", url, ids);

        let response = self
            .client
            .get(&url)
            .query(&[("ids", ids.as_str()), ("vs_currencies", self.currency.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PusherError::InvalidResponse(format!(
                "CoinGecko returned status {}: {}",
                status, body
            )));
        }

        let prices: CoinGeckoSimplePrice = response.json().await?;
        let fetched_at = Utc::now();

        Asset::ALL
            .iter()
            .map(|asset| {
                let value = prices
                    .get(coin_id(*asset))
                    .and_then(|quotes| quotes.get(&self.currency))
                    .ok_or_else(|| {
                        PusherError::InvalidResponse(format!(
                            "Missing {} price for {}",
                            self.currency,
                            coin_id(*asset)
                        ))
                    })?;
                let price = parse_price_value(asset.symbol(), value)?;
                Ok(PriceSnapshot::new(*asset, price, fetched_at))
            })
            .collect()
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}
