//! Read-only view of the alert loop for the HTTP layer

use std::sync::Arc;
use std::time::Duration;

use super::cache::{PriceBatch, PriceCache};
use crate::common::errors::Result;
use crate::common::types::{AlertThreshold, FetchStatus};

/// `GetLatestPrices`, `GetAlertConfig` and `GetStatus` over shared state
///
/// Cheap to clone. Never sees alert state, which stays with the scheduler.
#[derive(Debug, Clone)]
pub struct ReadModel {
    cache: Arc<PriceCache>,
    thresholds: Arc<Vec<AlertThreshold>>,
    cooldown: Duration,
    currency: String,
}

impl ReadModel {
    pub fn new(
        cache: Arc<PriceCache>,
        thresholds: Vec<AlertThreshold>,
        cooldown: Duration,
        currency: &str,
    ) -> Self {
        Self {
            cache,
            thresholds: Arc::new(thresholds),
            cooldown,
            currency: currency.trim().to_ascii_uppercase(),
        }
    }

    /// Latest batch, or `CacheEmpty` before the first successful fetch
    pub async fn latest_prices(&self) -> Result<Arc<PriceBatch>> {
        self.cache.read().await
    }

    pub fn alert_config(&self) -> &[AlertThreshold] {
        &self.thresholds
    }

    pub async fn status(&self) -> FetchStatus {
        self.cache.status().await
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}
