//! Capability traits at the I/O boundaries of the alert loop

use async_trait::async_trait;

use super::errors::Result;
use super::types::{NotificationPayload, PriceSnapshot, PriceSummary};

/// Source of current prices (Binance, CoinGecko, ...)
///
/// Implementations perform exactly one outbound request per call, bounded
/// by a timeout, and never retry. Retry happens on the next scheduler tick.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch one snapshot per tracked asset, all sharing one `fetched_at`
    ///
    /// Fails as a whole if any asset is missing or unparseable, so callers
    /// never see a partial batch.
    async fn fetch(&self) -> Result<Vec<PriceSnapshot>>;

    /// Name of the upstream provider
    fn provider_name(&self) -> &'static str;
}

/// Delivery channel for alert notifications
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a payload. Any error means the alert was not delivered.
    async fn send(&self, payload: &NotificationPayload) -> Result<()>;

    /// Deliver a periodic price summary, same error contract as `send`
    async fn send_summary(&self, summary: &PriceSummary) -> Result<()>;

    /// Name of the delivery channel
    fn channel_name(&self) -> &'static str;
}
