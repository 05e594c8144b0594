//! Notifier that writes alerts to the application log

use async_trait::async_trait;
use tracing::{info, warn};

use crate::common::errors::Result;
use crate::common::traits::Notifier;
use crate::common::types::{NotificationPayload, PriceSummary};

/// Emits every alert as a structured `tracing` event
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<()> {
        warn!(
            asset = %payload.asset,
            direction = %payload.direction,
            price = %payload.price,
            threshold = %payload.threshold,
            currency = %payload.currency,
            generated_at = %payload.generated_at,
            "{}: {}",
            payload.title(),
            payload.body()
        );
        Ok(())
    }

    async fn send_summary(&self, summary: &PriceSummary) -> Result<()> {
        info!(
            batch_version = summary.batch_version,
            currency = %summary.currency,
            generated_at = %summary.generated_at,
            "{}: {}",
            summary.title(),
            summary.body()
        );
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "log"
    }
}
