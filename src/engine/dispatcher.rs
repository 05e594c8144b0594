//! Turns Notify decisions and price summaries into payloads for the notifier

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use super::cache::PriceBatch;
use super::evaluator::AlertEvaluator;
use super::types::{Breach, Decision};
use crate::common::errors::{PusherError, Result};
use crate::common::traits::Notifier;
use crate::common::types::{NotificationPayload, PriceSnapshot, PriceSummary, SummaryEntry};
use crate::notify::format::format_fiat;

/// Builds payloads and delivers them through a [`Notifier`]
///
/// Never retries and never touches alert state. A failed or timed-out send
/// comes back as [`PusherError::Dispatch`] and the caller decides what to do.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    currency: String,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, currency: &str, send_timeout: Duration) -> Self {
        Self {
            notifier,
            currency: currency.trim().to_ascii_uppercase(),
            send_timeout,
        }
    }

    /// Build the payload for a breach
    pub fn build_payload(&self, breach: &Breach, snapshot: &PriceSnapshot) -> NotificationPayload {
        NotificationPayload {
            asset: snapshot.asset,
            price: snapshot.price,
            formatted_price: format_fiat(snapshot.price, &self.currency),
            currency: self.currency.clone(),
            direction: breach.direction,
            threshold: breach.bound,
            formatted_threshold: format_fiat(breach.bound, &self.currency),
            generated_at: Utc::now(),
        }
    }

    /// Deliver a decision
    ///
    /// Returns `Ok(None)` for `NoAction` without contacting the notifier,
    /// and the delivered payload on success.
    #[instrument(skip(self, snapshot), fields(asset = %snapshot.asset))]
    pub async fn dispatch(
        &self,
        decision: &Decision,
        snapshot: &PriceSnapshot,
    ) -> Result<Option<NotificationPayload>> {
        let breach = match decision {
            Decision::NoAction => return Ok(None),
            Decision::Notify(breach) => breach,
        };

        let payload = self.build_payload(breach, snapshot);
        self.deliver(self.notifier.send(&payload)).await?;
        info!(
            "Sent {} alert via {}: {}",
            payload.asset,
            self.notifier.channel_name(),
            payload.body()
        );
        Ok(Some(payload))
    }

    /// Build the periodic summary for a cached batch
    pub fn build_summary(&self, batch: &PriceBatch, evaluator: &AlertEvaluator) -> PriceSummary {
        PriceSummary {
            currency: self.currency.clone(),
            batch_version: batch.version,
            entries: batch
                .snapshots
                .iter()
                .map(|s| SummaryEntry {
                    asset: s.asset,
                    price: s.price,
                    formatted_price: format_fiat(s.price, &self.currency),
                    status: evaluator.band_status(s),
                })
                .collect(),
            generated_at: Utc::now(),
        }
    }

    /// Deliver a summary under the same timeout and error mapping as alerts
    #[instrument(skip(self, summary), fields(batch_version = summary.batch_version))]
    pub async fn dispatch_summary(&self, summary: &PriceSummary) -> Result<()> {
        self.deliver(self.notifier.send_summary(summary)).await?;
        info!(
            "Sent price summary via {}: {}",
            self.notifier.channel_name(),
            summary.body()
        );
        Ok(())
    }

    async fn deliver<F>(&self, send: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        match tokio::time::timeout(self.send_timeout, send).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(PusherError::Dispatch(msg))) => Err(PusherError::Dispatch(msg)),
            Ok(Err(other)) => Err(PusherError::Dispatch(other.to_string())),
            Err(_) => Err(PusherError::Dispatch(format!(
                "{} notifier timed out after {:?}",
                self.notifier.channel_name(),
                self.send_timeout
            ))),
        }
    }
}
