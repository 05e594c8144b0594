//! Notifier that POSTs alerts and price summaries as JSON to an HTTP endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::common::errors::{PusherError, Result};
use crate::common::traits::Notifier;
use crate::common::types::{NotificationPayload, PriceSummary};

/// Body sent to the webhook
#[derive(Debug, Serialize)]
pub struct WebhookMessage<'a, T: Serialize> {
    pub topic: &'a str,
    pub title: &'a str,
    pub body: String,
    pub data: &'a T,
}

/// Push delivery over a JSON webhook
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    topic: String,
}

impl WebhookNotifier {
    pub fn new(url: &str, topic: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PusherError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            topic: topic.to_string(),
        })
    }

    fn message<'a>(
        &'a self,
        payload: &'a NotificationPayload,
    ) -> WebhookMessage<'a, NotificationPayload> {
        WebhookMessage {
            topic: &self.topic,
            title: payload.title(),
            body: payload.body(),
            data: payload,
        }
    }

    fn summary_message<'a>(
        &'a self,
        summary: &'a PriceSummary,
    ) -> WebhookMessage<'a, PriceSummary> {
        WebhookMessage {
            topic: &self.topic,
            title: summary.title(),
            body: summary.body(),
            data: summary,
        }
    }

    async fn post<T: Serialize + Sync>(&self, message: &WebhookMessage<'_, T>) -> Result<()> {
        debug!("Posting to webhook: {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| PusherError::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PusherError::Dispatch(format!(
                "Webhook returned status {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, payload), fields(asset = %payload.asset, direction = %payload.direction))]
    async fn send(&self, payload: &NotificationPayload) -> Result<()> {
        self.post(&self.message(payload)).await
    }

    #[instrument(skip(self, summary), fields(batch_version = summary.batch_version))]
    async fn send_summary(&self, summary: &PriceSummary) -> Result<()> {
        self.post(&self.summary_message(summary)).await
    }

    fn channel_name(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{Asset, BandStatus, Direction, SummaryEntry};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_message_shape() {
        let notifier = WebhookNotifier::new(
            "https://hooks.example.com/alerts",
            "crypto_alerts",
            Duration::from_secs(5),
        )
        .unwrap();
        let payload = NotificationPayload {
            asset: Asset::Eth,
            price: dec!(27000),
            formatted_price: "R$ 27.000,00".to_string(),
            currency: "BRL".to_string(),
            direction: Direction::Above,
            threshold: dec!(26000),
            formatted_threshold: "R$ 26.000,00".to_string(),
            generated_at: Utc::now(),
        };

        let json = serde_json::to_value(notifier.message(&payload)).unwrap();
        assert_eq!(json["topic"], "crypto_alerts");
        assert_eq!(json["title"], "CRYPTO ANALYSER");
        assert_eq!(json["body"], "ETH above R$ 26.000,00: R$ 27.000,00");
        assert_eq!(json["data"]["asset"], "ETH");
        assert_eq!(json["data"]["direction"], "above");
    }

    #[test]
    fn test_summary_message_shape() {
        let notifier = WebhookNotifier::new(
            "https://hooks.example.com/alerts",
            "crypto_alerts",
            Duration::from_secs(5),
        )
        .unwrap();
        let summary = PriceSummary {
            currency: "BRL".to_string(),
            batch_version: 7,
            entries: vec![SummaryEntry {
                asset: Asset::Btc,
                price: dec!(605000),
                formatted_price: "R$ 605.000,00".to_string(),
                status: BandStatus::Low,
            }],
            generated_at: Utc::now(),
        };

        let json = serde_json::to_value(notifier.summary_message(&summary)).unwrap();
        assert_eq!(json["title"], "CRYPTO ANALYSER");
        assert_eq!(json["body"], "BTC: R$ 605.000,00 (LOW)");
        assert_eq!(json["data"]["batch_version"], 7);
    }
}
