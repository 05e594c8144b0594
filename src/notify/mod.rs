//! Notify module - delivery channels and message formatting

pub mod format;
pub mod log;
pub mod webhook;

pub use self::log::LogNotifier;
pub use webhook::WebhookNotifier;

use std::sync::Arc;

use crate::common::errors::{PusherError, Result};
use crate::common::traits::Notifier;
use crate::config::types::{NotifierConfig, NotifierKind};

/// Build the configured notifier
pub fn build_notifier(config: &NotifierConfig) -> Result<Arc<dyn Notifier>> {
    match config.kind {
        NotifierKind::Log => Ok(Arc::new(LogNotifier::new())),
        NotifierKind::Webhook => {
            let url = config.webhook_url.as_deref().ok_or_else(|| {
                PusherError::Configuration("notifier.webhook_url is not set".to_string())
            })?;
            Ok(Arc::new(WebhookNotifier::new(
                url,
                &config.topic,
                config.timeout(),
            )?))
        }
    }
}
