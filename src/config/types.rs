//! Configuration types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::common::errors::{PusherError, Result};
use crate::common::types::{Asset, AlertThreshold};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Price feed configuration
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Per-asset alert bands
    #[serde(default)]
    pub alerts: Vec<ThresholdConfig>,
    /// Tick and cooldown intervals
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Notification delivery
    #[serde(default)]
    pub notifier: NotifierConfig,
    /// Read-only HTTP API
    #[serde(default)]
    pub server: ServerConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    /// Check everything the scheduler relies on before it starts
    ///
    /// Every failure here is fatal for the process.
    pub fn validate(&self) -> Result<()> {
        if self.alerts.is_empty() {
            return Err(PusherError::Configuration(
                "No alert thresholds configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for threshold in &self.alerts {
            if !seen.insert(threshold.asset) {
                return Err(PusherError::Configuration(format!(
                    "Duplicate threshold for {}",
                    threshold.asset
                )));
            }
            threshold.to_threshold()?;
        }

        if self.scheduler.fetch_interval_seconds == 0 {
            return Err(PusherError::Configuration(
                "scheduler.fetch_interval_seconds must be positive".to_string(),
            ));
        }
        if self.exchange.request_timeout_seconds == 0 || self.notifier.timeout_seconds == 0 {
            return Err(PusherError::Configuration(
                "Request timeouts must be positive".to_string(),
            ));
        }

        let currency = self.exchange.currency.trim();
        if currency.len() < 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(PusherError::Configuration(format!(
                "Invalid fiat currency code: {:?}",
                self.exchange.currency
            )));
        }

        parse_url("exchange.binance_url", &self.exchange.binance_url)?;
        parse_url("exchange.coingecko_url", &self.exchange.coingecko_url)?;

        if self.notifier.kind == NotifierKind::Webhook {
            match &self.notifier.webhook_url {
                Some(url) => parse_url("notifier.webhook_url", url)?,
                None => {
                    return Err(PusherError::Configuration(
                        "notifier.webhook_url is required for the webhook notifier".to_string(),
                    ))
                }
            }
        }

        Ok(())
    }

    /// Validated thresholds, in configuration order
    pub fn thresholds(&self) -> Result<Vec<AlertThreshold>> {
        self.alerts.iter().map(ThresholdConfig::to_threshold).collect()
    }
}

fn parse_url(field: &str, value: &str) -> Result<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| PusherError::Configuration(format!("{} is not a valid URL: {}", field, e)))
}

/// Which exchange API prices are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceProvider {
    Binance,
    CoinGecko,
}

impl Default for PriceProvider {
    fn default() -> Self {
        PriceProvider::CoinGecko
    }
}

impl std::str::FromStr for PriceProvider {
    type Err = PusherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binance" => Ok(PriceProvider::Binance),
            "coingecko" => Ok(PriceProvider::CoinGecko),
            other => Err(PusherError::Configuration(format!(
                "Unknown price provider: {}",
                other
            ))),
        }
    }
}

/// Exchange configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default)]
    pub provider: PriceProvider,
    /// Base URL for the Binance REST API
    #[serde(default = "default_binance_url")]
    pub binance_url: String,
    /// Base URL for the CoinGecko API
    #[serde(default = "default_coingecko_url")]
    pub coingecko_url: String,
    /// Fiat currency prices are quoted in
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ExchangeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            provider: PriceProvider::default(),
            binance_url: default_binance_url(),
            coingecko_url: default_coingecko_url(),
            currency: default_currency(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_binance_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_coingecko_url() -> String {
    "https://api.coingecko.com".to_string()
}

fn default_currency() -> String {
    "BRL".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// Alert band for one asset as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub asset: Asset,
    pub lower_bound: Decimal,
    pub upper_bound: Decimal,
}

impl ThresholdConfig {
    pub fn to_threshold(&self) -> Result<AlertThreshold> {
        AlertThreshold::new(self.asset, self.lower_bound, self.upper_bound)
    }
}

/// Scheduler intervals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between price fetches
    #[serde(default = "default_fetch_interval")]
    pub fetch_interval_seconds: u64,
    /// Minimum seconds between two notifications for the same asset and direction
    #[serde(default = "default_cooldown")]
    pub cooldown_seconds: u64,
    /// Seconds between price summary pushes, 0 disables them
    #[serde(default = "default_summary_interval")]
    pub summary_interval_seconds: u64,
}

impl SchedulerConfig {
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_seconds)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    pub fn summary_interval(&self) -> Duration {
        Duration::from_secs(self.summary_interval_seconds)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fetch_interval_seconds: default_fetch_interval(),
            cooldown_seconds: default_cooldown(),
            summary_interval_seconds: default_summary_interval(),
        }
    }
}

fn default_fetch_interval() -> u64 {
    60
}

fn default_cooldown() -> u64 {
    600
}

fn default_summary_interval() -> u64 {
    600
}

/// Notification channel selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Write alerts to the log only
    Log,
    /// POST alerts as JSON to a webhook
    Webhook,
}

impl Default for NotifierKind {
    fn default() -> Self {
        NotifierKind::Log
    }
}

/// Notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub kind: NotifierKind,
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Push topic subscribers listen on
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Per-send timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

impl NotifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::default(),
            webhook_url: None,
            topic: default_topic(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_topic() -> String {
    "crypto_alerts".to_string()
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
