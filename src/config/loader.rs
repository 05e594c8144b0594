//! Configuration loader

use config::{Config, Environment, File};
use rust_decimal::Decimal;
use std::path::Path;

use super::types::{
    AppConfig, AppSettings, ExchangeConfig, NotifierConfig, NotifierKind, SchedulerConfig,
    ServerConfig, ThresholdConfig,
};
use crate::common::errors::{PusherError, Result};
use crate::common::types::Asset;

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP__, e.g. `APP__SERVER__PORT`)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| PusherError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| PusherError::Configuration(e.to_string()))
}

/// Load configuration from flat environment variables only
///
/// Recognises `BTC_LOWEST`, `BTC_HIGH`, `ETH_LOWEST`, `ETH_HIGH`,
/// `NOTIFICATION_INTERVAL`, `FETCH_INTERVAL`, `SUMMARY_INTERVAL`, `FIAT_CURRENCY`,
/// `PRICE_PROVIDER`, `WEBHOOK_URL`, `HOST` and `PORT`.
pub fn load_from_env() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a config from an arbitrary variable lookup
pub(crate) fn from_lookup<F>(lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut alerts = Vec::new();
    for asset in Asset::ALL {
        let lower_key = format!("{}_LOWEST", asset.symbol());
        let upper_key = format!("{}_HIGH", asset.symbol());
        match (lookup(&lower_key), lookup(&upper_key)) {
            (Some(lower), Some(upper)) => alerts.push(ThresholdConfig {
                asset,
                lower_bound: parse_decimal(&lower_key, &lower)?,
                upper_bound: parse_decimal(&upper_key, &upper)?,
            }),
            (None, None) => {}
            _ => {
                return Err(PusherError::Configuration(format!(
                    "Both {} and {} must be set",
                    lower_key, upper_key
                )))
            }
        }
    }

    let mut exchange = ExchangeConfig::default();
    if let Some(provider) = lookup("PRICE_PROVIDER") {
        exchange.provider = provider.parse()?;
    }
    if let Some(currency) = lookup("FIAT_CURRENCY") {
        exchange.currency = currency.trim().to_ascii_uppercase();
    }

    let mut scheduler = SchedulerConfig::default();
    if let Some(value) = lookup("NOTIFICATION_INTERVAL") {
        scheduler.cooldown_seconds = parse_u64("NOTIFICATION_INTERVAL", &value)?;
    }
    if let Some(value) = lookup("FETCH_INTERVAL") {
        scheduler.fetch_interval_seconds = parse_u64("FETCH_INTERVAL", &value)?;
    }
    if let Some(value) = lookup("SUMMARY_INTERVAL") {
        scheduler.summary_interval_seconds = parse_u64("SUMMARY_INTERVAL", &value)?;
    }

    let mut notifier = NotifierConfig::default();
    if let Some(url) = lookup("WEBHOOK_URL") {
        notifier.kind = NotifierKind::Webhook;
        notifier.webhook_url = Some(url);
    }

    let mut server = ServerConfig::default();
    if let Some(host) = lookup("HOST") {
        server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        server.port = port
            .trim()
            .parse()
            .map_err(|e| PusherError::Configuration(format!("PORT: {}", e)))?;
    }

    Ok(AppConfig {
        exchange,
        alerts,
        scheduler,
        notifier,
        server,
        settings: AppSettings::default(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal> {
    value
        .trim()
        .parse()
        .map_err(|e| PusherError::Configuration(format!("{}: {}", key, e)))
}

fn parse_u64(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| PusherError::Configuration(format!("{}: {}", key, e)))
}
