//! Domain types shared by the exchange clients, the alert engine and the API

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::{PusherError, Result};

/// Tracked crypto asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    #[serde(alias = "btc")]
    Btc,
    #[serde(alias = "eth")]
    Eth,
}

impl Asset {
    /// Every asset sampled on each tick
    pub const ALL: [Asset; 2] = [Asset::Btc, Asset::Eth];

    /// Ticker symbol, e.g. `BTC`
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Btc => "BTC",
            Asset::Eth => "ETH",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Asset::Btc => "Bitcoin",
            Asset::Eth => "Ethereum",
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for Asset {
    type Err = PusherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BTC" => Ok(Asset::Btc),
            "ETH" => Ok(Asset::Eth),
            other => Err(PusherError::Configuration(format!(
                "Unsupported asset: {}",
                other
            ))),
        }
    }
}

/// Which side of the configured band a price broke out of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Below,
    Above,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Below => write!(f, "below"),
            Direction::Above => write!(f, "above"),
        }
    }
}

/// A single price reading for one asset, taken in one fetch batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Asset this price belongs to
    pub asset: Asset,
    /// Price in fiat currency units
    pub price: Decimal,
    /// When the batch containing this reading was fetched
    pub fetched_at: DateTime<Utc>,
}

impl PriceSnapshot {
    pub fn new(asset: Asset, price: Decimal, fetched_at: DateTime<Utc>) -> Self {
        Self {
            asset,
            price,
            fetched_at,
        }
    }
}

/// Alert band for one asset
///
/// Prices strictly below `lower_bound` or strictly above `upper_bound` are
/// breaches. A price equal to either bound is inside the band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThreshold {
    pub asset: Asset,
    pub lower_bound: Decimal,
    pub upper_bound: Decimal,
}

impl AlertThreshold {
    /// Create a threshold, rejecting an empty or inverted band
    pub fn new(asset: Asset, lower_bound: Decimal, upper_bound: Decimal) -> Result<Self> {
        let threshold = Self {
            asset,
            lower_bound,
            upper_bound,
        };
        threshold.validate()?;
        Ok(threshold)
    }

    /// Check the `lower_bound < upper_bound` invariant
    pub fn validate(&self) -> Result<()> {
        if self.lower_bound >= self.upper_bound {
            return Err(PusherError::Configuration(format!(
                "{} threshold lower bound {} must be below upper bound {}",
                self.asset, self.lower_bound, self.upper_bound
            )));
        }
        Ok(())
    }

    /// Classify a price against this band
    pub fn breach(&self, price: Decimal) -> Option<Direction> {
        if price < self.lower_bound {
            Some(Direction::Below)
        } else if price > self.upper_bound {
            Some(Direction::Above)
        } else {
            None
        }
    }

    /// The bound crossed for a given direction
    pub fn bound(&self, direction: Direction) -> Decimal {
        match direction {
            Direction::Below => self.lower_bound,
            Direction::Above => self.upper_bound,
        }
    }
}

/// Per-asset notification bookkeeping, owned by the alert evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertState {
    pub last_notified_at: Option<DateTime<Utc>>,
    pub last_notified_direction: Option<Direction>,
}

/// Notification handed to a [`Notifier`](super::traits::Notifier)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub asset: Asset,
    pub price: Decimal,
    /// Price rendered for humans in the configured fiat currency
    pub formatted_price: String,
    /// ISO code of the fiat currency
    pub currency: String,
    pub direction: Direction,
    /// The bound that was crossed
    pub threshold: Decimal,
    pub formatted_threshold: String,
    pub generated_at: DateTime<Utc>,
}

impl NotificationPayload {
    /// Notification title
    pub fn title(&self) -> &'static str {
        "CRYPTO ANALYSER"
    }

    /// One-line notification body
    pub fn body(&self) -> String {
        format!(
            "{} {} {}: {}",
            self.asset, self.direction, self.formatted_threshold, self.formatted_price
        )
    }
}

/// Where a price sits relative to its alert band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BandStatus {
    Normal,
    Low,
    High,
}

impl From<Option<Direction>> for BandStatus {
    fn from(breach: Option<Direction>) -> Self {
        match breach {
            None => BandStatus::Normal,
            Some(Direction::Below) => BandStatus::Low,
            Some(Direction::Above) => BandStatus::High,
        }
    }
}

impl std::fmt::Display for BandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BandStatus::Normal => write!(f, "NORMAL"),
            BandStatus::Low => write!(f, "LOW"),
            BandStatus::High => write!(f, "HIGH"),
        }
    }
}

/// One asset's line in a [`PriceSummary`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub asset: Asset,
    pub price: Decimal,
    pub formatted_price: String,
    pub status: BandStatus,
}

/// Periodic digest of every cached price, sent on its own interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub currency: String,
    /// Version of the cached batch the summary was built from
    pub batch_version: u64,
    pub entries: Vec<SummaryEntry>,
    pub generated_at: DateTime<Utc>,
}

impl PriceSummary {
    pub fn title(&self) -> &'static str {
        "CRYPTO ANALYSER"
    }

    /// e.g. `BTC: R$ 615.576,00 (NORMAL) | ETH: R$ 27.000,00 (HIGH)`
    pub fn body(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {} ({})", e.asset, e.formatted_price, e.status))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Outcome of the most recent fetch attempt
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchStatus {
    pub last_fetch_at: Option<DateTime<Utc>>,
    pub last_fetch_succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
