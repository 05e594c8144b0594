//! Crypto Pusher Library
//!
//! Samples BTC/ETH prices from an exchange on a fixed interval, checks them
//! against configured alert bands and pushes notifications when a band is
//! broken, with a per-direction cooldown to avoid alert storms. A summary of
//! every price can also be pushed on its own interval.

pub mod api;
pub mod common;
pub mod config;
pub mod engine;
pub mod exchange;
pub mod notify;

// Re-export commonly used types
pub use common::errors::{ErrorKind, PusherError, Result};
pub use common::traits::{Notifier, PriceSource};
pub use common::types::{
    AlertState, AlertThreshold, Asset, BandStatus, Direction, FetchStatus, NotificationPayload,
    PriceSnapshot, PriceSummary, SummaryEntry,
};
pub use config::types::AppConfig;
pub use engine::{
    AlertEvaluator, Decision, NotificationDispatcher, PriceBatch, PriceCache, ReadModel,
    Scheduler, SchedulerState, TickReport,
};
pub use exchange::{BinancePriceSource, CoinGeckoPriceSource};
pub use notify::{LogNotifier, WebhookNotifier};
