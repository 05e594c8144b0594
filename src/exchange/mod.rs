//! Exchange module - price sources for the alert loop

pub mod binance;
pub mod coingecko;
pub mod messages;

pub use binance::BinancePriceSource;
pub use coingecko::CoinGeckoPriceSource;

use std::sync::Arc;

use crate::common::errors::Result;
use crate::common::traits::PriceSource;
use crate::config::types::{ExchangeConfig, PriceProvider};

/// Build the configured price source
pub fn build_price_source(config: &ExchangeConfig) -> Result<Arc<dyn PriceSource>> {
    let timeout = config.request_timeout();
    let source: Arc<dyn PriceSource> = match config.provider {
        PriceProvider::Binance => Arc::new(BinancePriceSource::with_timeout(
            &config.binance_url,
            &config.currency,
            timeout,
        )?),
        PriceProvider::CoinGecko => Arc::new(CoinGeckoPriceSource::with_timeout(
            &config.coingecko_url,
            &config.currency,
            timeout,
        )?),
    };
    Ok(source)
}
