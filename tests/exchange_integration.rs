//! Integration tests for the exchange price sources
//!
//! The exchanges are stood in for by a local wiremock server, so these run
//! offline:
//! ```
//! cargo test --test exchange_integration
//! ```

mod common;

use common::api_responses;
use crypto_pusher::common::errors::{ErrorKind, PusherError};
use crypto_pusher::common::traits::PriceSource;
use crypto_pusher::common::types::Asset;
use crypto_pusher::exchange::{BinancePriceSource, CoinGeckoPriceSource};
use rust_decimal_macros::dec;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Binance
// ============================================================================

#[tokio::test]
async fn test_binance_fetch_returns_one_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .and(query_param("symbols", r#"["BTCBRL","ETHBRL"]"#))
        .respond_with(ResponseTemplate::new(200).set_body_string(api_responses::BINANCE_TICKERS))
        .expect(1)
        .mount(&server)
        .await;

    let source = BinancePriceSource::new(&server.uri(), "BRL").unwrap();
    let snapshots = source.fetch().await.unwrap();

    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].asset, Asset::Btc);
    assert_eq!(snapshots[0].price, dec!(615576));
    assert_eq!(snapshots[1].asset, Asset::Eth);
    assert_eq!(snapshots[1].price, dec!(25807.12));
    assert_eq!(snapshots[0].fetched_at, snapshots[1].fetched_at);
}

#[tokio::test]
async fn test_binance_missing_asset_rejects_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .respond_with(ResponseTemplate::new(200).set_body_string(api_responses::BINANCE_PARTIAL))
        .mount(&server)
        .await;

    let source = BinancePriceSource::new(&server.uri(), "BRL").unwrap();
    let err = source.fetch().await.unwrap_err();

    assert!(matches!(err, PusherError::InvalidResponse(ref msg) if msg.contains("ETHBRL")));
    assert_eq!(err.kind(), ErrorKind::Fetch);
}

#[tokio::test]
async fn test_binance_error_status_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .respond_with(ResponseTemplate::new(400).set_body_string(api_responses::BINANCE_ERROR))
        .mount(&server)
        .await;

    let source = BinancePriceSource::new(&server.uri(), "BRL").unwrap();
    let err = source.fetch().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert!(err.to_string().contains("Invalid symbol."));
}

#[tokio::test]
async fn test_binance_malformed_body_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let source = BinancePriceSource::new(&server.uri(), "BRL").unwrap();
    let err = source.fetch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
}

#[tokio::test]
async fn test_binance_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(api_responses::BINANCE_TICKERS)
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let source =
        BinancePriceSource::with_timeout(&server.uri(), "BRL", Duration::from_millis(100)).unwrap();
    let err = source.fetch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
}

// ============================================================================
// CoinGecko
// ============================================================================

#[tokio::test]
async fn test_coingecko_fetch_returns_one_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/simple/price"))
        .and(query_param("ids", "bitcoin,ethereum"))
        .and(query_param("vs_currencies", "brl"))
        .respond_with(ResponseTemplate::new(200).set_body_string(api_responses::COINGECKO_SIMPLE))
        .expect(1)
        .mount(&server)
        .await;

    let source = CoinGeckoPriceSource::new(&server.uri(), "BRL").unwrap();
    let snapshots = source.fetch().await.unwrap();

    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].price, dec!(615576));
    assert_eq!(snapshots[1].price, dec!(25807.12));
}

#[tokio::test]
async fn test_coingecko_non_numeric_price_rejects_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/simple/price"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(api_responses::COINGECKO_NON_NUMERIC),
        )
        .mount(&server)
        .await;

    let source = CoinGeckoPriceSource::new(&server.uri(), "BRL").unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, PusherError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_coingecko_rate_limited_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/simple/price"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let source = CoinGeckoPriceSource::new(&server.uri(), "BRL").unwrap();
    let err = source.fetch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn test_coingecko_wrong_currency_is_missing_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_string(api_responses::COINGECKO_SIMPLE))
        .mount(&server)
        .await;

    let source = CoinGeckoPriceSource::new(&server.uri(), "USD").unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(err.to_string().contains("Missing usd price"));
}
