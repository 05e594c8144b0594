//! Crypto Pusher - Main Entry Point
//!
//! Runs the price sampling / alert loop in the background and serves the
//! read-only HTTP API until Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crypto_pusher::api;
use crypto_pusher::common::channels::{create_shutdown_channel, supervise, wait_for_shutdown};
use crypto_pusher::config::{load_config, load_from_env, AppConfig};
use crypto_pusher::engine::{AlertEvaluator, NotificationDispatcher, PriceCache, ReadModel, Scheduler};
use crypto_pusher::exchange::build_price_source;
use crypto_pusher::notify::build_notifier;

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Read flat variables (BTC_LOWEST, BTC_HIGH, ...) instead of the config file
    #[arg(long)]
    env_only: bool,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config: AppConfig = if args.env_only {
        load_from_env()?
    } else {
        load_config(Some(&args.config))?
    };

    // Initialize logging
    let level = parse_level(args.log_level.as_deref().unwrap_or(&config.settings.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting crypto pusher");
    if !args.env_only {
        info!("Configuration file: {}", args.config);
    }

    // Misconfiguration is fatal before anything starts
    config.validate().context("invalid configuration")?;
    let thresholds = config.thresholds()?;

    let source = build_price_source(&config.exchange)?;
    let notifier = build_notifier(&config.notifier)?;
    let cache = Arc::new(PriceCache::new());

    let scheduler = Scheduler::new(
        source,
        cache.clone(),
        AlertEvaluator::new(thresholds.clone(), config.scheduler.cooldown()),
        NotificationDispatcher::new(notifier, &config.exchange.currency, config.notifier.timeout()),
        config.scheduler.fetch_interval(),
        config.exchange.request_timeout(),
    )
    .with_summary_interval(config.scheduler.summary_interval());
    let read_model = ReadModel::new(
        cache,
        thresholds,
        config.scheduler.cooldown(),
        &config.exchange.currency,
    );

    let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx.clone()));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let server = axum::serve(listener, api::router(read_model))
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx));
    let server_handle = tokio::spawn(async move { server.await });

    info!("Application initialized successfully");

    supervise(tokio::signal::ctrl_c(), server_handle, &shutdown_tx).await?;
    scheduler_handle.await?;

    Ok(())
}
