//! Timer-driven fetch → cache → evaluate → dispatch loop

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use super::cache::PriceCache;
use super::dispatcher::NotificationDispatcher;
use super::evaluator::AlertEvaluator;
use super::types::{Decision, SchedulerState, TickReport};
use crate::common::channels::{wait_for_shutdown, ShutdownReceiver};
use crate::common::errors::{PusherError, Result};
use crate::common::traits::PriceSource;

/// Drives the alert loop
///
/// Owns the evaluator and therefore all alert state. A failing tick is
/// logged and the loop carries on with the next one.
pub struct Scheduler {
    source: Arc<dyn PriceSource>,
    cache: Arc<PriceCache>,
    evaluator: AlertEvaluator,
    dispatcher: NotificationDispatcher,
    fetch_interval: Duration,
    fetch_timeout: Duration,
    /// `None` disables the periodic summary
    summary_interval: Option<Duration>,
    last_summary_at: Option<DateTime<Utc>>,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(
        source: Arc<dyn PriceSource>,
        cache: Arc<PriceCache>,
        evaluator: AlertEvaluator,
        dispatcher: NotificationDispatcher,
        fetch_interval: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            evaluator,
            dispatcher,
            fetch_interval,
            fetch_timeout,
            summary_interval: None,
            last_summary_at: None,
            state: SchedulerState::Idle,
        }
    }

    /// Also push a summary of every cached price once per `interval`
    ///
    /// A zero interval leaves the summary disabled.
    pub fn with_summary_interval(mut self, interval: Duration) -> Self {
        self.summary_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    fn transition(&mut self, next: SchedulerState) {
        debug!("Scheduler {} -> {}", self.state, next);
        self.state = next;
    }

    /// Run until shutdown is signalled
    ///
    /// The first tick runs immediately. Shutdown is only observed between
    /// ticks, so an in-flight tick always finishes (or times out).
    pub async fn run(mut self, shutdown: ShutdownReceiver) {
        info!(
            "Scheduler started: provider={} interval={:?} cooldown={:?} summary={:?}",
            self.source.provider_name(),
            self.fetch_interval,
            self.evaluator.cooldown(),
            self.summary_interval
        );

        let mut ticker = interval(self.fetch_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = wait_for_shutdown(shutdown.clone()) => {
                    info!("Shutdown requested, scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!(
                            kind = %e.kind(),
                            at = %Utc::now(),
                            "Tick failed: {}",
                            e
                        );
                    }
                }
            }
        }
    }

    /// Run one tick now
    pub async fn tick(&mut self) -> Result<TickReport> {
        self.tick_at(Utc::now()).await
    }

    /// Run one tick, evaluating cooldowns against `now`
    ///
    /// Errors only when the fetch or the cache update fails. Dispatch
    /// failures are logged per asset and reported in
    /// [`TickReport::failed_dispatches`]; their alert state is left as is so
    /// the same breach is retried on the next tick.
    #[instrument(skip(self))]
    pub async fn tick_at(&mut self, now: DateTime<Utc>) -> Result<TickReport> {
        let result = self.run_tick(now).await;
        self.transition(SchedulerState::Idle);
        result
    }

    async fn run_tick(&mut self, now: DateTime<Utc>) -> Result<TickReport> {
        self.transition(SchedulerState::Fetching);
        let fetched = match tokio::time::timeout(self.fetch_timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(PusherError::Timeout(format!(
                "{} fetch exceeded {:?}",
                self.source.provider_name(),
                self.fetch_timeout
            ))),
        };

        let batch = match fetched {
            Ok(snapshots) => self.cache.update(snapshots).await,
            Err(e) => Err(e),
        };
        let batch = match batch {
            Ok(batch) => batch,
            Err(e) => {
                self.cache.record_failure(now, &e).await;
                return Err(e);
            }
        };

        let mut report = TickReport {
            batch_version: batch.version,
            fetched: batch.snapshots.len(),
            ..TickReport::default()
        };

        for snapshot in &batch.snapshots {
            self.transition(SchedulerState::Evaluating);
            let decision = self.evaluator.evaluate(snapshot, now);
            let Decision::Notify(breach) = decision else {
                continue;
            };

            self.transition(SchedulerState::Dispatching);
            match self.dispatcher.dispatch(&decision, snapshot).await {
                Ok(_) => {
                    self.evaluator.commit(snapshot.asset, breach.direction, now);
                    report.notified.push((snapshot.asset, breach.direction));
                }
                Err(e) => {
                    warn!(
                        asset = %snapshot.asset,
                        direction = %breach.direction,
                        kind = %e.kind(),
                        at = %now,
                        "Alert not delivered, will retry next tick: {}",
                        e
                    );
                    report.failed_dispatches.push((snapshot.asset, breach.direction));
                }
            }
        }

        if self.summary_due(now) {
            self.transition(SchedulerState::Dispatching);
            let summary = self.dispatcher.build_summary(&batch, &self.evaluator);
            match self.dispatcher.dispatch_summary(&summary).await {
                Ok(()) => {
                    self.last_summary_at = Some(match self.last_summary_at {
                        Some(prev) if prev > now => prev,
                        _ => now,
                    });
                    report.summary_sent = true;
                }
                Err(e) => {
                    warn!(
                        kind = %e.kind(),
                        at = %now,
                        "Price summary not delivered, will retry next tick: {}",
                        e
                    );
                    report.summary_failed = true;
                }
            }
        }

        Ok(report)
    }

    /// Due on the first tick, then once `summary_interval` has elapsed
    fn summary_due(&self, now: DateTime<Utc>) -> bool {
        let Some(interval) = self.summary_interval else {
            return false;
        };
        match self.last_summary_at {
            None => true,
            Some(last) => (now - last).to_std().map_or(false, |elapsed| elapsed >= interval),
        }
    }
}
