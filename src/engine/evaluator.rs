//! Threshold evaluation with per-asset, per-direction cooldown

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::types::Decision;
use crate::common::types::{
    AlertState, AlertThreshold, Asset, BandStatus, Direction, PriceSnapshot,
};

/// Decide whether a snapshot warrants a notification
///
/// A missing threshold means the asset is never alerted on. A breach in the
/// same direction as the last delivered notification is suppressed while
/// `now - last_notified_at < cooldown`; a breach in the other direction is
/// never suppressed by that cooldown.
pub fn evaluate_breach(
    snapshot: &PriceSnapshot,
    threshold: Option<&AlertThreshold>,
    prior: &AlertState,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Decision {
    let Some(threshold) = threshold else {
        return Decision::NoAction;
    };
    let Some(direction) = threshold.breach(snapshot.price) else {
        return Decision::NoAction;
    };

    if prior.last_notified_direction == Some(direction) {
        if let Some(last) = prior.last_notified_at {
            // negative elapsed (clock stepped back) counts as still cooling down
            let cooling = match (now - last).to_std() {
                Ok(elapsed) => elapsed < cooldown,
                Err(_) => true,
            };
            if cooling {
                return Decision::NoAction;
            }
        }
    }

    Decision::notify(direction, threshold.bound(direction))
}

/// Owns the thresholds and the alert state for every asset
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    thresholds: HashMap<Asset, AlertThreshold>,
    states: HashMap<Asset, AlertState>,
    cooldown: Duration,
}

impl AlertEvaluator {
    pub fn new(thresholds: Vec<AlertThreshold>, cooldown: Duration) -> Self {
        Self {
            thresholds: thresholds.into_iter().map(|t| (t.asset, t)).collect(),
            states: HashMap::new(),
            cooldown,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn threshold(&self, asset: Asset) -> Option<&AlertThreshold> {
        self.thresholds.get(&asset)
    }

    /// Evaluate a snapshot against its threshold and the current state
    ///
    /// Does not change state; call [`commit`](Self::commit) once the
    /// notification has actually been delivered.
    pub fn evaluate(&self, snapshot: &PriceSnapshot, now: DateTime<Utc>) -> Decision {
        let prior = self.state(snapshot.asset);
        let decision = evaluate_breach(
            snapshot,
            self.threshold(snapshot.asset),
            &prior,
            self.cooldown,
            now,
        );
        debug!(
            asset = %snapshot.asset,
            price = %snapshot.price,
            "Evaluated snapshot: {:?}",
            decision
        );
        decision
    }

    /// Band position of a snapshot, ignoring cooldown
    pub fn band_status(&self, snapshot: &PriceSnapshot) -> BandStatus {
        self.threshold(snapshot.asset)
            .and_then(|t| t.breach(snapshot.price))
            .into()
    }

    /// Record a delivered notification
    ///
    /// `last_notified_at` never moves backwards.
    pub fn commit(&mut self, asset: Asset, direction: Direction, notified_at: DateTime<Utc>) {
        let state = self.states.entry(asset).or_default();
        state.last_notified_at = Some(match state.last_notified_at {
            Some(prev) if prev > notified_at => prev,
            _ => notified_at,
        });
        state.last_notified_direction = Some(direction);
    }

    /// Current state for an asset
    pub(crate) fn state(&self, asset: Asset) -> AlertState {
        self.states.get(&asset).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const COOLDOWN: Duration = Duration::from_secs(600);

    fn evaluator() -> AlertEvaluator {
        AlertEvaluator::new(
            vec![AlertThreshold::new(Asset::Btc, dec!(610000), dec!(630000)).unwrap()],
            COOLDOWN,
        )
    }

    fn btc(price: Decimal, at: DateTime<Utc>) -> PriceSnapshot {
        PriceSnapshot::new(Asset::Btc, price, at)
    }

    /// Evaluate and commit on Notify, like the scheduler does after a
    /// successful dispatch
    fn step(ev: &mut AlertEvaluator, price: Decimal, at: DateTime<Utc>) -> Decision {
        let decision = ev.evaluate(&btc(price, at), at);
        if let Decision::Notify(breach) = decision {
            ev.commit(Asset::Btc, breach.direction, at);
        }
        decision
    }

    #[test]
    fn test_inside_band_is_no_action() {
        let ev = evaluator();
        let now = Utc::now();
        for price in [dec!(610000.01), dec!(615000), dec!(629999.99)] {
            assert_eq!(ev.evaluate(&btc(price, now), now), Decision::NoAction);
        }
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let ev = evaluator();
        let now = Utc::now();
        assert_eq!(ev.evaluate(&btc(dec!(610000), now), now), Decision::NoAction);
        assert_eq!(ev.evaluate(&btc(dec!(630000), now), now), Decision::NoAction);
    }

    #[test]
    fn test_breach_reports_crossed_bound() {
        let ev = evaluator();
        let now = Utc::now();
        assert_eq!(
            ev.evaluate(&btc(dec!(600000), now), now),
            Decision::notify(Direction::Below, dec!(610000))
        );
        assert_eq!(
            ev.evaluate(&btc(dec!(640000), now), now),
            Decision::notify(Direction::Above, dec!(630000))
        );
    }

    #[test]
    fn test_cooldown_suppresses_then_expires() {
        let mut ev = evaluator();
        let t0 = Utc::now();

        assert_eq!(step(&mut ev, dec!(605000), t0).direction(), Some(Direction::Below));
        assert_eq!(
            step(&mut ev, dec!(604000), t0 + ChronoDuration::minutes(5)),
            Decision::NoAction
        );
        assert_eq!(
            step(&mut ev, dec!(603000), t0 + ChronoDuration::minutes(10)).direction(),
            Some(Direction::Below)
        );
    }

    #[test]
    fn test_direction_change_ignores_cooldown() {
        let mut ev = evaluator();
        let t0 = Utc::now();

        assert_eq!(step(&mut ev, dec!(605000), t0).direction(), Some(Direction::Below));
        assert_eq!(
            step(&mut ev, dec!(635000), t0 + ChronoDuration::seconds(60)).direction(),
            Some(Direction::Above)
        );
        // and back again, still inside the first cooldown window
        assert_eq!(
            step(&mut ev, dec!(605000), t0 + ChronoDuration::seconds(120)).direction(),
            Some(Direction::Below)
        );
    }

    #[test]
    fn test_reference_sequence() {
        let mut ev = evaluator();
        let t0 = Utc::now();
        let minute = ChronoDuration::minutes(1);

        let decisions: Vec<Option<Direction>> = [dec!(615000), dec!(605000), dec!(605000), dec!(635000)]
            .into_iter()
            .enumerate()
            .map(|(i, price)| step(&mut ev, price, t0 + minute * i as i32).direction())
            .collect();

        assert_eq!(
            decisions,
            vec![None, Some(Direction::Below), None, Some(Direction::Above)]
        );
    }

    #[test]
    fn test_missing_threshold_never_notifies() {
        let ev = evaluator();
        let now = Utc::now();
        let eth = PriceSnapshot::new(Asset::Eth, dec!(1), now);
        assert_eq!(ev.evaluate(&eth, now), Decision::NoAction);
    }

    #[test]
    fn test_uncommitted_decision_repeats() {
        let ev = evaluator();
        let now = Utc::now();
        let first = ev.evaluate(&btc(dec!(600000), now), now);
        let second = ev.evaluate(&btc(dec!(600000), now), now + ChronoDuration::seconds(1));
        assert!(first.is_notify());
        assert_eq!(first, second);
        assert_eq!(ev.state(Asset::Btc), AlertState::default());
    }

    #[test]
    fn test_commit_is_monotonic() {
        let mut ev = evaluator();
        let t0 = Utc::now();
        ev.commit(Asset::Btc, Direction::Below, t0);
        ev.commit(Asset::Btc, Direction::Above, t0 - ChronoDuration::seconds(30));

        let state = ev.state(Asset::Btc);
        assert_eq!(state.last_notified_at, Some(t0));
        assert_eq!(state.last_notified_direction, Some(Direction::Above));
    }

    #[test]
    fn test_clock_step_back_counts_as_cooling() {
        let prior = AlertState {
            last_notified_at: Some(Utc::now()),
            last_notified_direction: Some(Direction::Below),
        };
        let threshold = AlertThreshold::new(Asset::Btc, dec!(610000), dec!(630000)).unwrap();
        let earlier = Utc::now() - ChronoDuration::minutes(1);
        let decision = evaluate_breach(
            &btc(dec!(600000), earlier),
            Some(&threshold),
            &prior,
            COOLDOWN,
            earlier,
        );
        assert_eq!(decision, Decision::NoAction);
    }

    #[test]
    fn test_band_status_ignores_cooldown() {
        let mut ev = evaluator();
        let now = Utc::now();
        ev.commit(Asset::Btc, Direction::Below, now);

        assert_eq!(ev.band_status(&btc(dec!(600000), now)), BandStatus::Low);
        assert_eq!(ev.band_status(&btc(dec!(620000), now)), BandStatus::Normal);
        assert_eq!(ev.band_status(&btc(dec!(640000), now)), BandStatus::High);
        let eth = PriceSnapshot::new(Asset::Eth, dec!(1), now);
        assert_eq!(ev.band_status(&eth), BandStatus::Normal);
    }
}
