use rust_decimal::Decimal;
use serde::Serialize;

use crate::common::types::{Asset, Direction};

/// A breach worth notifying about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Breach {
    pub direction: Direction,
    /// The bound that was crossed
    pub bound: Decimal,
}

/// Alert evaluator output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to send for this snapshot
    NoAction,
    /// Send a notification for this breach
    Notify(Breach),
}

impl Decision {
    /// Create a NoAction decision
    pub fn no_action() -> Self {
        Self::NoAction
    }

    /// Create a Notify decision
    pub fn notify(direction: Direction, bound: Decimal) -> Self {
        Self::Notify(Breach { direction, bound })
    }

    /// Returns true if this is a Notify decision
    pub fn is_notify(&self) -> bool {
        matches!(self, Self::Notify(_))
    }

    /// Direction of the breach, if any
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::NoAction => None,
            Self::Notify(breach) => Some(breach.direction),
        }
    }
}

/// Phase of the scheduler's fetch → evaluate → dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Fetching,
    Evaluating,
    Dispatching,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "idle"),
            SchedulerState::Fetching => write!(f, "fetching"),
            SchedulerState::Evaluating => write!(f, "evaluating"),
            SchedulerState::Dispatching => write!(f, "dispatching"),
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Version of the cached batch written by this tick
    pub batch_version: u64,
    /// Snapshots written to the cache
    pub fetched: usize,
    /// Notifications delivered and committed
    pub notified: Vec<(Asset, Direction)>,
    /// Notifications attempted but not delivered
    pub failed_dispatches: Vec<(Asset, Direction)>,
    /// A periodic summary was delivered this tick
    pub summary_sent: bool,
    /// A periodic summary was due but not delivered
    pub summary_failed: bool,
}
