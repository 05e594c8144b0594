//! Engine module - the price sampling and alert loop
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 SCHEDULER TASK (single writer)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  every fetch interval:                                      │
//! │    PriceSource.fetch()          (bounded by a timeout)      │
//! │         │                                                   │
//! │         ▼                                                   │
//! │    PriceCache.update()          (whole batch swapped)       │
//! │         │                                                   │
//! │         ▼  per asset                                        │
//! │    AlertEvaluator.evaluate()   → NoAction / Notify          │
//! │         │ (if Notify)                                       │
//! │         ▼                                                   │
//! │    NotificationDispatcher.dispatch()                        │
//! │         │ (if delivered)                                    │
//! │         ▼                                                   │
//! │    AlertEvaluator.commit()                                  │
//! │                                                             │
//! │  when the summary interval has elapsed:                     │
//! │    NotificationDispatcher.dispatch_summary()                │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 HTTP HANDLERS (many readers)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ReadModel → PriceCache.read() / status(), thresholds       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`PriceCache`]: latest batch plus fetch status
//! - [`AlertEvaluator`]: thresholds, cooldown and per-asset alert state
//! - [`NotificationDispatcher`]: payload building and bounded delivery
//! - [`Scheduler`]: the timer-driven loop
//! - [`ReadModel`]: what the HTTP layer is allowed to see

mod cache;
mod dispatcher;
mod evaluator;
mod read_model;
mod scheduler;
mod types;

pub use cache::{PriceBatch, PriceCache};
pub use dispatcher::NotificationDispatcher;
pub use evaluator::{evaluate_breach, AlertEvaluator};
pub use read_model::ReadModel;
pub use scheduler::Scheduler;
pub use types::{Breach, Decision, SchedulerState, TickReport};
