//! Process-wide holder of the latest price batch

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::common::errors::{PusherError, Result};
use crate::common::types::{Asset, FetchStatus, PriceSnapshot};

/// One successfully fetched batch, shared read-only with every reader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBatch {
    /// Increments by one on every successful update, starting at 1
    pub version: u64,
    pub snapshots: Vec<PriceSnapshot>,
    pub updated_at: DateTime<Utc>,
}

impl PriceBatch {
    /// Snapshot for one asset
    pub fn get(&self, asset: Asset) -> Option<&PriceSnapshot> {
        self.snapshots.iter().find(|s| s.asset == asset)
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    batch: Option<Arc<PriceBatch>>,
    status: FetchStatus,
}

/// Latest price batch plus fetch status
///
/// Single writer (the scheduler), many readers. A write swaps the whole
/// batch under the write lock, so readers see either the previous batch or
/// the new one, never a mix.
#[derive(Debug, Default)]
pub struct PriceCache {
    inner: RwLock<CacheInner>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored batch
    ///
    /// Rejects empty batches and batches with two snapshots for one asset;
    /// the previous batch stays in place in that case.
    pub async fn update(&self, snapshots: Vec<PriceSnapshot>) -> Result<Arc<PriceBatch>> {
        if snapshots.is_empty() {
            return Err(PusherError::Internal("Refusing to cache an empty batch".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = snapshots.iter().find(|s| !seen.insert(s.asset)) {
            return Err(PusherError::Internal(format!(
                "Duplicate {} snapshot in batch",
                dup.asset
            )));
        }

        let updated_at = Utc::now();
        let mut inner = self.inner.write().await;
        let version = inner.batch.as_ref().map_or(0, |b| b.version) + 1;
        let batch = Arc::new(PriceBatch {
            version,
            snapshots,
            updated_at,
        });
        inner.batch = Some(batch.clone());
        inner.status = FetchStatus {
            last_fetch_at: Some(updated_at),
            last_fetch_succeeded: true,
            last_error: None,
        };
        debug!("Price cache updated to version {}", version);

        Ok(batch)
    }

    /// Latest batch, or `CacheEmpty` before the first successful update
    pub async fn read(&self) -> Result<Arc<PriceBatch>> {
        self.inner
            .read()
            .await
            .batch
            .clone()
            .ok_or(PusherError::CacheEmpty)
    }

    /// Record a failed fetch; the stored batch is left untouched
    pub async fn record_failure(&self, at: DateTime<Utc>, error: &PusherError) {
        let mut inner = self.inner.write().await;
        inner.status = FetchStatus {
            last_fetch_at: Some(at),
            last_fetch_succeeded: false,
            last_error: Some(error.to_string()),
        };
    }

    /// Outcome of the most recent fetch
    pub async fn status(&self) -> FetchStatus {
        self.inner.read().await.status.clone()
    }
}
