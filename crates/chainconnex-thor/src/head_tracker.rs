//! Head tracker: keeps the latest known chain head fresh in the background.
//!
//! A single spawned task polls the driver forever and writes into a
//! `tokio::sync::watch` cell. Readers clone the current snapshot without
//! waiting; [`Ticker`]s await the next change.
//!
//! # Loop
//! ```text
//! poll_head() ── Ok(head) ──▶ replace if id changed ──▶ sleep(poll_interval)
//!             └─ Err(e) ───▶ debug!(e)             ──▶ sleep(retry_interval)
//! ```

use std::sync::Arc;

use chainconnex_core::{ChainHead, Driver, HeadTrackerConfig};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Chain status as seen by this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub head: ChainHead,
    /// Sync completeness estimate in `[0, 1]`.
    pub progress: f64,
}

/// Owns the head-polling task. The task is aborted when the tracker is dropped.
pub struct HeadTracker {
    genesis: ChainHead,
    rx: watch::Receiver<ChainHead>,
    task: JoinHandle<()>,
    config: HeadTrackerConfig,
}

impl HeadTracker {
    /// Start tracking from the driver's genesis block.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(driver: Arc<dyn Driver>, config: HeadTrackerConfig) -> Self {
        let genesis = driver.genesis().head();
        let (tx, rx) = watch::channel(genesis.clone());

        tracing::info!(
            genesis = %genesis.id,
            poll_interval_ms = config.poll_interval_ms,
            "Starting head tracker"
        );
        let task = tokio::spawn(run(driver, tx, config.clone()));

        Self {
            genesis,
            rx,
            task,
            config,
        }
    }

    /// The latest known head. Never blocks.
    pub fn head(&self) -> ChainHead {
        self.rx.borrow().clone()
    }

    pub fn genesis(&self) -> &ChainHead {
        &self.genesis
    }

    /// Sync progress, computed against the wall clock on every call.
    pub fn progress(&self) -> f64 {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        progress_at(
            self.genesis.timestamp,
            self.rx.borrow().timestamp,
            now,
            self.config.sync_threshold_secs,
        )
    }

    pub fn status(&self) -> Status {
        Status {
            head: self.head(),
            progress: self.progress(),
        }
    }

    /// A ticker armed at the current head. Its first `next()` resolves on
    /// the first head change after this call.
    pub fn ticker(&self) -> Ticker {
        let mut rx = self.rx.clone();
        rx.borrow_and_update();
        Ticker { rx }
    }
}

impl Drop for HeadTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Re-armable "next block" notification.
///
/// Each ticker remembers the last head it reported; tickers are independent
/// of each other and can be dropped at any time.
pub struct Ticker {
    rx: watch::Receiver<ChainHead>,
}

impl Ticker {
    /// Wait for the head to change, then return the new head.
    ///
    /// Returns `None` once the tracker has been dropped.
    pub async fn next(&mut self) -> Option<ChainHead> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

async fn run(driver: Arc<dyn Driver>, tx: watch::Sender<ChainHead>, config: HeadTrackerConfig) {
    loop {
        match driver.poll_head().await {
            Ok(head) => {
                let (number, id) = (head.number, head.id.clone());
                let advanced = tx.send_if_modified(|current| {
                    if current.id == head.id {
                        return false;
                    }
                    *current = head;
                    true
                });
                if advanced {
                    tracing::debug!(number, id = %id, "Head advanced");
                }
                tokio::time::sleep(config.poll_interval()).await;
            }
            Err(e) => {
                tracing::debug!(error = %e, "Head poll failed, retrying");
                tokio::time::sleep(config.retry_interval()).await;
            }
        }
    }
}

fn progress_at(genesis_ts: u64, head_ts: u64, now: u64, threshold_secs: u64) -> f64 {
    if now.saturating_sub(head_ts) < threshold_secs {
        return 1.0;
    }
    let total = now.saturating_sub(genesis_ts);
    if total == 0 {
        return 1.0;
    }
    (head_ts.saturating_sub(genesis_ts) as f64 / total as f64).clamp(0.0, 1.0)
}
