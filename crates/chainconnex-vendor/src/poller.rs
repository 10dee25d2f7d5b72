//! Owned-address poller.
//!
//! A background task keeps an `ArcSwap` snapshot of the addresses the wallet
//! controls. Lookups read the snapshot without locking and never wait for I/O,
//! so they may lag the wallet by one poll.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chainconnex_core::{Driver, PollerConfig};
use tokio::task::JoinHandle;

pub struct OwnedAddressPoller {
    addresses: Arc<ArcSwap<Vec<String>>>,
    task: JoinHandle<()>,
}

impl OwnedAddressPoller {
    /// Start polling. Must be called from within a Tokio runtime.
    pub fn spawn(driver: Arc<dyn Driver>, config: PollerConfig) -> Self {
        let addresses = Arc::new(ArcSwap::from_pointee(Vec::new()));
        tracing::info!(
            poll_interval_ms = config.poll_interval_ms,
            "Starting owned-address poller"
        );
        let task = tokio::spawn(run(driver, Arc::clone(&addresses), config));
        Self { addresses, task }
    }

    /// The latest snapshot.
    pub fn addresses(&self) -> Arc<Vec<String>> {
        self.addresses.load_full()
    }

    /// Case-insensitive membership test against the latest snapshot.
    pub fn contains(&self, addr: &str) -> bool {
        self.addresses
            .load()
            .iter()
            .any(|a| a.eq_ignore_ascii_case(addr))
    }
}

impl Drop for OwnedAddressPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(driver: Arc<dyn Driver>, cell: Arc<ArcSwap<Vec<String>>>, config: PollerConfig) {
    loop {
        match driver.poll_owned_addresses().await {
            Ok(list) => {
                if **cell.load() != list {
                    tracing::debug!(count = list.len(), "Owned addresses changed");
                }
                cell.store(Arc::new(list));
                tokio::time::sleep(config.poll_interval()).await;
            }
            Err(e) => {
                tracing::debug!(error = %e, "Owned-address poll failed, retrying");
                tokio::time::sleep(config.retry_interval()).await;
            }
        }
    }
}
