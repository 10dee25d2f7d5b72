//! `Thor`: the chain query façade.

use std::sync::Arc;

use chainconnex_core::validator::{ensure, is_address, is_bytes32, is_uint32};
use chainconnex_core::{Block, ConnexError, Driver, HeadTrackerConfig, Revision};

use crate::account::AccountVisitor;
use crate::block::BlockVisitor;
use crate::context::Context;
use crate::explainer::Explainer;
use crate::filter::{Filter, LogKind};
use crate::head_tracker::{HeadTracker, Status, Ticker};
use crate::transaction::TransactionVisitor;

/// Entry point for chain reads.
///
/// Owns the head tracker; every visitor it hands out shares it.
pub struct Thor {
    ctx: Context,
    genesis: Block,
}

impl Thor {
    /// Start tracking the chain behind `driver`. Must be called from within a Tokio runtime.
    pub fn new(driver: Arc<dyn Driver>, config: HeadTrackerConfig) -> Self {
        let genesis = driver.genesis().clone();
        let tracker = Arc::new(HeadTracker::spawn(driver.clone(), config));
        Self {
            ctx: Context { driver, tracker },
            genesis,
        }
    }

    pub fn genesis(&self) -> &Block {
        &self.genesis
    }

    pub fn status(&self) -> Status {
        self.ctx.tracker.status()
    }

    pub fn ticker(&self) -> Ticker {
        self.ctx.tracker.ticker()
    }

    pub fn account(&self, addr: &str) -> Result<AccountVisitor, ConnexError> {
        ensure(is_address(addr), "arg0 expected address")?;
        Ok(AccountVisitor::new(self.ctx.clone(), addr.to_lowercase()))
    }

    /// Visit a block by id or number; `None` means the tracked head.
    pub fn block(&self, revision: Option<Revision>) -> Result<BlockVisitor, ConnexError> {
        let revision = match revision {
            None => Revision::Id(self.ctx.tracked_head().id),
            Some(Revision::Id(id)) => {
                ensure(is_bytes32(&id), "arg0 expected bytes32 or non-neg 32-bit integer")?;
                Revision::Id(id.to_lowercase())
            }
            Some(Revision::Number(n)) => {
                ensure(is_uint32(n), "arg0 expected bytes32 or non-neg 32-bit integer")?;
                Revision::Number(n)
            }
        };
        Ok(BlockVisitor::new(self.ctx.clone(), revision))
    }

    pub fn transaction(&self, id: &str) -> Result<TransactionVisitor, ConnexError> {
        ensure(is_bytes32(id), "arg0 expected bytes32")?;
        Ok(TransactionVisitor::new(self.ctx.clone(), id.to_lowercase()))
    }

    /// A fresh filter over the log table selected by `K`.
    pub fn filter<K: LogKind>(&self) -> Filter<K> {
        Filter::new(self.ctx.driver.clone())
    }

    pub fn explain(&self) -> Explainer {
        Explainer::new(self.ctx.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainconnex_core::{ClauseInput, MemoryDriver};

    fn thor() -> (Arc<MemoryDriver>, Thor) {
        let driver = Arc::new(MemoryDriver::new(1_000));
        let thor = Thor::new(driver.clone(), HeadTrackerConfig::default());
        (driver, thor)
    }

    #[tokio::test]
    async fn malformed_keys_rejected_without_driver_calls() {
        let (driver, thor) = thor();
        for bad in ["", "0x1234", "7567d83b7b8d80addcb281a71d54fc7b3364ffed", "0xzz67d83b7b8d80addcb281a71d54fc7b3364ffed"] {
            assert!(thor.account(bad).err().unwrap().is_bad_parameter(), "{bad}");
        }
        assert!(thor.transaction("0x00").is_err());
        assert!(thor.block(Some(Revision::Number(1 << 32))).is_err());
        assert!(thor.block(Some(Revision::Id("0xabc".into()))).is_err());
        assert_eq!(driver.request_count(), 0);
    }

    #[tokio::test]
    async fn block_defaults_to_tracked_head() {
        let (driver, thor) = thor();
        let visitor = thor.block(None).unwrap();
        assert_eq!(visitor.revision(), &Revision::Id(driver.genesis().id.clone()));
        let block = visitor.get().await.unwrap().unwrap();
        assert_eq!(block.number, 0);
        assert!(thor.block(Some(Revision::Number(7))).unwrap().get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn account_reads_are_lowercased() {
        let (driver, thor) = thor();
        let addr = "0x7567D83B7B8D80ADDCB281A71D54FC7B3364FFED";
        driver.set_code(addr, "0x6080");
        let visitor = thor.account(addr).unwrap();
        assert_eq!(visitor.address(), addr.to_lowercase());
        assert_eq!(visitor.get_code().await.unwrap().code, "0x6080");
        assert!(visitor.get_storage("0x01").err().unwrap().is_bad_parameter());
        let requests = driver.request_count();
        let slot = format!("0x{}", "00".repeat(32));
        let pending = visitor.get_storage(&slot).unwrap();
        assert_eq!(driver.request_count(), requests, "no driver call before await");
        assert_eq!(pending.await.unwrap().value, slot);
    }

    #[tokio::test]
    async fn explain_validates_clauses() {
        let (_driver, thor) = thor();
        let err = thor
            .explain()
            .execute(vec![ClauseInput::new().value("-1")])
            .err()
            .unwrap();
        assert!(err.is_bad_parameter());
        assert!(err.to_string().contains("#0.value"));

        let out = thor
            .explain()
            .gas(50_000)
            .unwrap()
            .execute(vec![ClauseInput::new().data("0x01")])
            .unwrap()
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn genesis_and_status() {
        let (driver, thor) = thor();
        assert_eq!(thor.genesis(), driver.genesis());
        assert_eq!(thor.status().head.number, 0);
    }
}
