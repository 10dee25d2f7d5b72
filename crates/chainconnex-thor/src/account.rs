//! Account visitor: reads scoped to one address at the tracked head.

use std::sync::Arc;

use chainconnex_core::validator::{ensure, is_bytes32};
use chainconnex_core::{Account, AccountCode, ConnexError, EventCoder, Pending, StorageValue};
use futures::FutureExt;

use crate::context::Context;
use crate::event::EventVisitor;

pub struct AccountVisitor {
    ctx: Context,
    address: String,
}

impl AccountVisitor {
    /// `address` must already be validated and lowercased.
    pub(crate) fn new(ctx: Context, address: String) -> Self {
        Self { ctx, address }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn get(&self) -> Result<Account, ConnexError> {
        let head = self.ctx.tracked_head();
        Ok(self.ctx.driver.get_account(&self.address, &head.id).await?)
    }

    pub async fn get_code(&self) -> Result<AccountCode, ConnexError> {
        let head = self.ctx.tracked_head();
        Ok(self.ctx.driver.get_code(&self.address, &head.id).await?)
    }

    /// Read one storage slot. The key is checked before any driver call.
    pub fn get_storage(&self, key: &str) -> Result<Pending<StorageValue>, ConnexError> {
        ensure(is_bytes32(key), "arg0 expected bytes32")?;
        let driver = Arc::clone(&self.ctx.driver);
        let (address, key) = (self.address.clone(), key.to_lowercase());
        let head = self.ctx.tracked_head();
        Ok(async move { driver.get_storage(&address, &key, &head.id).await.map_err(ConnexError::from) }.boxed())
    }

    /// Visit one event of the contract at this address.
    pub fn event(&self, coder: Arc<dyn EventCoder>) -> EventVisitor {
        EventVisitor::new(self.ctx.driver.clone(), self.address.clone(), coder)
    }
}
