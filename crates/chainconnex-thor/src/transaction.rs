//! Transaction visitor: lookups are made as seen from the tracked head.

use chainconnex_core::{ConnexError, Receipt, Transaction};

use crate::context::Context;

pub struct TransactionVisitor {
    ctx: Context,
    id: String,
}

impl TransactionVisitor {
    pub(crate) fn new(ctx: Context, id: String) -> Self {
        Self { ctx, id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn get(&self) -> Result<Option<Transaction>, ConnexError> {
        let head = self.ctx.tracked_head();
        Ok(self.ctx.driver.get_transaction(&self.id, &head.id).await?)
    }

    pub async fn get_receipt(&self) -> Result<Option<Receipt>, ConnexError> {
        let head = self.ctx.tracked_head();
        Ok(self.ctx.driver.get_receipt(&self.id, &head.id).await?)
    }
}
