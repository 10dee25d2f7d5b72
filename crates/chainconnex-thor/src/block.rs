//! Block visitor.

use chainconnex_core::{Block, ConnexError, Revision};

use crate::context::Context;

pub struct BlockVisitor {
    ctx: Context,
    revision: Revision,
}

impl BlockVisitor {
    pub(crate) fn new(ctx: Context, revision: Revision) -> Self {
        Self { ctx, revision }
    }

    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    /// `None` if the chain has no such block.
    pub async fn get(&self) -> Result<Option<Block>, ConnexError> {
        Ok(self.ctx.driver.get_block(&self.revision).await?)
    }
}
