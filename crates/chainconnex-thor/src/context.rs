//! Shared handles passed to every visitor.

use std::sync::Arc;

use chainconnex_core::{ChainHead, Driver};

use crate::head_tracker::HeadTracker;

#[derive(Clone)]
pub struct Context {
    pub driver: Arc<dyn Driver>,
    pub tracker: Arc<HeadTracker>,
}

impl Context {
    /// Head that visitor reads are pinned to.
    pub fn tracked_head(&self) -> ChainHead {
        self.tracker.head()
    }
}
