//! # chainconnex-thor
//!
//! The chain query side of ChainConnex: a background head tracker, log
//! filters, event visitors and per-entity visitors, all behind [`Thor`].
//!
//! ```ignore
//! let thor = Thor::new(driver, HeadTrackerConfig::default());
//! let mut ticker = thor.ticker();
//! while let Some(head) = ticker.next().await {
//!     println!("block {}", head.number);
//! }
//! ```

pub mod account;
pub mod block;
pub mod context;
pub mod event;
pub mod explainer;
pub mod filter;
pub mod head_tracker;
pub mod thor;
pub mod transaction;

pub use account::AccountVisitor;
pub use block::BlockVisitor;
pub use event::{DecodedEventLog, EventFilter, EventVisitor};
pub use explainer::Explainer;
pub use filter::{EventKind, Filter, LogKind, TransferKind, MAX_LIMIT};
pub use head_tracker::{HeadTracker, Status, Ticker};
pub use thor::Thor;
pub use transaction::TransactionVisitor;
