//! # chainconnex-observability
//!
//! Structured logging for ChainConnex.
//!
//! Background loops (head tracker, owned-address poller) log startup at
//! `info` and every head advance or swallowed poll failure at `debug`.
//! Output is human-readable text or JSON, with levels configurable per
//! component (`chainconnex_thor=debug`).

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
