//! Error types for the ChainConnex façade.

use futures::future::BoxFuture;
use thiserror::Error;

/// Errors surfaced to callers of the façade.
///
/// `BadParameter` is always produced before the driver is contacted;
/// `Rejected` only ever comes out of an awaited signing request.
#[derive(Debug, Error)]
pub enum ConnexError {
    /// Caller input failed validation. The message carries the field path,
    /// e.g. `'#2.value' expected ...` or `arg0.#1 can not be encoded: ...`.
    #[error("{0}")]
    BadParameter(String),

    /// The driver (or the human behind the wallet) declined a signing request.
    #[error("{0}")]
    Rejected(String),

    /// A query-side driver failure, passed through unchanged.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Decoding a log returned by a successful query failed.
    #[error(transparent)]
    Decode(#[from] CodecError),
}

impl ConnexError {
    pub fn bad_parameter(msg: impl Into<String>) -> Self {
        Self::BadParameter(msg.into())
    }

    /// Returns `true` if the caller supplied malformed input.
    pub fn is_bad_parameter(&self) -> bool {
        matches!(self, Self::BadParameter(_))
    }

    /// Returns `true` if a signing request was declined.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Errors reported by a [`Driver`](crate::driver::Driver) implementation.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// Network / node connectivity failure. Transient.
    #[error("{0}")]
    Transport(String),

    /// The wallet or its user refused the request.
    #[error("{0}")]
    Declined(String),

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl DriverError {
    /// Returns `true` if retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Errors from an [`EventCoder`](crate::coder::EventCoder).
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("invalid ABI: {reason}")]
    InvalidAbi { reason: String },

    #[error("{reason}")]
    Encode { reason: String },

    #[error("decode failed: {reason}")]
    Decode { reason: String },
}

/// A validated request whose driver round-trip has not started yet.
///
/// Returned by the signing services: building it can fail with
/// `BadParameter`, awaiting it can fail with `Rejected`.
pub type Pending<T> = BoxFuture<'static, Result<T, ConnexError>>;
