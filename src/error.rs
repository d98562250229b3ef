//! Error types shared across the crate.

use std::collections::BTreeMap;

use reqwest::StatusCode;

use crate::api::Action;

/// Convenience alias used by every fallible function in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All the ways a MangoPay call can fail.
///
/// Local precondition failures (`UnknownAction`, `MissingParameter`,
/// `Validation`) are raised before any network traffic. `Api` and
/// `TransactionFailed` come back from the service: the former for non-2xx
/// replies, the latter for replies that are well-formed but describe a
/// rejected transaction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No route is registered for this action.
    #[error("no route registered for action {0:?}")]
    UnknownAction(Action),

    /// A path parameter required by the route is absent or empty.
    #[error("missing required parameter {0}")]
    MissingParameter(&'static str),

    /// A local precondition failed before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Connection, timeout or TLS failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("API error {status}: {message}")]
    Api {
        status: StatusCode,
        message: String,
        /// Per-field diagnostics from the reply's `errors` object.
        details: BTreeMap<String, String>,
    },

    /// The service accepted the call but reported the transaction as
    /// rejected.
    #[error("{kind} {id} failed: {message}")]
    TransactionFailed {
        kind: &'static str,
        id: String,
        message: String,
    },

    /// A response body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Every attempt allowed by the retry policy hit a transient status.
    #[error("request retrying failed for URL: {url}")]
    RetriesExhausted { url: String },

    /// The entity was never attached to a service handle.
    #[error("entity is not bound to a service handle")]
    Unbound,
}
