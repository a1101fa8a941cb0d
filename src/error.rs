//! Error taxonomy for the synchronization layer.
//!
//! All transport and cache operations fail with [`SyncError`]. The enum is
//! `Clone` so the query cache can fan a single failure out to every caller
//! waiting on the same in-flight request.
//!
//! Caller-side precondition failures (missing document id, empty search
//! query) are not errors at this layer — the affected accessor is simply
//! disabled and returns no data.

use thiserror::Error;

/// Error returned by transport calls and cache reads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The server answered with a non-2xx status.
    ///
    /// `message` is the `detail` field of the error body when the body was
    /// parsable JSON, otherwise the generic `"HTTP error {status}"` form.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// The request could not be sent or no response was received.
    #[error("network error: {message}")]
    Network { message: String },

    /// A 2xx response carried a body that did not match the expected shape.
    #[error("invalid response body: {message}")]
    Decode { message: String },
}

impl SyncError {
    /// True when the failure came from a parsed server response rather than
    /// the connection itself.
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Remote { .. })
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Decode {
                message: err.to_string(),
            }
        } else {
            SyncError::Network {
                message: err.to_string(),
            }
        }
    }
}
