//! Error taxonomy for client operations
//!
//! Every failure is terminal for the one user action that triggered it:
//! the caller logs and keeps its prior state. There is no retry policy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    /// The backend reported that the query does not identify a real channel
    #[error("channel not found: {0}")]
    NotFound(String),

    /// A sync key failed the local format check before any network call
    #[error("invalid sync key")]
    InvalidKey,

    /// No channels are tracked, so there is nothing to query
    #[error("no channels are tracked")]
    EmptyTrackingList,

    /// The request failed in transport or the response was not valid JSON
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The API endpoint is not configured
    #[error("API endpoint not configured (set api.endpoint in the config file)")]
    NotConfigured,
}
