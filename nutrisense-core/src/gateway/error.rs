//! Gateway error types.

use thiserror::Error;

/// Errors reported by remote calls.
///
/// None of these are fatal: local state is never rolled back, the session
/// just isn't synchronized yet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// No bearer token and the action cannot be skipped.
    #[error("Please log in to continue")]
    AuthMissing,

    /// A write was rejected or never reached the server.
    #[error("Save failed: {0}")]
    SaveFailed(String),

    /// A read was rejected or never reached the server.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),
}

impl GatewayError {
    pub fn is_auth_missing(&self) -> bool {
        matches!(self, GatewayError::AuthMissing)
    }
}
