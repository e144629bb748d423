//! Remote profile, activity and recommendation gateway.
//!
//! Every call needs a bearer token from the identity collaborator
//! ([`TokenProvider`]). The gateway itself always takes a token; deciding what
//! to do when there is none (skip, or report `AuthMissing`) is the caller's
//! job, see [`crate::Engine`].

mod client;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod protocol;
mod token;

pub use client::{Gateway, HttpGateway, DEFAULT_TIMEOUT};
pub use error::GatewayError;
pub use protocol::{FridgeAnalysis, Location, ProfilePayload, RemoteProfile};
pub use token::{StaticToken, TokenProvider};

/// Outcome of a best-effort remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteWrite {
    /// The server accepted the write.
    Synced,
    /// No token was available, so nothing was sent.
    Skipped,
}
