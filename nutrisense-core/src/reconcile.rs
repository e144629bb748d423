//! Startup reconciliation and local-first profile writes.
//!
//! Local state is always loaded first. The remote profile, when reachable,
//! then overwrites the local profile field by field and replaces the
//! preference list outright. Profile edits go the other way: they land
//! locally before anything is sent, and a failed push never undoes them.

use std::fmt;

use crate::gateway::{Gateway, GatewayError, ProfilePayload, RemoteWrite, TokenProvider};
use crate::models::Profile;
use crate::state::StateStore;

/// What startup reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// The remote profile was applied and re-persisted.
    Remote { preferences: usize },
    /// No token; local state stays authoritative.
    SignedOut,
    /// The remote profile could not be fetched; local state stays authoritative.
    Unavailable,
}

impl Reconciled {
    pub fn is_remote(&self) -> bool {
        matches!(self, Reconciled::Remote { .. })
    }
}

impl fmt::Display for Reconciled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reconciled::Remote { preferences } => write!(
                f,
                "Profile loaded from server ({} preference(s))",
                preferences
            ),
            Reconciled::SignedOut => write!(f, "Not signed in; using local profile"),
            Reconciled::Unavailable => write!(f, "Server unavailable; using local profile"),
        }
    }
}

/// Merges the remote profile into `state`.
///
/// Never fails: every remote problem leaves the local state in charge.
pub async fn reconcile<G: Gateway>(
    state: &mut StateStore,
    gateway: &G,
    tokens: &dyn TokenProvider,
) -> Reconciled {
    let Some(token) = tokens.token() else {
        tracing::debug!("No token; skipping profile reconciliation");
        return Reconciled::SignedOut;
    };

    let Some(remote) = gateway.get_profile(&token).await else {
        tracing::warn!("Remote profile unavailable; keeping local profile");
        return Reconciled::Unavailable;
    };

    let (profile, preferences) = remote.into_parts();
    let count = preferences.len();
    if state.preferences() != preferences.as_slice() {
        tracing::debug!(
            "Remote preferences replace local ones ({} -> {})",
            state.preferences().len(),
            count
        );
    }
    state.set_profile(profile);
    state.set_preferences(preferences);

    tracing::info!("Reconciled profile with server");
    Reconciled::Remote { preferences: count }
}

/// Pushes the current profile and preferences, if signed in.
pub async fn push_profile<G: Gateway>(
    state: &StateStore,
    gateway: &G,
    tokens: &dyn TokenProvider,
) -> Result<RemoteWrite, GatewayError> {
    let Some(token) = tokens.token() else {
        return Ok(RemoteWrite::Skipped);
    };

    let payload = ProfilePayload::new(state.profile(), state.preferences());
    gateway.put_profile(&token, &payload).await?;
    Ok(RemoteWrite::Synced)
}

/// Saves `profile` locally, then pushes it best-effort.
///
/// The local change stands whatever the push returns.
pub async fn save_profile<G: Gateway>(
    state: &mut StateStore,
    gateway: &G,
    tokens: &dyn TokenProvider,
    profile: Profile,
) -> Result<RemoteWrite, GatewayError> {
    state.set_profile(profile);

    let result = push_profile(state, gateway, tokens).await;
    if let Err(e) = &result {
        tracing::warn!("Profile saved locally only: {}", e);
    }
    result
}
