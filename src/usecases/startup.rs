//! Decides what the application does right after boot: restore a persisted
//! session or fall into the guided login/signup flow.

use crate::domain::session::Session;

use super::contracts::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupFlow {
    LaunchShell(Session),
    GuidedAuth,
}

/// A corrupt or unreadable store falls back to guided auth rather than
/// blocking startup; the user can always sign in again.
pub fn plan_startup(store: &dyn SessionStore) -> StartupFlow {
    match store.load() {
        Ok(Some(session)) => {
            tracing::info!(user_id = session.user.id, "restored persisted session");
            StartupFlow::LaunchShell(session)
        }
        Ok(None) => StartupFlow::GuidedAuth,
        Err(error) => {
            tracing::warn!(%error, "session store unavailable, falling back to guided auth");
            StartupFlow::GuidedAuth
        }
    }
}
