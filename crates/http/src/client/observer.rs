//! Hooks the UI layer registers to react to session loss

use tracing::{info, warn};

/// Receives session-loss events from the [`SessionClient`](super::SessionClient).
///
/// Both events mean the stored session has already been cleared and the user
/// should be sent to the login entry point.
pub trait SessionObserver: Send + Sync {
    /// The server invalidated this session. `notice` is meant for the user.
    fn forced_logout(&self, notice: &str);

    /// The refresh credential was rejected
    fn session_expired(&self);
}

/// Ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn forced_logout(&self, _notice: &str) {}

    fn session_expired(&self) {}
}

/// Logs events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn forced_logout(&self, notice: &str) {
        warn!(notice, "Session force-closed by server");
    }

    fn session_expired(&self) {
        info!("Session expired, login required");
    }
}
