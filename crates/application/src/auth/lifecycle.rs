//! Session lifecycle events.
//!
//! The lifecycle owns the one place where an expired session is turned into a
//! "sign in again" signal. Hosts subscribe to [`SessionEvent`]s and decide how
//! to present them; the client itself never navigates.

use bookverse_domain::{Route, UserProfile};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::TokenStore;
use crate::error::RenewalError;

const EVENT_CAPACITY: usize = 32;

/// Notifications about the state of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user signed in.
    SignedIn {
        /// Profile of the new user
        user: UserProfile,
    },
    /// Credentials were renewed in the background.
    Renewed,
    /// The user signed out.
    SignedOut,
    /// The session is gone and the user must sign in again.
    SignInRequired {
        /// Why the session ended
        reason: String,
    },
}

/// Tracks the current location and broadcasts session events.
#[derive(Debug)]
pub struct SessionLifecycle {
    tokens: TokenStore,
    events: broadcast::Sender<SessionEvent>,
    location: Mutex<Route>,
}

impl SessionLifecycle {
    /// Creates a lifecycle bound to the given token store.
    #[must_use]
    pub fn new(tokens: TokenStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tokens,
            events,
            location: Mutex::new(Route::Home),
        }
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Records the location the host is currently showing.
    pub fn navigated(&self, route: Route) {
        *self.location.lock() = route;
    }

    /// Location the host is currently showing.
    #[must_use]
    pub fn current_route(&self) -> Route {
        *self.location.lock()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Announces a successful sign-in.
    pub fn signed_in(&self, user: UserProfile) {
        tracing::info!(user = %user.email, "Signed in");
        self.emit(SessionEvent::SignedIn { user });
    }

    /// Announces a voluntary sign-out.
    pub fn signed_out(&self) {
        tracing::info!("Signed out");
        self.emit(SessionEvent::SignedOut);
    }

    /// Announces a completed renewal.
    pub fn renewed(&self) {
        self.emit(SessionEvent::Renewed);
    }

    /// Ends the session after a failed renewal.
    ///
    /// The session is always cleared. The sign-in signal is raised at most
    /// once per visit: while the host is already on the sign-in page this is
    /// a no-op. Returns true if the signal was raised.
    pub fn expire(&self, reason: &RenewalError) -> bool {
        self.tokens.clear_session();

        {
            let mut location = self.location.lock();
            if *location == Route::SignIn {
                tracing::debug!("Already on sign-in; not redirecting again");
                return false;
            }
            *location = Route::SignIn;
        }

        tracing::warn!(reason = %reason, "Session expired; sign-in required");
        self.emit(SessionEvent::SignInRequired {
            reason: reason.to_string(),
        });
        true
    }
}
