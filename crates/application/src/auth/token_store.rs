//! Durable holder of the session credentials.
//!
//! Values live in a [`KeyValueStorage`] under fixed keys so a restarted
//! client picks up where it left off. Reads never fail: a storage error is
//! logged and treated as an absent value.

use std::sync::Arc;

use bookverse_domain::{Session, UserProfile, token_preview};
use parking_lot::Mutex;

use crate::ports::KeyValueStorage;

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Storage key of the cached user profile.
pub const USER_KEY: &str = "user";

/// Thread-safe access to the persisted session.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
    /// Serializes compound writes so readers never see a half-updated pair.
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    /// Creates a store on top of the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read from storage");
                None
            }
        }
    }

    /// Current access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        let _guard = self.write_lock.lock();
        self.read(ACCESS_TOKEN_KEY)
    }

    /// Current refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        let _guard = self.write_lock.lock();
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Returns true if an access token is stored.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.access_token().is_some()
    }

    /// Reads the full session. Requires both tokens.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        let _guard = self.write_lock.lock();
        let access_token = self.read(ACCESS_TOKEN_KEY)?;
        let refresh_token = self.read(REFRESH_TOKEN_KEY)?;
        let user = self.read_profile();
        Some(Session {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Replaces both tokens in one write.
    pub fn set_session(&self, access_token: &str, refresh_token: &str) {
        let _guard = self.write_lock.lock();
        if let Err(e) = self.storage.set_many(&[
            (ACCESS_TOKEN_KEY, access_token),
            (REFRESH_TOKEN_KEY, refresh_token),
        ]) {
            tracing::warn!(error = %e, "Failed to persist session tokens");
            return;
        }
        tracing::debug!(access = %token_preview(access_token), "Session tokens stored");
    }

    /// Removes both tokens and the cached profile.
    pub fn clear_session(&self) {
        let _guard = self.write_lock.lock();
        if let Err(e) = self
            .storage
            .remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY])
        {
            tracing::warn!(error = %e, "Failed to clear session");
            return;
        }
        tracing::debug!("Session cleared");
    }

    fn read_profile(&self) -> Option<UserProfile> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable cached profile");
                None
            }
        }
    }

    /// Last profile cached for the signed-in user.
    #[must_use]
    pub fn cached_profile(&self) -> Option<UserProfile> {
        let _guard = self.write_lock.lock();
        self.read_profile()
    }

    /// Caches the profile of the signed-in user.
    pub fn set_cached_profile(&self, profile: &UserProfile) {
        let raw = match serde_json::to_string(profile) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode profile");
                return;
            }
        };
        let _guard = self.write_lock.lock();
        if let Err(e) = self.storage.set(USER_KEY, &raw) {
            tracing::warn!(error = %e, "Failed to cache profile");
        }
    }
}
