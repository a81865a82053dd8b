//! Sign-in, sign-out and startup restoration.

use std::sync::atomic::{AtomicBool, Ordering};

use bookverse_domain::{
    ApiRequest, AuthView, Credentials, DomainError, GuardDecision, LoginGrant, Registration,
    Route, UserProfile,
};
use parking_lot::RwLock;

use crate::error::{ApiError, ApiResult};
use crate::pipeline::AuthenticatedClient;

/// Path of the sign-in call.
pub const LOGIN_PATH: &str = "/auth/login";
/// Path of the registration call.
pub const REGISTER_PATH: &str = "/auth/register";
/// Path of the profile call.
pub const PROFILE_PATH: &str = "/auth/me";

fn require(value: &str, field: &'static str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField(field));
    }
    Ok(())
}

/// Who is signed in, as seen by the hosting application.
#[derive(Debug)]
pub struct AuthSession {
    client: AuthenticatedClient,
    user: RwLock<Option<UserProfile>>,
    loading: AtomicBool,
}

impl AuthSession {
    /// Creates a session view; call [`Self::restore`] once at startup.
    #[must_use]
    pub fn new(client: AuthenticatedClient) -> Self {
        Self {
            client,
            user: RwLock::new(None),
            loading: AtomicBool::new(true),
        }
    }

    /// Underlying pipeline.
    #[must_use]
    pub const fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Signs in and returns the user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, the credentials are refused or
    /// the profile cannot be fetched. No session is kept on failure.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<UserProfile> {
        require(email, "email")?;
        require(password, "password")?;

        let request = ApiRequest::post(LOGIN_PATH).with_json(&Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        let grant: LoginGrant = self.client.public_data(&request).await?;
        let tokens = self.client.tokens();
        tokens.set_session(&grant.access_token, &grant.refresh_token);

        let profile = match self.profile().await {
            Ok(profile) => profile,
            Err(e) => {
                tokens.clear_session();
                return Err(e);
            }
        };
        tokens.set_cached_profile(&profile);
        *self.user.write() = Some(profile.clone());
        self.loading.store(false, Ordering::Release);

        let lifecycle = self.client.lifecycle();
        lifecycle.navigated(Route::after_sign_in(profile.is_admin()));
        lifecycle.signed_in(profile.clone());
        Ok(profile)
    }

    /// Creates an account. The user signs in separately afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank or the backend refuses the account.
    pub async fn register(&self, registration: &Registration) -> ApiResult<()> {
        require(&registration.email, "email")?;
        require(&registration.password, "password")?;
        require(&registration.firstname, "firstname")?;
        require(&registration.lastname, "lastname")?;

        let request = ApiRequest::post(REGISTER_PATH).with_json(registration)?;
        self.client.send_public(&request).await?;
        tracing::info!(email = %registration.email, "Account registered");
        Ok(())
    }

    /// Fetches the signed-in user's profile from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] if no session is stored, or the
    /// call's error.
    pub async fn profile(&self) -> ApiResult<UserProfile> {
        if !self.client.tokens().has_session() {
            return Err(ApiError::Unauthenticated);
        }
        self.client.get_data(&ApiRequest::get(PROFILE_PATH)).await
    }

    /// Re-fetches and caches the profile, e.g. after a renewal.
    ///
    /// # Errors
    ///
    /// Returns the profile call's error; the cached profile is kept.
    pub async fn refresh_profile(&self) -> ApiResult<UserProfile> {
        let profile = self.profile().await?;
        self.client.tokens().set_cached_profile(&profile);
        *self.user.write() = Some(profile.clone());
        Ok(profile)
    }

    /// Signs out locally.
    pub fn logout(&self) {
        self.client.tokens().clear_session();
        *self.user.write() = None;
        self.client.lifecycle().signed_out();
    }

    /// Picks up a session persisted by a previous run.
    ///
    /// The cached profile is used right away and then verified against the
    /// backend. A session that fails verification is cleared.
    pub async fn restore(&self) -> Option<UserProfile> {
        self.loading.store(true, Ordering::Release);
        let tokens = self.client.tokens();

        if tokens.has_session()
            && let Some(cached) = tokens.cached_profile()
        {
            *self.user.write() = Some(cached);
            match self.profile().await {
                Ok(profile) => {
                    tokens.set_cached_profile(&profile);
                    *self.user.write() = Some(profile);
                }
                Err(e) => {
                    tracing::info!(error = %e, "Stored session is no longer valid");
                    tokens.clear_session();
                    *self.user.write() = None;
                }
            }
        }

        self.loading.store(false, Ordering::Release);
        self.current_user()
    }

    /// Signed-in user, if the session is still stored.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        if !self.client.tokens().has_session() {
            return None;
        }
        self.user.read().clone()
    }

    /// Returns true if a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Returns true if the signed-in user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(|user| user.is_admin())
    }

    /// Snapshot used by route guards.
    #[must_use]
    pub fn auth_view(&self) -> AuthView {
        let user = self.current_user();
        AuthView {
            loading: self.loading.load(Ordering::Acquire),
            authenticated: user.is_some(),
            admin: user.is_some_and(|user| user.is_admin()),
        }
    }

    /// Decides whether `route` may be shown right now.
    #[must_use]
    pub fn guard(&self, route: Route) -> GuardDecision {
        route.guard(self.auth_view())
    }
}
