//! Session and credential types

use serde::{Deserialize, Serialize};

/// Role granted to a storefront account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Back-office administrator
    Admin,
    /// Regular customer
    Customer,
    /// Any role this client does not know about
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ADMIN" => Self::Admin,
            "CUSTOMER" => Self::Customer,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => "ADMIN".to_string(),
            Role::Customer => "CUSTOMER".to_string(),
            Role::Other(value) => value,
        }
    }
}

/// Profile of the authenticated user, as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Sign-in email
    pub email: String,
    /// Given name
    #[serde(default)]
    pub firstname: String,
    /// Family name
    #[serde(default)]
    pub lastname: String,
    /// Granted roles
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl UserProfile {
    /// Returns true if the user may access the back-office.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// Returns "Firstname Lastname", or the email when both are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.firstname.trim(), self.lastname.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Access/refresh credential pair held for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Short-lived credential attached to authenticated requests
    pub access_token: String,
    /// Longer-lived credential exchanged for a new access token
    pub refresh_token: String,
    /// Last known profile, if cached
    pub user: Option<UserProfile>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    /// Sign-in email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    /// Sign-in email
    pub email: String,
    /// Plain-text password
    pub password: String,
    /// Given name
    pub firstname: String,
    /// Family name
    pub lastname: String,
}

/// Data returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginGrant {
    /// New access token
    pub access_token: String,
    /// New refresh token
    pub refresh_token: String,
    /// Roles granted to the account
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalRequest {
    /// Refresh token being exchanged
    pub refresh_token: String,
}

/// Data returned by the renewal exchange.
///
/// Both fields are optional on the wire: a missing access token makes the
/// renewal a failure, a missing refresh token keeps the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewedTokens {
    /// Replacement access token
    #[serde(default)]
    pub access_token: Option<String>,
    /// Rotated refresh token, if the backend issued one
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Returns the first few characters of a token, safe to log.
#[must_use]
pub fn token_preview(token: &str) -> String {
    let preview: String = token.chars().take(6).collect();
    if preview.len() < token.len() {
        format!("{preview}…")
    } else {
        preview
    }
}
