//! Authentication domain types

mod types;

pub use types::{
    Credentials, LoginGrant, Registration, RenewalRequest, RenewedTokens, Role, Session,
    UserProfile, token_preview,
};
