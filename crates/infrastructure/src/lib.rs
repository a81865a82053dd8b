//! BookVerse Infrastructure - Adapters and implementations
//!
//! This crate provides the reqwest transport, the file-backed session
//! storage and the layered client configuration, plus [`connect`] to wire
//! them into an [`AuthenticatedClient`].

pub mod adapters;
pub mod config;
pub mod http;
pub mod persistence;
pub mod serialization;

use std::sync::Arc;

use bookverse_application::{AuthenticatedClient, TransportError};

pub use adapters::ReqwestTransport;
pub use crate::config::{ClientConfig, ConfigError, DEFAULT_BASE_URL, ENV_PREFIX};
pub use http::{BodyBuildError, BuiltBody, build_body};
pub use persistence::FileStorage;
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};

/// Builds a client that talks to the configured backend and keeps its
/// session in the configured file.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn connect(config: &ClientConfig) -> Result<AuthenticatedClient, TransportError> {
    let transport = ReqwestTransport::new(config)?;
    let storage = FileStorage::new(config.storage_path());
    tracing::debug!(
        base_url = %transport.base_url(),
        storage = %storage.path().display(),
        "Client wired"
    );
    Ok(AuthenticatedClient::new(
        Arc::new(transport),
        Arc::new(storage),
        config.renewal_timeout(),
    ))
}
