//! Client configuration.
//!
//! Values are layered: built-in defaults, then an optional `bookverse.toml`
//! in the working directory, then an explicit file, then `BOOKVERSE_*`
//! environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://book-verse-backend-beige.vercel.app/api/v1";

/// Prefix of the environment variables read by [`ClientConfig::load`].
pub const ENV_PREFIX: &str = "BOOKVERSE";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Offending value
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// A numeric setting is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Settings of the storefront client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root, e.g. `https://host/api/v1`
    pub base_url: String,
    /// Timeout of ordinary requests, in milliseconds
    pub request_timeout_ms: u64,
    /// Bound on a single credential renewal, in milliseconds
    pub renewal_timeout_ms: u64,
    /// Session file; defaults to the platform data directory
    pub storage_path: Option<PathBuf>,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 30_000,
            renewal_timeout_ms: 15_000,
            storage_path: None,
            user_agent: format!("bookverse/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Loads the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` is given but unreadable, a source is
    /// malformed, or the result fails validation.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("bookverse").required(false));
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let loaded: Self = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        tracing::debug!(base_url = %loaded.base_url, "Configuration loaded");
        Ok(loaded)
    }

    /// Checks the values that cannot be expressed in the types.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.renewal_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "renewal_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Parsed API root.
    ///
    /// # Errors
    ///
    /// Returns an error unless the value is an absolute http(s) URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };
        let url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }

    /// Timeout of ordinary requests.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Bound on a single credential renewal.
    #[must_use]
    pub const fn renewal_timeout(&self) -> Duration {
        Duration::from_millis(self.renewal_timeout_ms)
    }

    /// Where the session is persisted.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map_or_else(|| PathBuf::from(".bookverse"), |dir| dir.join("bookverse"))
                .join("session.json")
        })
    }
}
