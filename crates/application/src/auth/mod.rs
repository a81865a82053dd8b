//! Session management for the storefront client.
//!
//! This module provides:
//! - Durable token storage
//! - Single-flight credential renewal with a FIFO waiter queue
//! - Session lifecycle events for the hosting application

mod coordinator;
mod lifecycle;
mod token_store;

pub use coordinator::{DEFAULT_RENEWAL_TIMEOUT, RENEWAL_PATH, RefreshCoordinator};
pub use lifecycle::{SessionEvent, SessionLifecycle};
pub use token_store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore, USER_KEY};
