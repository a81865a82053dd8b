//! BookVerse Application - Session coordination and storefront use cases
//!
//! This crate holds the authenticated request pipeline, the single-flight
//! credential renewal behind it, and the storefront operations built on top.
//! It depends on the domain crate and on the ports it defines; adapters live
//! in the infrastructure crate.

pub mod auth;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod use_cases;

pub use auth::{RefreshCoordinator, SessionEvent, SessionLifecycle, TokenStore};
pub use error::{ApiError, ApiResult, RenewalError};
pub use pipeline::{Attempt, AuthenticatedClient, Dispatch};
pub use ports::{HttpTransport, KeyValueStorage, MemoryStorage, StorageError, TransportError};
pub use use_cases::{
    AdminDashboard, AuthSession, BooksApi, CartApi, CustomerDashboard, OrdersApi, RecommendApi,
};
