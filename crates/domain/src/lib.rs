//! BookVerse Domain - Core storefront types
//!
//! This crate defines the domain model for the BookVerse storefront client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod order;
pub mod request;
pub mod response;
pub mod route;

pub use auth::{
    Credentials, LoginGrant, Registration, RenewalRequest, RenewedTokens, Role, Session,
    UserProfile, token_preview,
};
pub use cart::{Cart, CartItem};
pub use catalog::{Book, BookDraft, ImageUpload, parse_price, parse_quantity, parse_tags};
pub use dashboard::{AdminStats, CustomerStats};
pub use error::{DomainError, DomainResult};
pub use order::{
    Order, OrderCustomer, OrderItem, OrderLine, OrderStatus, OrderedBook, PlaceOrder, StatusUpdate,
};
pub use request::{AUTHORIZATION, ApiBody, ApiRequest, FormPart, HttpMethod, PartValue};
pub use response::{ApiResponse, DEFAULT_ERROR_MESSAGE, Envelope};
pub use route::{Access, AuthView, GuardDecision, Route};
