//! Outgoing request types

mod body;
mod method;
mod spec;

pub use body::{ApiBody, FormPart, PartValue};
pub use method::HttpMethod;
pub use spec::{AUTHORIZATION, ApiRequest};
