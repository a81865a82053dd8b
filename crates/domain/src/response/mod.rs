//! Backend response types

mod spec;

pub use spec::{ApiResponse, DEFAULT_ERROR_MESSAGE, Envelope};
