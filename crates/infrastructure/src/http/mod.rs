//! HTTP infrastructure utilities.
//!
//! This module provides:
//! - Body building for JSON and multipart requests

mod body_builder;

pub use body_builder::{BodyBuildError, BuiltBody, build_body};
