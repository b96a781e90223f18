//! HTTP API
//!
//! Router, handlers, CORS policy, and the JSON error type.

pub mod cors;
pub mod endpoints;
pub mod error;
