//! Conversion between the analyze API and provider chat requests
//!
//! `request_converter` turns an analyze request into a prompt and a chat
//! request; `response_converter` turns model output back into an analysis.

pub mod request_converter;
pub mod response_converter;
