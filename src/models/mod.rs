//! API data models
//!
//! This module contains the public analyze API types and the wire formats
//! of each upstream provider.

pub mod analyze;
pub mod anthropic;
pub mod openai;
