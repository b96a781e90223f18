//! Core application modules
//!
//! This module contains configuration, constants, logging, model routing,
//! and the upstream providers.

pub mod config;
pub mod constants;
pub mod logging;
pub mod model_manager;
pub mod provider;
pub mod providers;
