//! Shared helpers for the listener workspace: tracing setup and startup checks.

pub mod utils;
pub mod env;
