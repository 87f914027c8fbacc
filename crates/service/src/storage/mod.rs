//! Storage abstractions for service layer
//!
//! Contains reusable file-backed helpers for services that persist small maps as JSON.

pub mod json_map_store;
