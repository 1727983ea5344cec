//! House price prediction server
//!
//! Exposes the router and configuration so integration tests can drive
//! the API with an injected registry instead of on-disk models.

pub mod api;
pub mod config;
