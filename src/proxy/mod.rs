//! HTTP layer serving the GOPROXY protocol with the cooldown applied
//!
//! # Modules
//!
//! - [`error`]: Maps cooldown and upstream failures onto HTTP responses
//! - [`handler`]: axum router and per-operation handlers
//! - [`route`]: Classifies request paths and extracts the cooldown prefix
//! - [`server`]: Server initialization and graceful shutdown

pub mod error;
pub mod handler;
pub mod route;
pub mod server;
