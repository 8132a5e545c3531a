#![deny(missing_docs)]

//! Core library for the listings CRUD service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Listing model and identifier parsing.
pub mod listing;
/// Structured logging and tracing setup.
pub mod logging;
/// Document store gateway.
pub mod store;
