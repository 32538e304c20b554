//! # Taskcast Shared Library
//!
//! This crate contains the domain types, persistence layer, and external
//! weather lookups used by the Taskcast web server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `store`: Persistence boundary (PostgreSQL and in-memory implementations)
//! - `auth`: Password hashing and credential verification
//! - `db`: Connection pool and migrations
//! - `weather`: Geocoding, current weather lookup, and per-request enrichment

pub mod auth;
pub mod db;
pub mod models;
pub mod store;
pub mod weather;

/// Current version of the Taskcast shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
