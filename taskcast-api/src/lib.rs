//! # Taskcast Web Server Library
//!
//! Server-rendered task tracker with weather annotations.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `forms`: Typed form input and validation
//! - `middleware`: Security headers
//! - `routes`: Route handlers
//! - `session`: Per-request session context and notices
//! - `views`: HTML rendering

pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod views;
