//! Request gatekeeper for the Nurolab learning platform.
//!
//! Sits in front of the platform's handlers and enforces, per request:
//! block gate → rate limiter → abuse detector → authentication → role
//! routing. Counters and blocks live in an external atomic KV store; the
//! service itself holds no shared mutable state.

pub mod apikeys;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod security;
pub mod store;

pub use config::GateConfig;
pub use error::GateError;
pub use http::HttpServer;
