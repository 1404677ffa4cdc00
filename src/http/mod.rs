//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → security gate (block / rate / abuse)
//!     → role router (authentication, route classes)
//!     → handlers (API-key tier, page placeholder)
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
