//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_ip.rs (resolve stable identifier)
//!     → block.rs (short-circuit if a block exists)
//!     → rate_limit.rs (fixed-window quota)
//!     → abuse.rs (suspicious-pattern scan, escalation)
//!     → Pass to authentication / role routing
//! ```
//!
//! # Design Decisions
//! - The block gate runs before any counter moves, so blocked traffic never
//!   inflates window or failure counters
//! - Store errors fail open: the layer logs and lets traffic through rather
//!   than rejecting everything when the store is down
//! - No trust in client input

pub mod abuse;
pub mod block;
pub mod client_ip;
pub mod events;
pub mod gate;
pub mod rate_limit;

pub use client_ip::client_ip;
pub use gate::security_middleware;
