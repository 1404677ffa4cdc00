//! API-key issuance, validation, and quota subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/validate:
//!     → record.rs (exact key lookup, must be active)
//!     → quota.rs (sliding-window check, 24h / 100 requests)
//!     → record.rs (touch last_used)
//!     → quota metadata returned to the caller
//!
//! /api/keys (bearer-authenticated):
//!     → handlers.rs (owner-scoped create / list / rename / delete)
//! ```
//!
//! # Design Decisions
//! - The key tier uses a true sliding window, unlike the security tier's
//!   fixed window; the two are independent and each internally consistent
//! - Store errors here fail the request (500), not open: the caller asked
//!   for a validation verdict and must not get a false positive

pub mod handlers;
pub mod quota;
pub mod record;

pub use record::{ApiKeyRecord, KeyStore, MemoryKeyStore};
