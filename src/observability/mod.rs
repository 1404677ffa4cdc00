//! Observability subsystem.
//!
//! # Responsibilities
//! - Record gatekeeper metrics (requests, denials, latency)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Denials labelled by reason so dashboards can tell a quota breach from
//!   an abuse block

pub mod metrics;
