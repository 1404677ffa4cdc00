//! Authentication and role routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (already past the security middleware):
//!     → token.rs (verify bearer token → Principal)
//!     → routes.rs (route class lookup, allow / redirect decision)
//!     → Pass to handler with Principal attached
//! ```
//!
//! # Design Decisions
//! - Tokens are verified, never minted, on production paths; issuance exists
//!   for the sign-in flow and tests
//! - Admin passes everywhere; other roles are confined to configured prefixes
//! - Wrong-role navigation redirects to the role's dashboard instead of
//!   serving an error page

pub mod principal;
pub mod routes;
pub mod token;

pub use principal::{Principal, Role};
pub use routes::{role_router_middleware, RouteTable};
