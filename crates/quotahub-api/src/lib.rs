//! # quotahub-api
//!
//! HTTP API layer for QuotaHub. Thin glue only: routes, handlers that
//! translate requests into service calls, and the mapping from domain
//! errors to HTTP responses. No quota rules live here.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
