//! # quotahub-service
//!
//! Business logic service layer for QuotaHub. Each service orchestrates
//! repositories to implement application-level use cases: resolving the
//! configured resource vectors, deriving usage and overflow figures, and
//! validating quota and server-resource edits before they are committed.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references. The quota arithmetic itself
//! lives in pure functions over entity values.

pub mod accounting;
pub mod quota;
pub mod server_resources;
pub mod settings;

pub use accounting::AccountingService;
pub use quota::QuotaService;
pub use server_resources::ServerResourceService;
pub use settings::SettingsService;
