//! # quotahub-entity
//!
//! Domain entity models for QuotaHub. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod quota;
pub mod resources;
pub mod server;
pub mod usage;

pub use quota::QuotaRecord;
pub use resources::{ResourcePatch, ResourceSet, ResourceType, exceeds_limit};
pub use server::{ChildCounts, ServerResourcePatch, ServerResources};
pub use usage::{Overflow, OverflowReport, ServerResourceView};
