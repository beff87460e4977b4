//! Stratus resource contracts
//!
//! This crate provides the provider-neutral pieces every Stratus resource
//! adapter is built from: the lifecycle trait, field schema declarations,
//! the error model and bounded polling.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  stratus CLI                     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                stratus-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        trait Resource { ... }             │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │    Schema    │  │    Retry     │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────────────────────────────┐
//! │           stratus-cloud-aws            │
//! │  guardduty invite accepter, s3 object  │
//! └───────────────────────────────────────┘
//! ```

pub mod error;
pub mod resource;
pub mod retry;
pub mod schema;

// Re-exports
pub use error::{CloudError, Result};
pub use resource::{Resource, Timeouts};
pub use retry::{RetryConfig, RetryError, retry};
pub use schema::{FieldKind, FieldSchema, ResourceSchema, Validator};
