//! AWS resource adapters for Stratus
//!
//! This crate implements [`stratus_cloud::Resource`] for two AWS resource
//! types:
//!
//! - `aws_guardduty_invite_accepter`: accepts a GuardDuty membership
//!   invitation for a member detector
//! - `aws_s3_bucket_object`: uploads a single S3 object and mirrors its
//!   metadata
//!
//! Remote calls go through the traits in [`api`], implemented for the AWS
//! SDK in [`sdk`].
//!
//! # Requirements
//!
//! - Credentials resolvable by the default AWS provider chain
//! - Optional: `AWS_REGION`, `AWS_PROFILE`, `STRATUS_AWS_ENDPOINT_URL`,
//!   `STRATUS_RESTRICT_OBJECT_TAGS` env vars
//!
//! # Example
//!
//! ```ignore
//! use stratus_cloud::Resource;
//! use stratus_cloud_aws::{AwsConfig, AwsProvider};
//! use stratus_cloud_aws::s3::{BucketObjectConfig, ContentSource};
//!
//! let provider = AwsProvider::from_config(&AwsConfig::from_env()?).await?;
//!
//! let config = BucketObjectConfig::new(
//!     "my-bucket",
//!     "index.html",
//!     ContentSource::Inline("<html></html>".into()),
//! );
//! let state = provider.bucket_object().create(&config).await?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod guardduty;
pub mod provider;
pub mod s3;
pub mod sdk;

#[cfg(test)]
mod testing;

pub use api::{GuardDutyApi, KeyMetadataApi, ObjectStorageApi};
pub use config::{AwsConfig, Partition};
pub use error::{ApiResult, ServiceError};
pub use guardduty::{InviteAccepter, InviteAccepterConfig, InviteAccepterId, InviteAccepterState};
pub use provider::AwsProvider;
pub use s3::{BucketObject, BucketObjectConfig, BucketObjectState, ContentSource};
pub use sdk::SdkClients;
