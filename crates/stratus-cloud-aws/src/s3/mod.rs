//! S3 bucket object resource

pub mod content;
pub mod object;
pub mod types;

pub use content::ContentSource;
pub use object::{BucketObject, BucketObjectConfig, BucketObjectState, RESOURCE_TYPE};
pub use types::{ObjectAcl, ServerSideEncryption, StorageClass};
