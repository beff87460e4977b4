//! AWS API seams
//!
//! Adapters talk to AWS only through these traits. [`crate::sdk::SdkClients`]
//! implements them over the official SDK; tests substitute in-memory fakes.

use crate::error::ApiResult;
use crate::s3::{ObjectAcl, ServerSideEncryption, StorageClass};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;

// ========== GuardDuty ==========

/// GuardDuty member-account operations
#[async_trait]
pub trait GuardDutyApi: Send + Sync {
    /// List one page of pending invitations for the calling account
    async fn list_invitations(&self, next_token: Option<String>) -> ApiResult<InvitationPage>;

    /// Accept an invitation, making `master_id` the detector's administrator
    async fn accept_invitation(
        &self,
        detector_id: &str,
        invitation_id: &str,
        master_id: &str,
    ) -> ApiResult<()>;

    /// Current administrator of a detector, if any
    async fn get_master_account(&self, detector_id: &str) -> ApiResult<Option<MasterAccount>>;

    /// Remove the detector's administrator association
    async fn disassociate_from_master_account(&self, detector_id: &str) -> ApiResult<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invitation {
    /// Account that sent the invitation
    pub account_id: Option<String>,
    pub invitation_id: Option<String>,
    pub relationship_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvitationPage {
    pub invitations: Vec<Invitation>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterAccount {
    pub account_id: Option<String>,
    pub invitation_id: Option<String>,
    pub relationship_status: Option<String>,
}

// ========== S3 ==========

/// S3 object operations
#[async_trait]
pub trait ObjectStorageApi: Send + Sync {
    async fn put_object(&self, request: PutObjectRequest) -> ApiResult<PutObjectResponse>;

    async fn head_object(&self, bucket: &str, key: &str) -> ApiResult<ObjectMetadata>;

    async fn get_object_tagging(&self, bucket: &str, key: &str)
    -> ApiResult<BTreeMap<String, String>>;

    /// Every stored version whose key starts with `prefix`, across all pages
    async fn list_object_versions(&self, bucket: &str, prefix: &str)
    -> ApiResult<Vec<ObjectVersion>>;

    async fn delete_object(&self, bucket: &str, key: &str, version_id: Option<&str>)
    -> ApiResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub acl: ObjectAcl,
    pub body: Bytes,
    pub storage_class: Option<StorageClass>,
    pub cache_control: Option<String>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub content_disposition: Option<String>,
    pub server_side_encryption: Option<ServerSideEncryption>,
    pub kms_key_id: Option<String>,
    /// Tag set encoded as URL query parameters
    pub tagging: Option<String>,
    pub website_redirect: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectResponse {
    pub etag: Option<String>,
    pub version_id: Option<String>,
}

/// Metadata returned by HeadObject
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub cache_control: Option<String>,
    pub content_disposition: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub content_type: Option<String>,
    pub version_id: Option<String>,
    pub server_side_encryption: Option<String>,
    pub website_redirect: Option<String>,
    pub kms_key_id: Option<String>,
    pub etag: Option<String>,
    /// Omitted by S3 for the STANDARD class
    pub storage_class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectVersion {
    pub key: Option<String>,
    pub version_id: Option<String>,
    pub is_latest: bool,
}

// ========== KMS ==========

/// KMS key lookups
#[async_trait]
pub trait KeyMetadataApi: Send + Sync {
    /// ARN of the key identified by `key_id` (id, ARN or alias)
    async fn describe_key_arn(&self, key_id: &str) -> ApiResult<Option<String>>;
}
