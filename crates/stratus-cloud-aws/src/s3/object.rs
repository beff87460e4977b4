//! S3 bucket object adapter
//!
//! Uploads bytes to `bucket/key` and mirrors the object's metadata back into
//! state. Every change is a full re-upload; `bucket` and `key` force
//! replacement.

use crate::api::{KeyMetadataApi, ObjectStorageApi, PutObjectRequest};
use crate::s3::content::ContentSource;
use crate::s3::types::{ObjectAcl, ServerSideEncryption, StorageClass};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use stratus_cloud::schema::{FieldSchema, ResourceSchema, Validator};
use stratus_cloud::{CloudError, Resource, Result, Timeouts};

pub const RESOURCE_TYPE: &str = "aws_s3_bucket_object";

/// Alias of the AWS-managed key S3 uses when no key is given
const DEFAULT_S3_KMS_ALIAS: &str = "alias/aws/s3";

/// Desired configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketObjectConfig {
    pub bucket: String,
    pub key: String,

    #[serde(flatten)]
    pub content: ContentSource,

    #[serde(default)]
    pub acl: ObjectAcl,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<StorageClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_side_encryption: Option<ServerSideEncryption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,

    /// Content hash; set it to force a re-upload when a source file changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_redirect: Option<String>,
}

impl BucketObjectConfig {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, content: ContentSource) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            content,
            acl: ObjectAcl::default(),
            cache_control: None,
            content_disposition: None,
            content_encoding: None,
            content_language: None,
            content_type: None,
            storage_class: None,
            server_side_encryption: None,
            kms_key_id: None,
            etag: None,
            tags: BTreeMap::new(),
            website_redirect: None,
        }
    }

    /// Check field values and combinations before any remote call
    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(CloudError::validation("bucket must not be empty"));
        }
        if self.key.is_empty() {
            return Err(CloudError::validation("key must not be empty"));
        }

        if let Some(class) = self.storage_class.as_ref().filter(|c| !c.is_settable()) {
            return Err(CloudError::Validation(format!(
                "storage_class: expected one of [{}], got {:?}",
                StorageClass::VALUES.join(", "),
                class.as_str()
            )));
        }
        if let Some(sse) = self.server_side_encryption.as_ref().filter(|s| !s.is_settable()) {
            return Err(CloudError::Validation(format!(
                "server_side_encryption: expected one of [{}], got {:?}",
                ServerSideEncryption::VALUES.join(", "),
                sse.as_str()
            )));
        }

        if let Some(kms_key_id) = non_empty(&self.kms_key_id) {
            FieldSchema::string("kms_key_id")
                .validator(Validator::Arn)
                .validate(&kms_key_id)?;
        }

        if non_empty(&self.etag).is_some() {
            if non_empty(&self.kms_key_id).is_some() {
                return Err(CloudError::validation(
                    "\"etag\": conflicts with \"kms_key_id\"",
                ));
            }
            if self.server_side_encryption.is_some() {
                return Err(CloudError::validation(
                    "\"etag\": conflicts with \"server_side_encryption\"",
                ));
            }
        }

        Ok(())
    }
}

/// Recorded state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketObjectState {
    /// Identity key, equal to the object key
    pub id: String,

    #[serde(flatten)]
    pub config: BucketObjectConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    /// Content hash reported by S3, quotes stripped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_etag: Option<String>,
}

/// S3 bucket object resource
pub struct BucketObject {
    s3: Arc<dyn ObjectStorageApi>,
    kms: Arc<dyn KeyMetadataApi>,
    tags_restricted: bool,
    timeouts: Timeouts,
}

impl BucketObject {
    pub fn new(s3: Arc<dyn ObjectStorageApi>, kms: Arc<dyn KeyMetadataApi>) -> Self {
        Self {
            s3,
            kms,
            tags_restricted: false,
            timeouts: Timeouts::default(),
        }
    }

    /// Disallow object tags (partitions without S3 object tagging)
    pub fn with_tags_restricted(mut self, restricted: bool) -> Self {
        self.tags_restricted = restricted;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Upload the object and reconcile server-computed fields
    pub async fn put(&self, config: &BucketObjectConfig) -> Result<BucketObjectState> {
        config.validate()?;

        if !config.tags.is_empty() && self.tags_restricted {
            return Err(CloudError::validation(
                "This region does not allow for tags on S3 objects",
            ));
        }

        let body = config.content.resolve().await?;
        let request = build_put_request(config, body);

        tracing::info!(
            "Putting S3 object s3://{}/{} ({} bytes)",
            config.bucket,
            config.key,
            request.body.len()
        );
        tracing::debug!(
            acl = %request.acl,
            storage_class = ?request.storage_class,
            server_side_encryption = ?request.server_side_encryption,
            "PutObject request"
        );

        let response = self.s3.put_object(request).await.map_err(|e| {
            CloudError::ApiError(format!(
                "Error putting object in S3 bucket ({}): {}",
                config.bucket, e
            ))
        })?;

        let state = BucketObjectState {
            id: config.key.clone(),
            config: config.clone(),
            version_id: response.version_id,
            remote_etag: response.etag.as_deref().map(trim_etag),
        };

        self.read(&state).await?.ok_or_else(|| {
            CloudError::ResourceNotFound(format!(
                "S3 object s3://{}/{} not found after upload",
                config.bucket, config.key
            ))
        })
    }

    async fn delete_versions(&self, bucket: &str, key: &str) -> Result<()> {
        let versions = self
            .s3
            .list_object_versions(bucket, key)
            .await
            .map_err(|e| CloudError::ApiError(format!("Failed listing S3 object versions: {}", e)))?;

        for version in versions.iter().filter(|v| v.key.as_deref() == Some(key)) {
            tracing::debug!("Deleting S3 object {} version {:?}", key, version.version_id);
            self.s3
                .delete_object(bucket, key, version.version_id.as_deref())
                .await
                .map_err(|e| {
                    CloudError::ApiError(format!(
                        "Error deleting S3 object version of {} ({:?}): {}",
                        key, version.version_id, e
                    ))
                })?;
        }

        Ok(())
    }
}

fn build_put_request(config: &BucketObjectConfig, body: bytes::Bytes) -> PutObjectRequest {
    let mut request = PutObjectRequest {
        bucket: config.bucket.clone(),
        key: config.key.clone(),
        acl: config.acl,
        body,
        storage_class: config.storage_class.clone(),
        cache_control: non_empty(&config.cache_control),
        content_type: non_empty(&config.content_type),
        content_encoding: non_empty(&config.content_encoding),
        content_language: non_empty(&config.content_language),
        content_disposition: non_empty(&config.content_disposition),
        server_side_encryption: config.server_side_encryption.clone(),
        kms_key_id: None,
        tagging: None,
        website_redirect: non_empty(&config.website_redirect),
    };

    if let Some(kms_key_id) = non_empty(&config.kms_key_id) {
        request.kms_key_id = Some(kms_key_id);
        request.server_side_encryption = Some(ServerSideEncryption::AwsKms);
    }

    if !config.tags.is_empty() {
        request.tagging = Some(encode_tags(&config.tags));
    }

    request
}

/// Encode a tag set as URL query parameters (`k1=v1&k2=v2`)
pub fn encode_tags(tags: &BTreeMap<String, String>) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(tags.iter())
        .finish()
}

fn trim_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[async_trait]
impl Resource for BucketObject {
    type Config = BucketObjectConfig;
    type State = BucketObjectState;

    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .field(FieldSchema::string("bucket").required().force_new())
            .field(FieldSchema::string("key").required().force_new())
            .field(
                FieldSchema::string("acl")
                    .optional()
                    .default_value("private")
                    .validator(Validator::OneOf(ObjectAcl::VALUES)),
            )
            .field(FieldSchema::string("cache_control").optional())
            .field(FieldSchema::string("content_disposition").optional())
            .field(FieldSchema::string("content_encoding").optional())
            .field(FieldSchema::string("content_language").optional())
            .field(FieldSchema::string("content_type").optional().computed())
            .field(
                FieldSchema::string("source")
                    .optional()
                    .conflicts_with(&["content", "content_base64"]),
            )
            .field(
                FieldSchema::string("content")
                    .optional()
                    .conflicts_with(&["source", "content_base64"]),
            )
            .field(
                FieldSchema::string("content_base64")
                    .optional()
                    .conflicts_with(&["source", "content"]),
            )
            .field(
                FieldSchema::string("storage_class")
                    .optional()
                    .computed()
                    .validator(Validator::OneOf(StorageClass::VALUES)),
            )
            .field(
                FieldSchema::string("server_side_encryption")
                    .optional()
                    .computed()
                    .validator(Validator::OneOf(ServerSideEncryption::VALUES)),
            )
            .field(
                FieldSchema::string("kms_key_id")
                    .optional()
                    .validator(Validator::Arn),
            )
            .field(
                FieldSchema::string("etag")
                    .optional()
                    .conflicts_with(&["kms_key_id", "server_side_encryption"]),
            )
            .field(FieldSchema::string("version_id").computed())
            .field(FieldSchema::string("remote_etag").computed())
            .field(FieldSchema::string_map("tags").optional())
            .field(FieldSchema::string("website_redirect").optional())
    }

    fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    fn id(&self, state: &BucketObjectState) -> String {
        state.id.clone()
    }

    async fn create(&self, config: &BucketObjectConfig) -> Result<BucketObjectState> {
        self.put(config).await
    }

    async fn read(&self, state: &BucketObjectState) -> Result<Option<BucketObjectState>> {
        let bucket = &state.config.bucket;
        let key = &state.config.key;

        let meta = match self.s3.head_object(bucket, key).await {
            Ok(meta) => meta,
            Err(e) if e.is_http_not_found() => {
                tracing::warn!(
                    "Error Reading Object ({}), object not found (HTTP status 404)",
                    key
                );
                return Ok(None);
            }
            Err(e) => {
                return Err(CloudError::ApiError(format!(
                    "Error reading S3 object ({}): {}",
                    key, e
                )));
            }
        };
        tracing::debug!("Reading S3 Bucket Object meta: {:?}", meta);

        let mut next = state.clone();
        next.id = key.clone();
        next.version_id = meta.version_id;
        next.remote_etag = meta.etag.as_deref().map(trim_etag);

        let config = &mut next.config;
        config.cache_control = meta.cache_control;
        config.content_disposition = meta.content_disposition;
        config.content_encoding = meta.content_encoding;
        config.content_language = meta.content_language;
        config.content_type = meta.content_type;
        config.server_side_encryption = meta.server_side_encryption.map(ServerSideEncryption::from);
        config.website_redirect = meta.website_redirect;

        // Only record a non-default key; the default one is implied by aws:kms
        if let Some(reported) = meta.kms_key_id {
            let default_arn = self
                .kms
                .describe_key_arn(DEFAULT_S3_KMS_ALIAS)
                .await
                .map_err(|e| {
                    CloudError::ApiError(format!(
                        "Failed to describe default S3 KMS key ({}): {}",
                        DEFAULT_S3_KMS_ALIAS, e
                    ))
                })?;

            if default_arn.as_deref() != Some(reported.as_str()) {
                tracing::debug!(
                    "S3 object is encrypted using a non-default KMS Key ID: {}",
                    reported
                );
                config.kms_key_id = Some(reported);
            }
        }

        // STANDARD is not reported by S3
        config.storage_class = Some(
            meta.storage_class
                .map(StorageClass::from)
                .unwrap_or_default(),
        );

        if !self.tags_restricted {
            config.tags = self.s3.get_object_tagging(bucket, key).await.map_err(|e| {
                CloudError::ApiError(format!(
                    "Failed to get object tags (bucket: {}, key: {}): {}",
                    bucket, key, e
                ))
            })?;
        }

        Ok(Some(next))
    }

    async fn update(
        &self,
        state: &BucketObjectState,
        config: &BucketObjectConfig,
    ) -> Result<BucketObjectState> {
        if state.config.bucket != config.bucket || state.config.key != config.key {
            return Err(CloudError::validation(
                "changing \"bucket\" or \"key\" requires replacement",
            ));
        }
        self.put(config).await
    }

    async fn delete(&self, state: &BucketObjectState) -> Result<()> {
        let bucket = &state.config.bucket;
        let key = &state.config.key;

        if state.version_id.as_deref().is_some_and(|v| !v.is_empty()) {
            tracing::info!("Deleting all versions of S3 object s3://{}/{}", bucket, key);
            return self.delete_versions(bucket, key).await;
        }

        tracing::info!("Deleting S3 object s3://{}/{}", bucket, key);
        self.s3.delete_object(bucket, key, None).await.map_err(|e| {
            CloudError::ApiError(format!(
                "Error deleting S3 bucket object: {}  Bucket: {:?} Object: {:?}",
                e, bucket, key
            ))
        })
    }
}
